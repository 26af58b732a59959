//! 整文件流式传输：下载写 `.part` 临时文件成功后原子改名，上传先传
//! 临时名成功后 MOVE 到位；两个方向都保证失败或取消不会留下与完整
//! 产物无法区分的半成品。

use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use reqwest::Body;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::debug;

use crate::internal::client::structs::cancel_flag::CancelFlag;
use crate::internal::client::structs::webdav_client::WebdavClient;
use crate::internal::error::{DavError, DavResult};

/// 临时文件名：`foo.txt` → `foo.txt.part`
fn part_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_os_string();
    name.push(".part");
    PathBuf::from(name)
}

fn part_remote(remote: &str) -> String {
    format!("{remote}.part")
}

/// 下载远端文件到本地路径：流式写入，块间检查取消旗标
pub(crate) async fn download_to_path(
    client: &WebdavClient,
    remote: &str,
    local: &Path,
    cancel: &CancelFlag,
) -> DavResult<()> {
    let resp = client.get(remote, None).await?;

    if let Some(parent) = local.parent() {
        fs::create_dir_all(parent).await.map_err(|e| DavError::Io {
            op: "download",
            path: parent.display().to_string(),
            source: e,
        })?;
    }

    let tmp = part_path(local);
    let result = write_stream_to(resp, remote, &tmp, cancel).await;

    match result {
        Ok(()) => {
            fs::rename(&tmp, local).await.map_err(|e| DavError::Io {
                op: "download",
                path: local.display().to_string(),
                source: e,
            })?;
            debug!(remote, local = %local.display(), "下载完成");
            Ok(())
        }
        Err(e) => {
            // 失败或取消都不留半成品
            let _ = fs::remove_file(&tmp).await;
            Err(e)
        }
    }
}

async fn write_stream_to(
    resp: reqwest::Response,
    remote: &str,
    tmp: &Path,
    cancel: &CancelFlag,
) -> DavResult<()> {
    let mut file = File::create(tmp).await.map_err(|e| DavError::Io {
        op: "download",
        path: tmp.display().to_string(),
        source: e,
    })?;

    let mut stream = resp.bytes_stream();
    while let Some(chunk_result) = stream.next().await {
        if cancel.is_cancelled() {
            return Err(DavError::Cancelled {
                op: "download",
                path: remote.to_string(),
            });
        }

        let chunk = chunk_result.map_err(|e| DavError::Transfer {
            op: "download",
            path: remote.to_string(),
            reason: e.to_string(),
        })?;

        file.write_all(&chunk).await.map_err(|e| DavError::Io {
            op: "download",
            path: tmp.display().to_string(),
            source: e,
        })?;
    }

    file.flush().await.map_err(|e| DavError::Io {
        op: "download",
        path: tmp.display().to_string(),
        source: e,
    })?;
    Ok(())
}

/// 上传本地文件到远端路径
///
/// body 从文件流式读取，整文件从不落入内存；先写远端临时名，
/// PUT 完整成功后再 MOVE 到最终路径（overwrite 语义由 MOVE 承担）。
pub(crate) async fn upload_from_path(
    client: &WebdavClient,
    local: &Path,
    remote: &str,
    overwrite: bool,
    cancel: &CancelFlag,
) -> DavResult<()> {
    let metadata = fs::metadata(local).await.map_err(|e| DavError::Io {
        op: "upload",
        path: local.display().to_string(),
        source: e,
    })?;
    let file = File::open(local).await.map_err(|e| DavError::Io {
        op: "upload",
        path: local.display().to_string(),
        source: e,
    })?;

    // 取消旗标织进流里：置位后下一块直接断流，PUT 以错误收场
    let cancel_in_stream = cancel.clone();
    let stream = ReaderStream::new(file).map(move |chunk| {
        if cancel_in_stream.is_cancelled() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::Interrupted,
                "上传被取消",
            ));
        }
        chunk
    });

    let tmp = part_remote(remote);
    let put_result = client
        .put_stream(&tmp, Body::wrap_stream(stream), Some(metadata.len()), true)
        .await;

    match put_result {
        Ok(()) => match client.mv(&tmp, remote, overwrite).await {
            Ok(()) => {
                debug!(local = %local.display(), remote, "上传完成");
                Ok(())
            }
            Err(e) => {
                let _ = client.delete(&tmp).await;
                Err(e)
            }
        },
        Err(e) => {
            // PUT 中断后服务端可能留有残缺的临时对象，尽力清掉
            let _ = client.delete(&tmp).await;
            if cancel.is_cancelled() {
                return Err(DavError::Cancelled {
                    op: "upload",
                    path: remote.to_string(),
                });
            }
            Err(match e {
                DavError::Request(inner) => DavError::Transfer {
                    op: "upload",
                    path: remote.to_string(),
                    reason: inner.to_string(),
                },
                other => other,
            })
        }
    }
}
