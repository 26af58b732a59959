//! 传输客户端：每个 WebDAV 动词一个方法，统一做认证、超时、状态码
//! 映射；只读动词带指数退避重试，写动词可能已部分生效，从不自动重试。

use std::collections::HashSet;

use reqwest::header::{ACCEPT, CONTENT_LENGTH, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Body, Client, Method, Response, StatusCode};
use tokio::time::{Duration, sleep};
use tracing::{debug, warn};
use url::Url;

use crate::internal::auth::structs::webdav_auth::WebdavAuth;
use crate::internal::client::functions::transfer;
use crate::internal::client::structs::cancel_flag::CancelFlag;
use crate::internal::client::structs::client_config::ClientConfig;
use crate::internal::error::{DavError, DavResult};
use crate::internal::lister::structs::resource_info::ResourceInfo;
use crate::internal::paths;
use crate::internal::webdav::enums::{Depth, WebDavMethod};
use crate::internal::webdav::functions::propfind_body::PROPFIND_BODY;
use crate::internal::webdav::raw_xml::impl_multi_status::{ToResourceInfos, children_only};
use crate::internal::webdav::raw_xml::raw_file::{MultiStatus, parse_multi_status};

/// WebDAV 传输客户端
///
/// 会话状态全部显式存放在这里，生命周期由调用方持有，没有任何
/// 进程级全局。底层连接池（reqwest::Client 内部是 Arc）允许并发使用。
#[derive(Debug, Clone)]
pub struct WebdavClient {
    pub(crate) http: Client,
    pub(crate) auth: WebdavAuth,
    pub(crate) config: ClientConfig,
}

impl WebdavClient {
    pub fn new(auth: WebdavAuth, config: ClientConfig) -> DavResult<Self> {
        let http = Client::builder()
            .http1_only()
            .connect_timeout(config.timeout)
            .build()?;
        Ok(Self { http, auth, config })
    }

    pub fn with_default_config(auth: WebdavAuth) -> DavResult<Self> {
        Self::new(auth, ClientConfig::default())
    }

    pub fn base_url(&self) -> &Url {
        &self.auth.base_url
    }

    pub fn concurrency(&self) -> usize {
        self.config.concurrency.max(1)
    }

    pub fn max_traversal_depth(&self) -> usize {
        self.config.max_traversal_depth
    }

    /// 把相对路径拼到基准 URL 上；`..` 越界在这里就被拦下
    pub(crate) fn url_for(&self, path: &str) -> DavResult<Url> {
        let rel = paths::join_path("", &[path])?;
        if rel.is_empty() {
            // 根路径保留基准 URL 的尾部斜杠
            return Ok((*self.auth.base_url).clone());
        }

        let mut url = (*self.auth.base_url).clone();
        {
            // Url::path_segments_mut 逐段推入，分段自动做百分号转义
            let mut segments = url.path_segments_mut().map_err(|_| DavError::Path {
                op: "url",
                path: path.to_string(),
                reason: "基准 URL 不支持路径段".to_string(),
            })?;
            segments.pop_if_empty();
            for seg in rel.split('/').filter(|s| !s.is_empty()) {
                segments.push(seg);
            }
        }
        Ok(url)
    }

    // ---- 请求底座 ----------------------------------------------------

    /// 发送一次请求（带可重试循环）。body 只接受静态文本，流式上传走
    /// [`Self::put_stream`]，因为流消耗后无法重建、也就无法重试。
    pub(crate) async fn request(
        &self,
        method: WebDavMethod,
        op: &'static str,
        path: &str,
        extra_headers: HeaderMap,
        body: Option<&'static str>,
    ) -> DavResult<Response> {
        self.request_with_timeout(method, op, path, extra_headers, body, Some(self.config.timeout))
            .await
    }

    /// 同 [`Self::request`]，但允许指定整体超时；流式 GET 用
    /// `transfer_timeout`，重试只覆盖到响应头就位为止，不会打断取流
    async fn request_with_timeout(
        &self,
        method: WebDavMethod,
        op: &'static str,
        path: &str,
        extra_headers: HeaderMap,
        body: Option<&'static str>,
        timeout: Option<Duration>,
    ) -> DavResult<Response> {
        let url = self.url_for(path)?;
        let http_method = method.to_http_method()?;
        let retry = &self.config.retry;

        let mut attempt = 0usize;
        let mut delay = retry.initial_delay_ms;

        loop {
            let mut headers = extra_headers.clone();
            self.auth.apply(&http_method, &url, &mut headers).await?;

            let mut builder = self
                .http
                .request(http_method.clone(), url.clone())
                .headers(headers);
            if let Some(t) = timeout {
                builder = builder.timeout(t);
            }
            if let Some(text) = body {
                builder = builder.body(text);
            }

            match builder.send().await {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() || status.as_u16() == 207 {
                        return Ok(resp);
                    }

                    let retryable = status.as_u16() == 429 || status.is_server_error();
                    if retryable && method.is_read() && attempt < retry.max_retries {
                        warn!(
                            op,
                            path,
                            status = status.as_u16(),
                            attempt,
                            "服务端瞬时失败，{delay}ms 后重试"
                        );
                        sleep(Duration::from_millis(delay)).await;
                        delay = next_delay(delay, retry.backoff_multiplier, retry.max_delay_ms);
                        attempt += 1;
                        continue;
                    }

                    return Err(map_status(op, path, status));
                }
                Err(e) => {
                    let transient = e.is_timeout() || e.is_connect() || e.is_request();
                    if transient && method.is_read() && attempt < retry.max_retries {
                        warn!(op, path, error = %e, attempt, "网络瞬时失败，{delay}ms 后重试");
                        sleep(Duration::from_millis(delay)).await;
                        delay = next_delay(delay, retry.backoff_multiplier, retry.max_delay_ms);
                        attempt += 1;
                        continue;
                    }
                    return Err(DavError::Request(e));
                }
            }
        }
    }

    // ---- 协议动词 ----------------------------------------------------

    /// OPTIONS：探测服务端 DAV 能力集
    pub async fn options(&self, path: &str) -> DavResult<HashSet<String>> {
        let resp = self
            .request(WebDavMethod::Options, "options", path, HeaderMap::new(), None)
            .await?;
        let dav = resp
            .headers()
            .get("dav")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        Ok(dav
            .split(',')
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect())
    }

    /// PROPFIND：按指定深度查询属性，返回解析后的多状态记录
    pub async fn propfind(&self, path: &str, depth: Depth) -> DavResult<MultiStatus> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/xml"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/xml"));
        headers.insert("Depth", HeaderValue::from_static(depth.as_str()));

        let resp = self
            .request(
                WebDavMethod::Propfind,
                "propfind",
                path,
                headers,
                Some(PROPFIND_BODY),
            )
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if status.as_u16() != 207 {
            return Err(DavError::Unexpected {
                op: "propfind",
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        parse_multi_status(&text)
    }

    /// 查询单个资源的快照
    pub async fn stat(&self, path: &str) -> DavResult<ResourceInfo> {
        let multi_status = self.propfind(path, Depth::Zero).await?;
        let mut infos = multi_status.to_resource_infos(&self.auth.base_url)?;
        if infos.is_empty() {
            return Err(DavError::Parse(format!(
                "propfind {path:?} 的多状态响应不含任何 response"
            )));
        }
        // 首项即被查询资源本身
        Ok(infos.swap_remove(0))
    }

    /// 存在性检查
    pub async fn exists(&self, path: &str) -> DavResult<bool> {
        match self.stat(path).await {
            Ok(_) => Ok(true),
            Err(DavError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// 列出直接子项（depth=1），结果不含 `path` 自身
    pub async fn ls(&self, path: &str) -> DavResult<Vec<ResourceInfo>> {
        let multi_status = self.propfind(path, Depth::One).await?;
        let infos = multi_status.to_resource_infos(&self.auth.base_url)?;
        Ok(children_only(infos, path))
    }

    /// 只要名字不要详情的列举
    pub async fn ls_names(&self, path: &str) -> DavResult<Vec<String>> {
        Ok(self.ls(path).await?.into_iter().map(|i| i.path).collect())
    }

    /// MKCOL：创建集合。`exist_ok` 时已存在的目录不算失败
    pub async fn mkdir(&self, path: &str, exist_ok: bool) -> DavResult<()> {
        match self
            .request(WebDavMethod::Mkcol, "mkdir", path, HeaderMap::new(), None)
            .await
        {
            Ok(_) => Ok(()),
            Err(e @ DavError::Conflict { .. }) => {
                // 405 已存在 / 409 父目录缺失都会落到这里；
                // exist_ok 时确认目标确实是目录再放行
                if exist_ok && matches!(self.stat(path).await, Ok(info) if info.is_collection()) {
                    return Ok(());
                }
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// 逐级创建目录及缺失的中间路径
    pub async fn mkdirs(&self, path: &str) -> DavResult<()> {
        let rel = paths::join_path("", &[path])?;
        let parts: Vec<&str> = rel.split('/').filter(|s| !s.is_empty()).collect();
        for n in 0..parts.len() {
            let prefix = parts[..=n].join("/");
            self.mkdir(&prefix, true).await?;
        }
        Ok(())
    }

    /// DELETE：服务端对集合的删除天然是递归的
    pub async fn delete(&self, path: &str) -> DavResult<()> {
        self.request(WebDavMethod::Delete, "delete", path, HeaderMap::new(), None)
            .await?;
        Ok(())
    }

    /// 删除资源；`recursive=false` 时拒绝删除非空目录
    pub async fn remove(&self, path: &str, recursive: bool) -> DavResult<()> {
        if !recursive {
            let info = self.stat(path).await?;
            if info.is_collection() && !self.ls(path).await?.is_empty() {
                return Err(DavError::Conflict {
                    op: "remove",
                    path: path.to_string(),
                    reason: "目录非空，未开启递归删除".to_string(),
                });
            }
        }
        self.delete(path).await
    }

    /// COPY：服务端内部复制，不经过本地
    pub async fn copy(&self, from: &str, to: &str, overwrite: bool) -> DavResult<()> {
        self.transfer_remote(WebDavMethod::Copy, "copy", from, to, overwrite)
            .await
    }

    /// MOVE
    pub async fn mv(&self, from: &str, to: &str, overwrite: bool) -> DavResult<()> {
        self.transfer_remote(WebDavMethod::Move, "move", from, to, overwrite)
            .await
    }

    async fn transfer_remote(
        &self,
        method: WebDavMethod,
        op: &'static str,
        from: &str,
        to: &str,
        overwrite: bool,
    ) -> DavResult<()> {
        let dest = self.url_for(to)?;
        let mut headers = HeaderMap::new();
        headers.insert(
            "Destination",
            HeaderValue::from_str(dest.as_str()).map_err(|e| DavError::Path {
                op,
                path: to.to_string(),
                reason: e.to_string(),
            })?,
        );
        headers.insert(
            "Overwrite",
            HeaderValue::from_static(if overwrite { "T" } else { "F" }),
        );
        headers.insert("Depth", HeaderValue::from_static("infinity"));

        self.request(method, op, from, headers, None).await?;
        debug!(op, from, to, "远端转移完成");
        Ok(())
    }

    /// HEAD：轻量探测，返回原始响应（头部含大小、ETag 等）
    pub async fn head(&self, path: &str) -> DavResult<Response> {
        self.request(WebDavMethod::Head, "head", path, HeaderMap::new(), None)
            .await
    }

    /// GET：返回可流式读取的响应；`range` 为可选的字节区间（闭区间起点，
    /// 终点省略表示读到末尾）
    pub async fn get(&self, path: &str, range: Option<(u64, Option<u64>)>) -> DavResult<Response> {
        let mut headers = HeaderMap::new();
        if let Some((start, end)) = range {
            let value = match end {
                Some(end) => format!("bytes={start}-{end}"),
                None => format!("bytes={start}-"),
            };
            headers.insert(
                "Range",
                HeaderValue::from_str(&value).map_err(|e| DavError::Path {
                    op: "get",
                    path: path.to_string(),
                    reason: e.to_string(),
                })?,
            );
        }

        self.request_with_timeout(
            WebDavMethod::Get,
            "get",
            path,
            headers,
            None,
            self.config.transfer_timeout,
        )
        .await
    }

    /// PUT：流式上传任意 body；整文件从不落入内存
    pub async fn put_stream(
        &self,
        path: &str,
        body: Body,
        content_length: Option<u64>,
        overwrite: bool,
    ) -> DavResult<()> {
        if !overwrite && self.exists(path).await? {
            return Err(DavError::Conflict {
                op: "put",
                path: path.to_string(),
                reason: "目标已存在且未允许覆盖".to_string(),
            });
        }

        let url = self.url_for(path)?;
        let mut headers = HeaderMap::new();
        if let Some(len) = content_length {
            headers.insert(CONTENT_LENGTH, HeaderValue::from(len));
        }
        self.auth.apply(&Method::PUT, &url, &mut headers).await?;

        let mut builder = self.http.put(url).headers(headers).body(body);
        if let Some(t) = self.config.transfer_timeout {
            builder = builder.timeout(t);
        }
        let resp = builder.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(map_status("put", path, status));
        }
        Ok(())
    }

    // ---- 整文件便捷操作 ----------------------------------------------

    /// 下载远端文件到本地路径：写 `.part` 临时文件，成功后原子改名
    pub async fn download_file(
        &self,
        remote: &str,
        local: &std::path::Path,
        cancel: &CancelFlag,
    ) -> DavResult<()> {
        transfer::download_to_path(self, remote, local, cancel).await
    }

    /// 上传本地文件到远端路径：先传 `.part` 临时名，成功后 MOVE 到位
    pub async fn upload_file(
        &self,
        local: &std::path::Path,
        remote: &str,
        overwrite: bool,
        cancel: &CancelFlag,
    ) -> DavResult<()> {
        transfer::upload_from_path(self, local, remote, overwrite, cancel).await
    }
}

/// 状态码 → 错误映射；2xx 与 207 之外都会得到一个带操作与路径的错误
pub(crate) fn map_status(op: &'static str, path: &str, status: StatusCode) -> DavError {
    let code = status.as_u16();
    match code {
        401 | 403 => DavError::Auth {
            op,
            path: path.to_string(),
            status: code,
        },
        404 => DavError::NotFound {
            op,
            path: path.to_string(),
        },
        405 | 409 | 412 | 423 => DavError::Conflict {
            op,
            path: path.to_string(),
            reason: format!("状态码 {code}"),
        },
        429 | 500..=599 => DavError::Server {
            op,
            path: path.to_string(),
            status: code,
        },
        _ => DavError::Unexpected {
            op,
            path: path.to_string(),
            status: code,
        },
    }
}

fn next_delay(delay: u64, multiplier: f64, cap: u64) -> u64 {
    ((delay as f64 * multiplier) as u64).min(cap)
}
