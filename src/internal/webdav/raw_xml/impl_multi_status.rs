use url::Url;

use crate::internal::error::DavResult;
use crate::internal::lister::structs::resource_info::{ResourceInfo, ResourceKind};
use crate::internal::paths;
use crate::internal::webdav::raw_xml::raw_file::{MultiStatus, RawResponse};

/// 把原始多状态记录转换成领域快照，路径改写为相对客户端根目录
pub trait ToResourceInfos {
    fn to_resource_infos(self, base_url: &Url) -> DavResult<Vec<ResourceInfo>>;
}

impl ToResourceInfos for MultiStatus {
    fn to_resource_infos(self, base_url: &Url) -> DavResult<Vec<ResourceInfo>> {
        let root = paths::decode_path(base_url.path());
        let mut infos = Vec::with_capacity(self.responses.len());

        for response in self.responses {
            infos.push(to_resource_info(response, &root)?);
        }

        Ok(infos)
    }
}

fn to_resource_info(response: RawResponse, root: &str) -> DavResult<ResourceInfo> {
    let RawResponse { href, props, .. } = response;

    // href 可能是绝对 URL，也可能是绝对路径，统一取出路径部分再解码
    let href_path = match Url::parse(&href) {
        Ok(url) => url.path().to_string(),
        Err(_) => href.clone(),
    };
    let decoded = paths::decode_path(&href_path);

    // 畸形或越界的 href 视为服务端异常，整次列举失败
    let path = paths::relative_to(root, &decoded)?;

    let name = decode_name(props.display_name, &decoded);
    let kind = if props.is_collection {
        ResourceKind::Collection
    } else {
        ResourceKind::File
    };

    Ok(ResourceInfo {
        path,
        href,
        name,
        kind,
        // 目录的 content_length 没有意义，个别服务端乱给，强制清掉
        size: match kind {
            ResourceKind::File => props.content_length,
            ResourceKind::Collection => None,
        },
        modified: props.last_modified,
        created: props.creation_date,
        etag: clean_etag(props.etag),
        content_type: props.content_type,
    })
}

fn decode_name(display_name: Option<String>, decoded_href: &str) -> String {
    // 服务端给了 display_name 就直接用，否则取 href 末段
    display_name.unwrap_or_else(|| {
        decoded_href
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or("")
            .to_string()
    })
}

fn clean_etag(raw: Option<String>) -> Option<String> {
    // 去掉 ETag 的首尾引号以及多余空格
    raw.map(|s| s.trim().trim_matches('"').to_string())
}

/// 从 depth-1 结果中剔除被查询资源自身，只留子项
///
/// 多状态响应的首个 response 描述的是被查询路径本身，列子目录时
/// 调用方依赖这里的剔除。
pub fn children_only(infos: Vec<ResourceInfo>, self_path: &str) -> Vec<ResourceInfo> {
    let self_path = paths::normalize_path(self_path);
    infos
        .into_iter()
        .filter(|info| info.path != self_path)
        .collect()
}
