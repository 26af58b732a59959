//! 多状态（207）响应的原始解析。
//!
//! 不用 serde 映射而是手写事件流解析，原因有二：
//! - 各家服务端的命名空间前缀五花八门（`D:`、`d:`、`lp1:`、无前缀），
//!   按局部名匹配才能全部兼容；
//! - 个别不合规服务端会改变属性元素的大小写，匹配前统一转小写。

use chrono::{DateTime, FixedOffset};
use quick_xml::Reader;
use quick_xml::events::Event;
use quick_xml::name::QName;

use crate::internal::error::{DavError, DavResult};

/// 对应 WebDAV 响应 XML 顶层的 `<D:multistatus>` 节点
#[derive(Debug, Clone)]
pub struct MultiStatus {
    /// `<D:response>` 节点列表，保持文档顺序：首项即被查询的资源本身
    pub responses: Vec<RawResponse>,
}

/// 对应单个 `<D:response>` 节点
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// `<D:href>`：资源路径（URL 编码，需要解码才能显示原始文件名）
    pub href: String,
    /// 第一个 2xx `<D:propstat>` 中的属性集；没有时为全空属性
    pub props: RawProps,
    /// response 级别的 `<D:status>` 状态码（批量操作的失败项会带）
    pub status: Option<u16>,
}

/// 对应 `<D:prop>` 节点中我们关心的属性；缺失的属性一律按未设置处理
#[derive(Debug, Clone, Default)]
pub struct RawProps {
    /// `<resourcetype>` 下出现 `<collection/>` 即目录
    pub is_collection: bool,
    /// `<getcontentlength>`：文件大小（字节），目录一般没有此字段
    pub content_length: Option<u64>,
    /// `<getlastmodified>`：最后修改时间（HTTP-date 格式）
    pub last_modified: Option<DateTime<FixedOffset>>,
    /// `<creationdate>`：创建时间（ISO8601）
    pub creation_date: Option<DateTime<FixedOffset>>,
    /// `<getetag>`：实体标签
    pub etag: Option<String>,
    /// `<getcontenttype>`：MIME 类型
    pub content_type: Option<String>,
    /// `<displayname>`：显示名
    pub display_name: Option<String>,
}

/// 一个 propstat 的累积状态：属性集 + 对应的 HTTP 状态
#[derive(Default)]
struct PropStatAcc {
    props: RawProps,
    status: Option<u16>,
}

/// 解析 207 响应体；malformed 或 response 缺 href 时整体失败
pub fn parse_multi_status(xml: &str) -> DavResult<MultiStatus> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut responses = Vec::new();

    // 当前 response 的累积状态
    let mut href: Option<String> = None;
    let mut response_status: Option<u16> = None;
    let mut propstats: Vec<PropStatAcc> = Vec::new();

    let mut in_response = false;
    let mut in_propstat = false;
    let mut in_resourcetype = false;
    let mut current_element = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = local_name(e.name())?;
                match name.as_str() {
                    "response" => {
                        in_response = true;
                        href = None;
                        response_status = None;
                        propstats = Vec::new();
                    }
                    "propstat" => {
                        in_propstat = true;
                        propstats.push(PropStatAcc::default());
                    }
                    "resourcetype" => in_resourcetype = true,
                    "collection" if in_resourcetype => {
                        if let Some(ps) = propstats.last_mut() {
                            ps.props.is_collection = true;
                        }
                    }
                    _ => current_element = name,
                }
            }
            // 自闭合元素没有对应的 End 事件，单独处理避免状态位悬挂
            Ok(Event::Empty(ref e)) => {
                let name = local_name(e.name())?;
                if name == "collection" && in_resourcetype {
                    if let Some(ps) = propstats.last_mut() {
                        ps.props.is_collection = true;
                    }
                }
            }
            Ok(Event::Text(ref e)) => {
                if !in_response {
                    continue;
                }
                let text = e
                    .xml_content()
                    .map_err(|e| DavError::Parse(e.to_string()))?
                    .trim()
                    .to_string();
                if text.is_empty() {
                    continue;
                }
                apply_text(
                    &current_element,
                    text,
                    in_propstat,
                    &mut href,
                    &mut response_status,
                    propstats.last_mut(),
                );
            }
            Ok(Event::End(ref e)) => {
                let name = local_name(e.name())?;
                match name.as_str() {
                    "response" => {
                        let href = href.take().ok_or_else(|| {
                            DavError::Parse("response 节点缺少 href".to_string())
                        })?;
                        responses.push(RawResponse {
                            href,
                            props: take_ok_props(std::mem::take(&mut propstats)),
                            status: response_status.take(),
                        });
                        in_response = false;
                    }
                    "propstat" => in_propstat = false,
                    "resourcetype" => in_resourcetype = false,
                    _ => {}
                }
                current_element.clear();
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(DavError::Parse(e.to_string())),
            _ => {}
        }
    }

    Ok(MultiStatus { responses })
}

/// 把一段文本写入当前累积状态
fn apply_text(
    element: &str,
    text: String,
    in_propstat: bool,
    href: &mut Option<String>,
    response_status: &mut Option<u16>,
    propstat: Option<&mut PropStatAcc>,
) {
    match element {
        "href" if !in_propstat => *href = Some(text),
        "status" => {
            let code = parse_status_line(&text);
            if in_propstat {
                if let Some(ps) = propstat {
                    ps.status = code;
                }
            } else {
                *response_status = code;
            }
        }
        _ => {
            let Some(ps) = propstat else { return };
            match element {
                "getcontentlength" => ps.props.content_length = text.parse().ok(),
                "getlastmodified" => ps.props.last_modified = parse_http_date(&text),
                "creationdate" => ps.props.creation_date = parse_iso_date(&text),
                "getetag" => ps.props.etag = Some(text),
                "getcontenttype" => ps.props.content_type = Some(text),
                "displayname" => ps.props.display_name = Some(text),
                _ => {}
            }
        }
    }
}

/// 从 propstats 中拿到第一个 HTTP 状态是 2xx 的属性集
///
/// 没有任何 2xx propstat 时返回全空属性（属性缺失不是错误），
/// 保证 N 个 response 节点恒产出 N 条记录。
fn take_ok_props(propstats: Vec<PropStatAcc>) -> RawProps {
    propstats
        .into_iter()
        .find(|ps| ps.status.map(|c| (200..=299).contains(&c)).unwrap_or(false))
        .map(|ps| ps.props)
        .unwrap_or_default()
}

/// 取元素局部名并统一小写，抹平命名空间前缀与大小写差异
fn local_name(qname: QName<'_>) -> DavResult<String> {
    let local = qname.local_name();
    let name = std::str::from_utf8(local.as_ref())
        .map_err(|e| DavError::Parse(format!("元素名不是合法 UTF-8: {e}")))?;
    Ok(name.to_ascii_lowercase())
}

/// 解析 "HTTP/1.1 200 OK" 一类的状态行，取出状态码
fn parse_status_line(line: &str) -> Option<u16> {
    line.split_whitespace().find_map(|t| t.parse::<u16>().ok())
}

/// HTTP-date（RFC2822）解析，个别服务端给 ISO8601，做一次回退
pub(crate) fn parse_http_date(text: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc2822(text)
        .or_else(|_| DateTime::parse_from_rfc3339(text))
        .ok()
}

/// ISO8601（RFC3339）解析，回退到 RFC2822
pub(crate) fn parse_iso_date(text: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(text)
        .or_else(|_| DateTime::parse_from_rfc2822(text))
        .ok()
}
