use url::Url;

use crate::DavError;
use crate::lister::ResourceKind;
use crate::webdav::functions::{children_only, parse_multi_status};
use crate::webdav::traits::ToResourceInfos;

const BASIC_BODY: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<D:multistatus xmlns:D="DAV:">
  <D:response>
    <D:href>/remote/root/</D:href>
    <D:propstat>
      <D:prop>
        <D:displayname>root</D:displayname>
        <D:resourcetype><D:collection/></D:resourcetype>
        <D:getlastmodified>Fri, 17 Jan 2025 10:00:00 GMT</D:getlastmodified>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
  <D:response>
    <D:href>/remote/root/a%20file.txt</D:href>
    <D:propstat>
      <D:prop>
        <D:resourcetype/>
        <D:getcontentlength>42</D:getcontentlength>
        <D:getlastmodified>Fri, 17 Jan 2025 10:30:00 GMT</D:getlastmodified>
        <D:getetag>"abc123"</D:getetag>
        <D:getcontenttype>text/plain</D:getcontenttype>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#;

fn base_url() -> Url {
    Url::parse("https://example.org/remote/root/").unwrap()
}

#[test]
fn parses_responses_in_document_order() {
    let ms = parse_multi_status(BASIC_BODY).unwrap();
    assert_eq!(ms.responses.len(), 2);
    // 首项恒为被查询资源本身
    assert_eq!(ms.responses[0].href, "/remote/root/");
    assert!(ms.responses[0].props.is_collection);
    assert_eq!(ms.responses[1].props.content_length, Some(42));
}

#[test]
fn converts_to_resource_infos() {
    let ms = parse_multi_status(BASIC_BODY).unwrap();
    let infos = ms.to_resource_infos(&base_url()).unwrap();
    assert_eq!(infos.len(), 2);

    assert_eq!(infos[0].path, "");
    assert_eq!(infos[0].kind, ResourceKind::Collection);
    assert_eq!(infos[0].size, None);

    assert_eq!(infos[1].path, "a file.txt");
    assert_eq!(infos[1].kind, ResourceKind::File);
    assert_eq!(infos[1].size, Some(42));
    assert_eq!(infos[1].etag.as_deref(), Some("abc123"));
    assert_eq!(infos[1].content_type.as_deref(), Some("text/plain"));
    assert!(infos[1].modified.is_some());
}

#[test]
fn depth_one_children_exclude_self() {
    let ms = parse_multi_status(BASIC_BODY).unwrap();
    let infos = ms.to_resource_infos(&base_url()).unwrap();
    let children = children_only(infos, "");
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].path, "a file.txt");
}

#[test]
fn tolerates_foreign_prefixes_and_case() {
    // lp1 前缀 + 大小写混排 + 无前缀，取局部名小写匹配后应全部解析
    let body = r#"<?xml version="1.0"?>
<lp1:multistatus xmlns:lp1="DAV:">
  <lp1:response>
    <lp1:HREF>/f.bin</lp1:HREF>
    <lp1:propstat>
      <lp1:prop>
        <GETCONTENTLENGTH xmlns="DAV:">7</GETCONTENTLENGTH>
        <lp1:ResourceType/>
      </lp1:prop>
      <lp1:Status>HTTP/1.1 200 OK</lp1:Status>
    </lp1:propstat>
  </lp1:response>
</lp1:multistatus>"#;

    let ms = parse_multi_status(body).unwrap();
    assert_eq!(ms.responses.len(), 1);
    assert_eq!(ms.responses[0].href, "/f.bin");
    assert_eq!(ms.responses[0].props.content_length, Some(7));
}

#[test]
fn absent_properties_stay_unset() {
    let body = r#"<?xml version="1.0"?>
<D:multistatus xmlns:D="DAV:">
  <D:response>
    <D:href>/bare.txt</D:href>
    <D:propstat>
      <D:prop><D:resourcetype/></D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#;

    let ms = parse_multi_status(body).unwrap();
    let props = &ms.responses[0].props;
    assert_eq!(props.content_length, None);
    assert_eq!(props.last_modified, None);
    assert_eq!(props.etag, None);
    assert_eq!(props.content_type, None);
}

#[test]
fn only_ok_propstat_contributes() {
    // 404 propstat 里的属性不可信，只认 2xx 的那组
    let body = r#"<?xml version="1.0"?>
<D:multistatus xmlns:D="DAV:">
  <D:response>
    <D:href>/x.txt</D:href>
    <D:propstat>
      <D:prop><D:getcontentlength>9</D:getcontentlength></D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
    <D:propstat>
      <D:prop><D:getcontentlength>999</D:getcontentlength></D:prop>
      <D:status>HTTP/1.1 404 Not Found</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#;

    let ms = parse_multi_status(body).unwrap();
    assert_eq!(ms.responses[0].props.content_length, Some(9));
}

#[test]
fn missing_href_is_parse_error() {
    let body = r#"<?xml version="1.0"?>
<D:multistatus xmlns:D="DAV:">
  <D:response>
    <D:propstat>
      <D:prop><D:resourcetype/></D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#;

    assert!(matches!(
        parse_multi_status(body).unwrap_err(),
        DavError::Parse(_)
    ));
}

#[test]
fn malformed_body_is_parse_error() {
    assert!(matches!(
        parse_multi_status("<D:multistatus><unclosed").unwrap_err(),
        DavError::Parse(_)
    ));
}

#[test]
fn escaping_href_fails_conversion() {
    // 服务端把条目指到挂载点之外：整次列举失败而不是带出越界路径
    let body = r#"<?xml version="1.0"?>
<D:multistatus xmlns:D="DAV:">
  <D:response>
    <D:href>/elsewhere/secret.txt</D:href>
    <D:propstat>
      <D:prop><D:resourcetype/></D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#;

    let ms = parse_multi_status(body).unwrap();
    assert!(matches!(
        ms.to_resource_infos(&base_url()).unwrap_err(),
        DavError::Path { .. }
    ));
}

#[test]
fn rfc3339_modified_fallback() {
    let body = r#"<?xml version="1.0"?>
<D:multistatus xmlns:D="DAV:">
  <D:response>
    <D:href>/t.txt</D:href>
    <D:propstat>
      <D:prop><D:getlastmodified>2025-01-17T10:00:00Z</D:getlastmodified></D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#;

    let ms = parse_multi_status(body).unwrap();
    assert!(ms.responses[0].props.last_modified.is_some());
}
