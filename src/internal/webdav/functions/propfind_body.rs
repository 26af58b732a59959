//! PROPFIND 请求体。

/// 常规属性查询请求体：按名列出同步与列举需要的属性
pub const PROPFIND_BODY: &str = r#"<?xml version="1.0" encoding="utf-8" ?>
<D:propfind xmlns:D="DAV:">
  <D:prop>
    <D:displayname/>
    <D:resourcetype/>
    <D:getcontentlength/>
    <D:getlastmodified/>
    <D:getcontenttype/>
    <D:getetag/>
    <D:creationdate/>
  </D:prop>
</D:propfind>"#;

/// allprop 请求体：个别服务端对按名查询支持不佳时的后备
pub const PROPFIND_ALLPROP_BODY: &str = r#"<?xml version="1.0" encoding="utf-8" ?>
<D:propfind xmlns:D="DAV:">
  <D:allprop/>
</D:propfind>"#;
