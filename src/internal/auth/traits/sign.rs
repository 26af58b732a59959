//! 认证相关 trait：自定义签名钩子，供传输客户端在每次请求前调用。

use async_trait::async_trait;
use reqwest::Method;
use reqwest::header::HeaderMap;
use url::Url;

/// 签名钩子拒绝请求时使用的错误。
#[derive(Debug, Clone)]
pub struct SignAbort(pub String);

impl std::fmt::Display for SignAbort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "签名钩子中止请求: {}", self.0)
    }
}

impl std::error::Error for SignAbort {}

/// 自定义请求签名：在 Basic / Bearer 之外接入任意认证方案。
///
/// 每次请求发出前调用一次；实现方往 `headers` 里写入需要的认证头。
/// 做成异步是因为真实场景里常要先刷新一次 token。
#[async_trait]
pub trait SignRequest: Send + Sync {
    /// 为一次请求补齐认证头。返回 `Err` 则本次请求按认证失败处理。
    async fn sign(
        &self,
        method: &Method,
        url: &Url,
        headers: &mut HeaderMap,
    ) -> Result<(), SignAbort>;
}
