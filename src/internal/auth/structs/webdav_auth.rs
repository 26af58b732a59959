use core::fmt;
use std::sync::Arc;

use base64::Engine;
use reqwest::Method;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use sha2::{Digest, Sha256};
use url::Url;

use crate::internal::auth::traits::sign::SignRequest;
use crate::internal::error::{DavError, DavResult};

/// 认证方案：在客户端构造时选定，之后每次请求套用同一个方案
#[derive(Clone)]
pub enum AuthScheme {
    /// 匿名访问
    None,
    /// 用户名 + 密码（Basic）
    Basic { username: String, password: String },
    /// Bearer token
    Bearer(String),
    /// 自定义签名钩子
    Custom(Arc<dyn SignRequest>),
}

/// 认证结构体
///
/// 该结构体定位
/// - 存储基准 URL 与认证方案，供传输客户端在每次请求前签名
/// - URL user-info 中内嵌的账号密码会被提取进方案并从 URL 中剥离
///
/// 默认 Eq 时会匹配 base_url 和凭据指纹；只比凭据用 eq_only_token 方法
#[derive(Clone)]
pub struct WebdavAuth {
    pub base_url: Arc<Url>, // Arc 共享，并发任务里到处要用
    pub(crate) scheme: AuthScheme,
    // 凭据的 sha256 指纹，用于比较是否同一账号而不留存明文
    pub(crate) fingerprint: Arc<String>,
}

impl WebdavAuth {
    /// 用户名密码认证
    pub fn basic(base_url: &str, username: &str, password: &str) -> DavResult<Self> {
        let (url, _) = format_base_url(base_url)?;
        Self::build(
            url,
            AuthScheme::Basic {
                username: username.to_string(),
                password: password.to_string(),
            },
        )
    }

    /// Bearer token 认证
    pub fn bearer(base_url: &str, token: &str) -> DavResult<Self> {
        let (url, _) = format_base_url(base_url)?;
        Self::build(url, AuthScheme::Bearer(token.to_string()))
    }

    /// 自定义签名钩子认证
    pub fn custom(base_url: &str, signer: Arc<dyn SignRequest>) -> DavResult<Self> {
        let (url, _) = format_base_url(base_url)?;
        Self::build(url, AuthScheme::Custom(signer))
    }

    /// 匿名访问；URL user-info 里带了账号密码时自动转为 Basic
    pub fn anonymous(base_url: &str) -> DavResult<Self> {
        let (url, embedded) = format_base_url(base_url)?;
        let scheme = match embedded {
            Some((username, password)) => AuthScheme::Basic { username, password },
            None => AuthScheme::None,
        };
        Self::build(url, scheme)
    }

    fn build(base_url: Url, scheme: AuthScheme) -> DavResult<Self> {
        let fingerprint = match &scheme {
            AuthScheme::None => encrypt_str("anonymous"),
            AuthScheme::Basic { username, password } => {
                let token = base64::engine::general_purpose::STANDARD
                    .encode(format!("{username}:{password}"));
                encrypt_str(&token)
            }
            AuthScheme::Bearer(token) => encrypt_str(token),
            // 钩子没有稳定的凭据材料，按实例地址区分
            AuthScheme::Custom(signer) => encrypt_str(&format!("custom:{:p}", Arc::as_ptr(signer))),
        };

        Ok(Self {
            base_url: Arc::new(base_url),
            scheme,
            fingerprint: Arc::new(fingerprint),
        })
    }

    /// 为一次请求补齐认证头
    pub(crate) async fn apply(
        &self,
        method: &Method,
        url: &Url,
        headers: &mut HeaderMap,
    ) -> DavResult<()> {
        match &self.scheme {
            AuthScheme::None => {}
            AuthScheme::Basic { username, password } => {
                let token = base64::engine::general_purpose::STANDARD
                    .encode(format!("{username}:{password}"));
                headers.insert(AUTHORIZATION, header_value(&format!("Basic {token}"), url)?);
            }
            AuthScheme::Bearer(token) => {
                headers.insert(AUTHORIZATION, header_value(&format!("Bearer {token}"), url)?);
            }
            AuthScheme::Custom(signer) => {
                signer
                    .sign(method, url, headers)
                    .await
                    .map_err(|_| DavError::Auth {
                        op: "sign",
                        path: url.path().to_string(),
                        status: 401,
                    })?;
            }
        }
        Ok(())
    }

    /// 仅比较凭据指纹是否相等
    pub fn eq_only_token(&self, other: &Self) -> bool {
        self.fingerprint == other.fingerprint
    }
}

/// 用于比较认证结构体是否相等
impl PartialEq for WebdavAuth {
    fn eq(&self, other: &Self) -> bool {
        self.fingerprint == other.fingerprint && self.base_url == other.base_url
    }
}

/// 防止 debug 泄漏账号
impl fmt::Debug for WebdavAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebdavAuth")
            .field("base_url", &redacted_url(&self.base_url))
            .field("scheme", &"<hidden credentials>")
            .finish()
    }
}

fn encrypt_str(data: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn header_value(value: &str, url: &Url) -> DavResult<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| DavError::Path {
        op: "auth",
        path: url.to_string(),
        reason: e.to_string(),
    })
}

fn redacted_url(url: &Url) -> String {
    let mut url = url.clone();
    let _ = url.set_username("");
    let _ = url.set_password(None);
    url.to_string()
}

/// 规范化基准 URL：保证尾部斜杠，剥离并返回 user-info 中内嵌的账号密码
fn format_base_url(url: &str) -> DavResult<(Url, Option<(String, String)>)> {
    if url.is_empty() {
        return Err(DavError::Path {
            op: "auth",
            path: String::new(),
            reason: "基准 URL 为空".to_string(),
        });
    }

    let mut base_url = Url::parse(url).map_err(|e| DavError::Path {
        op: "auth",
        path: url.to_string(),
        reason: e.to_string(),
    })?;

    let embedded = if !base_url.username().is_empty() {
        let username = crate::internal::paths::decode_path(base_url.username());
        let password = base_url
            .password()
            .map(crate::internal::paths::decode_path)
            .unwrap_or_default();
        let _ = base_url.set_username("");
        let _ = base_url.set_password(None);
        Some((username, password))
    } else {
        None
    };

    if !base_url.path().ends_with('/') {
        let new_path = format!("{}/", base_url.path());
        base_url.set_path(&new_path);
    }

    Ok((base_url, embedded))
}
