use std::time::Duration;

/// 只读动词的重试参数：指数退避，封顶
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: usize,
    pub initial_delay_ms: u64,
    pub backoff_multiplier: f64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 500,
            backoff_multiplier: 2.0,
            max_delay_ms: 10_000,
        }
    }
}

/// 传输客户端配置
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// 普通请求的整体超时
    pub timeout: Duration,
    /// 流式上传/下载的整体超时；None 表示不限时，靠取消旗标收尾
    pub transfer_timeout: Option<Duration>,
    /// 并发上限：保护服务端，也保护本地 fd/socket 预算
    pub concurrency: usize,
    /// 全量遍历的最大深度，防御环状或病态的服务端响应
    pub max_traversal_depth: usize,
    pub retry: RetryConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            transfer_timeout: None,
            concurrency: 4,
            max_traversal_depth: 64,
            retry: RetryConfig::default(),
        }
    }
}
