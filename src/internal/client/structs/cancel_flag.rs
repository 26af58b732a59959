use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 取消旗标：克隆共享，任意持有方置位后，进行中的传输在块间检查并中止
///
/// 中止的下载只会留下 `.part` 临时文件并被清理，不会出现与完整产物
/// 无法区分的半成品。
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
