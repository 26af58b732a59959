//! 计划执行器：单个动作失败只记账不中断，整趟跑完给聚合结论。
//!
//! 分三个阶段执行，顺序不变量由阶段边界硬性保证而不是"建议"：
//! 1. 目录创建按计划序串行（父先于子）；
//! 2. 传输动作并发（各自目标路径互不相同，目录已就位）；
//! 3. 删除按计划序串行（深者在前）。

use futures_util::stream::{self, StreamExt};
use tokio::fs;
use tracing::{info, warn};

use crate::internal::client::structs::cancel_flag::CancelFlag;
use crate::internal::client::structs::webdav_client::WebdavClient;
use crate::internal::error::{DavError, DavResult};
use crate::internal::sync::structs::sync_action::{SyncAction, SyncPlan, SyncSide};

/// 单个动作的执行结果
#[derive(Debug)]
pub struct ActionOutcome {
    pub action: SyncAction,
    pub result: DavResult<()>,
}

/// 一趟执行的聚合报告
#[derive(Debug, Default)]
pub struct SyncReport {
    pub outcomes: Vec<ActionOutcome>,
}

impl SyncReport {
    /// 成功完成的实际动作数（Skip 不计）
    pub fn succeeded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.action.is_effective() && o.result.is_ok())
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_err()).count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| !o.action.is_effective())
            .count()
    }

    /// 任一动作失败即整趟失败（但其余动作照常执行完了）
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

/// 计划执行器
pub struct SyncExecutor<'a> {
    client: &'a WebdavClient,
    cancel: CancelFlag,
}

impl<'a> SyncExecutor<'a> {
    pub fn new(client: &'a WebdavClient) -> Self {
        Self {
            client,
            cancel: CancelFlag::new(),
        }
    }

    /// 共享外部的取消旗标
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// 逐动作执行计划；返回聚合报告，从不因单个动作失败提前中断
    pub async fn execute(&self, plan: SyncPlan) -> SyncReport {
        let mut dirs = Vec::new();
        let mut transfers = Vec::new();
        let mut deletes = Vec::new();
        let mut report = SyncReport::default();

        for action in plan.actions {
            match &action {
                SyncAction::MakeDirectory { .. } => dirs.push(action),
                SyncAction::Delete { .. } => deletes.push(action),
                SyncAction::Skip { .. } => report.outcomes.push(ActionOutcome {
                    action,
                    result: Ok(()),
                }),
                _ => transfers.push(action),
            }
        }

        // 阶段一：目录串行，父在前
        for action in dirs {
            let result = self.run_action(&action).await;
            self.record(&mut report, action, result);
        }

        // 阶段二：传输并发，受并发上限约束
        let concurrency = self.client.concurrency();
        let outcomes = stream::iter(transfers.into_iter().map(|action| async move {
            let result = self.run_action(&action).await;
            (action, result)
        }))
        .buffer_unordered(concurrency)
        .collect::<Vec<_>>()
        .await;
        for (action, result) in outcomes {
            self.record(&mut report, action, result);
        }

        // 阶段三：删除串行，深者在前
        for action in deletes {
            let result = self.run_action(&action).await;
            self.record(&mut report, action, result);
        }

        info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            skipped = report.skipped(),
            "同步执行完成"
        );
        report
    }

    fn record(&self, report: &mut SyncReport, action: SyncAction, result: DavResult<()>) {
        if let Err(e) = &result {
            warn!(target = %action.target(), error = %e, "同步动作失败，继续执行其余动作");
        }
        report.outcomes.push(ActionOutcome { action, result });
    }

    async fn run_action(&self, action: &SyncAction) -> DavResult<()> {
        if self.cancel.is_cancelled() {
            return Err(DavError::Cancelled {
                op: "sync",
                path: action.target(),
            });
        }

        match action {
            SyncAction::Upload { src, dest } => {
                self.client.upload_file(src, dest, true, &self.cancel).await
            }
            SyncAction::Download { src, dest } => {
                self.client.download_file(src, dest, &self.cancel).await
            }
            SyncAction::CopyRemote { src, dest } => self.client.copy(src, dest, true).await,
            SyncAction::MakeDirectory { path, side } => match side {
                SyncSide::Remote => self.client.mkdir(path, true).await,
                SyncSide::Local => {
                    fs::create_dir_all(path).await.map_err(|e| DavError::Io {
                        op: "mkdir",
                        path: path.clone(),
                        source: e,
                    })
                }
            },
            SyncAction::Delete { path, side } => match side {
                SyncSide::Remote => self.client.delete(path).await,
                SyncSide::Local => {
                    // 计划序保证子孙先被删；目录此时应已空
                    let meta = fs::metadata(path).await.map_err(|e| DavError::Io {
                        op: "delete",
                        path: path.clone(),
                        source: e,
                    })?;
                    let removed = if meta.is_dir() {
                        fs::remove_dir(path).await
                    } else {
                        fs::remove_file(path).await
                    };
                    removed.map_err(|e| DavError::Io {
                        op: "delete",
                        path: path.clone(),
                        source: e,
                    })
                }
            },
            SyncAction::Skip { .. } => Ok(()),
        }
    }
}
