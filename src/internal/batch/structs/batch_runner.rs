//! 批处理执行器：对同一个客户端会话顺序执行脚本命令。
//!
//! 默认第一条失败即停，并报出失败命令的行号；逐条隔离
//! （continue-on-error）是显式选项，不是默认行为。

use std::path::Path;

use tracing::{info, warn};

use crate::internal::batch::structs::command::{BatchError, Command, CommandVerb, parse_script};
use crate::internal::client::structs::cancel_flag::CancelFlag;
use crate::internal::client::structs::webdav_client::WebdavClient;
use crate::internal::error::DavResult;
use crate::internal::lister::structs::resource_lister::{ListDepth, ResourceLister};

/// 一次批处理的汇总
#[derive(Debug, Default)]
pub struct BatchReport {
    /// 成功执行的命令数
    pub executed: usize,
    /// continue-on-error 模式下收集的失败（行号 + 原因）
    pub failures: Vec<(usize, crate::internal::error::DavError)>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// 批处理执行器
pub struct BatchRunner<'a> {
    client: &'a WebdavClient,
    continue_on_error: bool,
}

impl<'a> BatchRunner<'a> {
    pub fn new(client: &'a WebdavClient) -> Self {
        Self {
            client,
            continue_on_error: false,
        }
    }

    /// 单条命令失败后继续执行其余命令（失败仍会进入汇总）
    pub fn with_continue_on_error(mut self, on: bool) -> Self {
        self.continue_on_error = on;
        self
    }

    /// 解析并顺序执行整段脚本
    ///
    /// 脚本本身解析失败（未知动词、参数个数不对）无论什么模式都直接
    /// 返回错误，隔离只针对命令的执行失败。
    pub async fn run_script(&self, text: &str) -> Result<BatchReport, BatchError> {
        let commands = parse_script(text)?;
        let mut report = BatchReport::default();

        for command in &commands {
            match self.run_command(command).await {
                Ok(()) => report.executed += 1,
                Err(e) => {
                    if self.continue_on_error {
                        warn!(line = command.line, error = %e, "命令失败，继续执行后续命令");
                        report.failures.push((command.line, e));
                    } else {
                        return Err(BatchError::Exec {
                            line: command.line,
                            command: render(command),
                            source: e,
                        });
                    }
                }
            }
        }

        Ok(report)
    }

    async fn run_command(&self, command: &Command) -> DavResult<()> {
        let args = &command.args;
        let arg = |i: usize| args.get(i).map(String::as_str).unwrap_or("");

        match command.verb {
            CommandVerb::Ls => {
                for entry in self.client.ls(arg(0)).await? {
                    info!(path = %entry.path, size = entry.size, "ls");
                }
                Ok(())
            }
            CommandVerb::Mkdir => self.client.mkdirs(arg(0)).await,
            CommandVerb::Rm => self.client.remove(arg(0), true).await,
            CommandVerb::Mv => self.client.mv(arg(0), arg(1), true).await,
            CommandVerb::Cp => self.client.copy(arg(0), arg(1), true).await,
            CommandVerb::Get => {
                self.client
                    .download_file(arg(0), Path::new(arg(1)), &CancelFlag::new())
                    .await
            }
            CommandVerb::Put => {
                self.client
                    .upload_file(Path::new(arg(0)), arg(1), true, &CancelFlag::new())
                    .await
            }
            CommandVerb::Du => {
                let tree = ResourceLister::new(self.client)
                    .list(arg(0), ListDepth::Full)
                    .await?;
                let total: u64 = tree.entries.values().filter_map(|i| i.size).sum();
                info!(path = arg(0), bytes = total, files = tree.entries.len(), "du");
                Ok(())
            }
            CommandVerb::Exists => {
                let exists = self.client.exists(arg(0)).await?;
                info!(path = arg(0), exists, "exists");
                Ok(())
            }
        }
    }
}

fn render(command: &Command) -> String {
    let mut out = command.verb.as_str().to_string();
    for arg in &command.args {
        out.push(' ');
        out.push_str(arg);
    }
    out
}
