//! 批处理脚本解析：一行一命令，`#` 开头是注释，空行忽略。

use thiserror::Error;

use crate::internal::error::DavError;

/// 批处理支持的动词
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandVerb {
    Ls,
    Mkdir,
    Rm,
    Mv,
    Cp,
    Get,
    Put,
    Du,
    Exists,
}

impl CommandVerb {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ls" => Some(Self::Ls),
            "mkdir" => Some(Self::Mkdir),
            "rm" => Some(Self::Rm),
            "mv" => Some(Self::Mv),
            "cp" => Some(Self::Cp),
            "get" => Some(Self::Get),
            "put" => Some(Self::Put),
            "du" => Some(Self::Du),
            "exists" => Some(Self::Exists),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ls => "ls",
            Self::Mkdir => "mkdir",
            Self::Rm => "rm",
            Self::Mv => "mv",
            Self::Cp => "cp",
            Self::Get => "get",
            Self::Put => "put",
            Self::Du => "du",
            Self::Exists => "exists",
        }
    }

    /// 允许的参数个数区间
    fn arity(&self) -> (usize, usize) {
        match self {
            // ls/du 缺省列根目录
            Self::Ls | Self::Du => (0, 1),
            Self::Mkdir | Self::Rm | Self::Exists => (1, 1),
            Self::Mv | Self::Cp | Self::Get | Self::Put => (2, 2),
        }
    }
}

/// 脚本里的一条已解析命令；空行与注释行不产生命令
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    /// 脚本中的行号（从 1 起），报错时指认现场
    pub line: usize,
    pub verb: CommandVerb,
    pub args: Vec<String>,
}

/// 批处理错误：解析与执行失败都带行号
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("第 {line} 行: 未知命令 {verb:?}")]
    UnknownVerb { line: usize, verb: String },

    #[error("第 {line} 行: {verb} 需要 {min}~{max} 个参数，实际 {got} 个")]
    BadArity {
        line: usize,
        verb: &'static str,
        min: usize,
        max: usize,
        got: usize,
    },

    #[error("第 {line} 行: {command} 执行失败: {source}")]
    Exec {
        line: usize,
        command: String,
        #[source]
        source: DavError,
    },
}

/// 解析整段脚本（UTF-8 文本，一行一命令）
pub fn parse_script(text: &str) -> Result<Vec<Command>, BatchError> {
    let mut commands = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut tokens = trimmed.split_whitespace();
        let word = tokens.next().unwrap_or_default();
        let verb = CommandVerb::parse(word).ok_or_else(|| BatchError::UnknownVerb {
            line,
            verb: word.to_string(),
        })?;

        let args: Vec<String> = tokens.map(str::to_string).collect();
        let (min, max) = verb.arity();
        if args.len() < min || args.len() > max {
            return Err(BatchError::BadArity {
                line,
                verb: verb.as_str(),
                min,
                max,
                got: args.len(),
            });
        }

        commands.push(Command { line, verb, args });
    }

    Ok(commands)
}
