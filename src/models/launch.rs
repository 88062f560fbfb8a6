//! 启动项模型

use serde::{Deserialize, Serialize};

/// 启动项：一个轮询程序对应一只股票
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchEntry {
    /// 股票代码
    pub symbol: String,
    /// 轮询程序路径（为空则使用启动器配置的默认程序）
    #[serde(default)]
    pub program: Option<String>,
    /// 额外的命令行参数
    #[serde(default)]
    pub args: Vec<String>,
}

impl LaunchEntry {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            program: None,
            args: Vec::new(),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = Some(program.into());
        self
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}
