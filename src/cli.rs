//! 命令行参数
//!
//! - `tutor [--config <path>] scratch [language]`
//! - `tutor [--config <path>] compare [left] [right]`
//!
//! 不带子命令时等同于 `scratch`；未给出的语言取配置中的默认值。

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::core::SessionBuilder;
use crate::lesson::FlowVariant;

#[derive(Parser, Debug)]
#[command(name = "tutor")]
#[command(about = "Side-by-side programming lessons in the terminal", long_about = None)]
pub struct Cli {
    /// 额外的 TOML 配置文件（覆盖 config/default.toml）
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub mode: Option<Mode>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Learn a single language step by step
    Scratch { language: Option<String> },
    /// Compare two languages side by side
    #[command(alias = "comparison")]
    Compare {
        left: Option<String>,
        right: Option<String>,
    },
}

impl Cli {
    /// 路由到课程流程（路由参数只在会话开始时读取一次）
    pub fn flow(&self, builder: &SessionBuilder) -> FlowVariant {
        match &self.mode {
            None => builder.scratch(None),
            Some(Mode::Scratch { language }) => builder.scratch(language.as_deref()),
            Some(Mode::Compare { left, right }) => {
                builder.comparison(left.as_deref(), right.as_deref())
            }
        }
    }
}
