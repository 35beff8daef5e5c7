//! # code 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/code.rs`

use clap::{Args, Subcommand};

/// code 子命令参数
#[derive(Args, Debug)]
pub struct CodeArgs {
    #[command(subcommand)]
    pub action: CodeAction,
}

#[derive(Subcommand, Debug)]
pub enum CodeAction {
    /// Configure a new code in the data store
    Add(CodeAddArgs),

    /// List the configured codes for an input plugin
    List {
        /// Input plugin of the codes to list
        #[arg(long)]
        plugin: String,
    },
}

#[derive(Args, Debug)]
pub struct CodeAddArgs {
    /// Unique label of the code
    #[arg(long)]
    pub label: String,

    /// Calculation plugin the code is used with (e.g. quantumespresso.pw)
    #[arg(long)]
    pub plugin: String,

    /// Free-form description
    #[arg(long, default_value = "")]
    pub description: String,
}
