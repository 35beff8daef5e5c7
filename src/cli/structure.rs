//! # structure 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/structure.rs`

use clap::{Args, Subcommand};

/// structure 子命令参数
#[derive(Args, Debug)]
pub struct StructureArgs {
    #[command(subcommand)]
    pub action: StructureAction,
}

#[derive(Subcommand, Debug)]
pub enum StructureAction {
    /// Print the default silicon structure, creating it if needed
    Default,

    /// Show a stored structure
    Show {
        /// Structure pk or UUID (prefix allowed)
        identifier: String,
    },
}
