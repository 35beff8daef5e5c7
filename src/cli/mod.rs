//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `launch`: 启动公共工作流（参数由 `options/` 动态构建）
//!   - `relax`: 公共弛豫工作流
//!   - `eos`: 状态方程工作流
//! - `plugins`: 列出已注册的弛豫工作流实现
//! - `relax-types`: 列出弛豫类型
//! - `code`: 管理已配置的 code
//! - `structure`: 查看存储中的结构
//!
//! `launch` 以 builder 方式挂到派生出的根命令上，其余子命令使用 derive。
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: code, launch, structure

pub mod code;
pub mod launch;
pub mod structure;

use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

/// cwf - 公共弛豫工作流启动器
#[derive(Parser, Debug)]
#[command(name = "cwf")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "Launch common relaxation workflows with lazily resolved options", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Profile directory holding the data store
    #[arg(long, global = true, env = "CWF_PROFILE_DIR")]
    pub profile_dir: Option<PathBuf>,

    /// Plugin registry manifest (default: <profile>/entry_points.json)
    #[arg(long, global = true, env = "CWF_REGISTRY_FILE")]
    pub registry_file: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// derive 定义的子命令
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the registered common relax workflow implementations
    Plugins,

    /// List the supported relaxation types
    RelaxTypes,

    /// Manage configured codes
    Code(code::CodeArgs),

    /// Inspect structures in the data store
    Structure(structure::StructureArgs),
}

/// 完整的命令树（derive 根命令 + builder 构建的 `launch`）
pub fn build_command() -> clap::Command {
    Cli::command()
        .subcommand(launch::command())
        .arg_required_else_help(true)
}
