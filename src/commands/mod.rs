//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。运行上下文（注册表 + 存储）在参数解析完成后
//! 才构建，再交给具体命令。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `context.rs`, `options/`, `registry/`, `store/`, `utils/`
//! - 子模块: code, launch, plugins, relax_types, structure

pub mod code;
pub mod launch;
pub mod plugins;
pub mod relax_types;
pub mod structure;

use crate::cli::launch::LAUNCH;
use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::context::Context;
use crate::error::{CwfError, Result};

use clap::ArgMatches;

/// 执行命令；只有用到注册表或存储的命令才打开上下文
pub fn run(cli: &Cli, matches: &ArgMatches, config: &Config) -> Result<()> {
    match (&cli.command, matches.subcommand()) {
        (Some(Commands::RelaxTypes), _) => relax_types::execute(),
        (Some(Commands::Plugins), _) => plugins::execute(&Context::open(config)?),
        (Some(Commands::Code(args)), _) => code::execute(args, &Context::open(config)?),
        (Some(Commands::Structure(args)), _) => {
            structure::execute(args, &Context::open(config)?)
        }
        (None, Some((LAUNCH, sub))) => launch::execute(sub, &Context::open(config)?),
        (None, _) => Err(CwfError::Usage(
            "no command given, see `cwf --help`".to_string(),
        )),
    }
}
