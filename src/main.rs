//! # cwf - 公共弛豫工作流启动器
//!
//! 以统一的命令行启动各插件注册的公共弛豫工作流。命令参数的默认值与
//! 候选集（已注册实现、弛豫类型、默认结构）在每次调用时才解析。
//!
//! ## 子命令
//! - `launch relax` / `launch eos` - 启动工作流
//! - `plugins` - 列出已注册的实现
//! - `relax-types` - 列出弛豫类型
//! - `code` - 登记 / 列出计算 code
//! - `structure` - 默认结构与结构查看
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── options/   (延迟解析的选项层)
//!   │     ├── registry/  (插件注册表)
//!   │     ├── store/     (数据存储与默认结构)
//!   │     └── models/    (结构、晶体构建、弛豫类型)
//!   ├── config.rs / context.rs
//!   ├── utils/      (输出工具)
//!   └── error.rs    (错误处理)
//! ```

mod cli;
mod commands;
mod config;
mod context;
mod error;
mod models;
mod options;
mod registry;
mod store;
mod utils;

use clap::FromArgMatches;
use cli::Cli;
use config::Config;
use tracing_subscriber::EnvFilter;

/// 日志过滤器的环境变量
const LOG_ENV: &str = "CWF_LOG";

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("cwf=debug"),
        _ => EnvFilter::new("cwf=trace"),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let matches = cli::build_command().get_matches();
    let cli = match Cli::from_arg_matches(&matches) {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };
    init_tracing(cli.verbose);

    let result = Config::resolve(cli.profile_dir.clone(), cli.registry_file.clone())
        .and_then(|config| commands::run(&cli, &matches, &config));

    if let Err(e) = result {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
