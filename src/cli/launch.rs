//! # launch 子命令 CLI 定义
//!
//! `launch relax` 与 `launch eos` 由共享的选项预设组合而成，
//! 按命令覆盖帮助文本。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 使用 `options/presets.rs`
//! - 选项集在 `commands/launch.rs` 中解析

use crate::options::{presets, CommandOptionSet, OptionDefinition, ValueKind};
use clap::Command;

pub const LAUNCH: &str = "launch";
pub const RELAX: &str = "relax";
pub const EOS: &str = "eos";

fn show_engines() -> OptionDefinition {
    OptionDefinition::named("show-engines", None, "show-engines", ValueKind::Flag)
        .help("Show information on the required calculation engines.")
}

/// `launch relax` 的选项集
pub fn relax_options() -> CommandOptionSet {
    CommandOptionSet::new()
        .with(presets::plugin())
        .with(presets::structure().help("The structure to relax."))
        .with(presets::protocol())
        .with(presets::relaxation_type())
        .with(presets::threshold_forces())
        .with(presets::threshold_stress())
        .with(presets::number_machines())
        .with(presets::wallclock_seconds())
        .with(presets::daemon())
        .with(show_engines())
}

/// `launch eos` 的选项集（弛豫类型固定为 atoms）
pub fn eos_options() -> CommandOptionSet {
    CommandOptionSet::new()
        .with(presets::plugin())
        .with(presets::structure().help("The structure to compute the equation of state for."))
        .with(presets::protocol())
        .with(presets::threshold_forces())
        .with(presets::threshold_stress())
        .with(presets::number_machines())
        .with(presets::wallclock_seconds())
        .with(presets::daemon())
        .with(show_engines())
}

pub fn command() -> Command {
    let relax = Command::new(RELAX).about(
        "Relax a crystal structure using the common relax workflow for one of the registered implementations",
    );
    let eos = Command::new(EOS)
        .about("Compute the equation of state of a crystal structure using the common relax workflow");

    Command::new(LAUNCH)
        .about("Launch a common workflow")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(relax_options().apply_to(relax))
        .subcommand(eos_options().apply_to(eos))
}
