//! # plugins 命令实现
//!
//! 以表格列出已注册的公共弛豫工作流实现及其引擎、协议。
//!
//! ## 依赖关系
//! - 被 `commands/mod.rs` 调用
//! - 使用 `registry/`、`utils/output.rs`

use crate::context::Context;
use crate::error::Result;
use crate::registry::{list_implementations, load_workflow};
use crate::utils::output;

use tabled::{Table, Tabled};

/// 表格中的一行
#[derive(Debug, Clone, Tabled)]
struct PluginRow {
    #[tabled(rename = "Plugin")]
    plugin: String,
    #[tabled(rename = "Engines")]
    engines: String,
    #[tabled(rename = "Protocols")]
    protocols: String,
}

fn plugin_rows(ctx: &Context) -> Result<Vec<PluginRow>> {
    list_implementations(ctx.registry.as_ref())?
        .into_iter()
        .map(|plugin| {
            let entry = load_workflow(ctx.registry.as_ref(), &plugin)?;
            let engines = entry
                .engines
                .iter()
                .map(|e| format!("{} ({})", e.name, e.code_plugin))
                .collect::<Vec<_>>()
                .join(", ");
            let protocols = if entry.protocols.is_empty() {
                "any".to_string()
            } else {
                entry.protocols.join(", ")
            };
            Ok(PluginRow {
                plugin,
                engines,
                protocols,
            })
        })
        .collect()
}

/// 执行 plugins 命令
pub fn execute(ctx: &Context) -> Result<()> {
    output::print_header("Registered Relax Workflows");

    let rows = plugin_rows(ctx)?;
    if rows.is_empty() {
        output::print_warning("No common relax workflow implementations are registered");
        return Ok(());
    }

    println!("{}", Table::new(&rows));
    output::print_done(&format!("{} implementation(s)", rows.len()));
    Ok(())
}
