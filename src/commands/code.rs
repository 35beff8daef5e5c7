//! # code 命令实现
//!
//! 在存储中登记计算 code，或按 input plugin 列出已登记的 code。
//! 启动工作流时按引擎所需的 plugin 查找 code。
//!
//! ## 依赖关系
//! - 被 `commands/mod.rs` 调用
//! - 使用 `cli/code.rs`、`store/`、`utils/output.rs`

use crate::cli::code::{CodeAction, CodeAddArgs, CodeArgs};
use crate::context::Context;
use crate::error::{CwfError, Result};
use crate::utils::output;

use tabled::{Table, Tabled};

#[derive(Debug, Clone, Tabled)]
struct CodeRow {
    #[tabled(rename = "PK")]
    pk: u64,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Description")]
    description: String,
}

/// 执行 code 命令
pub fn execute(args: &CodeArgs, ctx: &Context) -> Result<()> {
    match &args.action {
        CodeAction::Add(add) => add_code(add, ctx),
        CodeAction::List { plugin } => list_codes(plugin, ctx),
    }
}

fn add_code(args: &CodeAddArgs, ctx: &Context) -> Result<()> {
    if args.label.trim().is_empty() {
        return Err(CwfError::InvalidArgument(
            "code label must not be empty".to_string(),
        ));
    }
    let code = ctx
        .store
        .store_code(args.label.trim(), &args.plugin, &args.description)?;
    output::print_success(&format!(
        "Code '{}' <{}> configured for plugin '{}'",
        code.label, code.pk, code.input_plugin
    ));
    Ok(())
}

fn list_codes(plugin: &str, ctx: &Context) -> Result<()> {
    let codes = ctx.store.query_codes(plugin)?;
    if codes.is_empty() {
        output::print_warning(&format!("No codes configured for plugin '{}'", plugin));
        return Ok(());
    }

    let rows: Vec<CodeRow> = codes
        .into_iter()
        .map(|c| CodeRow {
            pk: c.pk,
            label: c.label,
            description: c.description,
        })
        .collect();
    println!("{}", Table::new(&rows));
    Ok(())
}
