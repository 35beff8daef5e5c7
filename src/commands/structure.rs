//! # structure 命令实现
//!
//! ## 依赖关系
//! - 被 `commands/mod.rs` 调用
//! - 使用 `store/`（含默认结构）、`utils/output.rs`

use crate::cli::structure::{StructureAction, StructureArgs};
use crate::context::Context;
use crate::error::Result;
use crate::store::{get_default_structure, StructureNode};
use crate::utils::output;

use tabled::{Table, Tabled};

#[derive(Debug, Clone, Tabled)]
struct SiteRow {
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "x (Å)")]
    x: String,
    #[tabled(rename = "y (Å)")]
    y: String,
    #[tabled(rename = "z (Å)")]
    z: String,
}

/// 执行 structure 命令
pub fn execute(args: &StructureArgs, ctx: &Context) -> Result<()> {
    match &args.action {
        StructureAction::Default => {
            let uuid = get_default_structure(ctx.store.as_ref())?;
            let node = ctx.store.load_structure(&uuid)?;
            output::print_success(&format!(
                "Default structure {} <{}>",
                node.structure.formula(),
                node.pk
            ));
            println!("{}", node.uuid);
            Ok(())
        }
        StructureAction::Show { identifier } => {
            let node = ctx.store.load_structure(identifier)?;
            show(&node);
            Ok(())
        }
    }
}

fn show(node: &StructureNode) {
    let structure = &node.structure;
    let (a, b, c, alpha, beta, gamma) = structure.cell.parameters();

    output::print_header(&format!("{} <{}>", structure.formula(), node.pk));
    output::print_info(&format!("UUID: {}", node.uuid));
    output::print_info(&format!(
        "Cell: a={:.4} b={:.4} c={:.4} α={:.2} β={:.2} γ={:.2}",
        a, b, c, alpha, beta, gamma
    ));
    output::print_info(&format!("Volume: {:.4} Å³", structure.cell_volume()));

    let rows: Vec<SiteRow> = structure
        .sites
        .iter()
        .map(|site| SiteRow {
            kind: site.kind_name.clone(),
            x: format!("{:.6}", site.position[0]),
            y: format!("{:.6}", site.position[1]),
            z: format!("{:.6}", site.position[2]),
        })
        .collect();
    println!("{}", Table::new(&rows));
}
