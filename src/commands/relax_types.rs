//! # relax-types 命令实现
//!
//! ## 依赖关系
//! - 被 `commands/mod.rs` 调用
//! - 使用 `models/relax.rs`

use crate::error::Result;
use crate::models::relax::list_relax_types;
use crate::utils::output;

pub fn execute() -> Result<()> {
    output::print_header("Relaxation Types");
    for label in list_relax_types() {
        println!("  {}", label);
    }
    Ok(())
}
