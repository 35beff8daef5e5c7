//! # 数据模型模块
//!
//! 定义晶体结构、按空间群构建晶体的工具，以及弛豫类型枚举。
//!
//! ## 依赖关系
//! - 被 `store/`、`options/` 和 `commands/` 使用
//! - 子模块: structure, crystal, relax

pub mod crystal;
pub mod relax;
pub mod structure;

pub use relax::RelaxType;
pub use structure::StructureData;
