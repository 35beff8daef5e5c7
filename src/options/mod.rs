//! # 命令行选项解析层
//!
//! 为命令提供可复用、可按命令覆盖的参数定义，默认值与候选集在每次调用时
//! 才求值，之后经类型转换绑定到命令主体。
//!
//! ## 依赖关系
//! - 被 `cli/launch.rs`、`commands/launch.rs` 使用
//! - 子模块: spec, set, presets

pub mod presets;
pub mod set;
pub mod spec;

pub use set::{CommandOptionSet, ResolvedOptions};
pub use spec::{OptionDefinition, ValueKind};
