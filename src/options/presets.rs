//! # 预定义选项
//!
//! 工作流启动命令共用的参数预设，以及它们的类型转换函数。
//! 每个预设函数都返回一个新定义，命令可以在其上覆盖帮助文本、标志、
//! 是否必填等属性。
//!
//! ## 依赖关系
//! - 被 `cli/launch.rs` 使用
//! - 延迟计算调用 `registry::list_implementations`、`models::relax::list_relax_types`、
//!   `store::get_default_structure`

use super::spec::{Deferred, OptionDefinition, OptionValue, ValueKind};
use crate::context::Context;
use crate::error::{CwfError, Result};
use crate::models::relax::list_relax_types;
use crate::models::RelaxType;
use crate::registry::list_implementations;
use crate::store::get_default_structure;

/// 支持的协议
pub const PROTOCOLS: [&str; 3] = ["fast", "moderate", "precise"];

// ─────────────────────────────────────────────────────────────
// 类型转换
// ─────────────────────────────────────────────────────────────

pub fn coerce_float(_ctx: &Context, raw: &str) -> Result<OptionValue> {
    raw.trim()
        .parse::<f64>()
        .map(OptionValue::Float)
        .map_err(|_| CwfError::BadParameter {
            param: raw.to_string(),
            message: "expected a floating point number".to_string(),
        })
}

pub fn coerce_integer(_ctx: &Context, raw: &str) -> Result<OptionValue> {
    raw.trim()
        .parse::<u64>()
        .map(OptionValue::Integer)
        .map_err(|_| CwfError::BadParameter {
            param: raw.to_string(),
            message: "expected a non-negative integer".to_string(),
        })
}

pub fn coerce_relax_type(_ctx: &Context, raw: &str) -> Result<OptionValue> {
    raw.parse::<RelaxType>().map(OptionValue::RelaxType)
}

/// pk / UUID / UUID 前缀 -> 结构 UUID
pub fn coerce_structure(ctx: &Context, raw: &str) -> Result<OptionValue> {
    let node = ctx.store.load_structure(raw)?;
    Ok(OptionValue::Structure(node.uuid))
}

// ─────────────────────────────────────────────────────────────
// 预设
// ─────────────────────────────────────────────────────────────

/// 工作流实现（位置参数），候选集来自插件注册表
pub fn plugin() -> OptionDefinition {
    OptionDefinition::positional("plugin", 1)
        .metavar("PLUGIN")
        .required(true)
        .help("The registered workflow implementation to use.")
        .choices(Deferred::computed(|ctx| {
            Ok(list_implementations(ctx.registry.as_ref())?
                .into_iter()
                .collect())
        }))
}

pub fn structure() -> OptionDefinition {
    OptionDefinition::named("structure", Some('S'), "structure", ValueKind::Single)
        .metavar("STRUCTURE")
        .help("A structure data node (pk or UUID).")
        .default(Deferred::computed(|ctx| get_default_structure(ctx.store.as_ref())))
        .coerce(coerce_structure)
}

pub fn protocol() -> OptionDefinition {
    OptionDefinition::named("protocol", Some('p'), "protocol", ValueKind::Single)
        .help("Select the protocol with which the inputs for the workflow should be generated.")
        .literal_choices(&PROTOCOLS)
        .default_literal("fast")
}

pub fn relaxation_type() -> OptionDefinition {
    OptionDefinition::named("relaxation-type", Some('r'), "relaxation-type", ValueKind::Single)
        .help("Select the relaxation type with which the workflow should be run.")
        .choices(Deferred::computed(|_| {
            Ok(list_relax_types().into_iter().map(String::from).collect())
        }))
        .default_literal("atoms")
        .coerce(coerce_relax_type)
}

pub fn threshold_forces() -> OptionDefinition {
    OptionDefinition::named("threshold-forces", None, "threshold-forces", ValueKind::Single)
        .metavar("FLOAT")
        .help("Optional convergence threshold for the forces. Note that not all plugins may support this option.")
        .coerce(coerce_float)
}

pub fn threshold_stress() -> OptionDefinition {
    OptionDefinition::named("threshold-stress", None, "threshold-stress", ValueKind::Single)
        .metavar("FLOAT")
        .help("Optional convergence threshold for the stress. Note that not all plugins may support this option.")
        .coerce(coerce_float)
}

pub fn daemon() -> OptionDefinition {
    OptionDefinition::named("daemon", Some('d'), "daemon", ValueKind::Flag)
        .help("Submit the process to the daemon instead of running it locally.")
}

pub fn wallclock_seconds() -> OptionDefinition {
    OptionDefinition::named("wallclock-seconds", Some('w'), "wallclock-seconds", ValueKind::Multiple)
        .metavar("VALUES")
        .help("Define the wallclock seconds to request for each engine step.")
        .coerce(coerce_integer)
}

pub fn number_machines() -> OptionDefinition {
    OptionDefinition::named("number-machines", Some('m'), "number-machines", ValueKind::Multiple)
        .metavar("VALUES")
        .help("Define the number of machines to request for each engine step.")
        .coerce(coerce_integer)
}
