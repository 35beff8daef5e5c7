//! # 命令选项集
//!
//! 一个命令暴露的全部参数定义。负责把定义挂到 clap 命令上，并在解析后
//! 依次解析每个选项；任一选项出错即终止，不返回部分结果。
//!
//! ## 依赖关系
//! - 被 `cli/launch.rs` 构建，被 `commands/launch.rs` 解析
//! - 使用 `options/spec.rs`

use super::spec::{BoundOption, OptionDefinition, OptionValue, Origin};
use crate::context::Context;
use crate::error::Result;
use crate::models::RelaxType;

use clap::{ArgMatches, Command};

#[derive(Debug, Clone, Default)]
pub struct CommandOptionSet {
    options: Vec<OptionDefinition>,
}

impl CommandOptionSet {
    pub fn new() -> Self {
        CommandOptionSet::default()
    }

    /// 添加选项；同名选项会被替换
    pub fn with(mut self, option: OptionDefinition) -> Self {
        match self.options.iter_mut().find(|o| o.name == option.name) {
            Some(existing) => *existing = option,
            None => self.options.push(option),
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&OptionDefinition> {
        self.options.iter().find(|o| o.name == name)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.options.iter().map(|o| o.name).collect()
    }

    /// 把全部参数挂到 clap 命令上（不触发任何延迟计算）
    pub fn apply_to(&self, command: Command) -> Command {
        self.options
            .iter()
            .fold(command, |cmd, option| cmd.arg(option.to_arg()))
    }

    /// 按定义顺序解析全部选项
    pub fn resolve(&self, matches: &ArgMatches, ctx: &Context) -> Result<ResolvedOptions> {
        tracing::debug!(options = ?self.names(), "resolving command options");
        let bound = self
            .options
            .iter()
            .map(|option| option.resolve(matches, ctx))
            .collect::<Result<Vec<_>>>()?;
        Ok(ResolvedOptions { bound })
    }
}

/// 一次调用中全部选项的绑定结果
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOptions {
    bound: Vec<BoundOption>,
}

impl ResolvedOptions {
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.bound
            .iter()
            .find(|b| b.name == name)
            .and_then(|b| b.value.as_ref())
    }

    pub fn origin(&self, name: &str) -> Option<Origin> {
        self.bound.iter().find(|b| b.name == name).map(|b| b.origin)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(OptionValue::Text(v)) => Some(v),
            _ => None,
        }
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        match self.get(name) {
            Some(OptionValue::Float(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn flag(&self, name: &str) -> bool {
        matches!(self.get(name), Some(OptionValue::Flag(true)))
    }

    /// 多值整数选项；未提供时为 `None`
    pub fn integers(&self, name: &str) -> Option<Vec<u64>> {
        match self.get(name) {
            Some(OptionValue::List(values)) => Some(
                values
                    .iter()
                    .filter_map(|v| match v {
                        OptionValue::Integer(i) => Some(*i),
                        _ => None,
                    })
                    .collect(),
            ),
            _ => None,
        }
    }

    pub fn structure(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(OptionValue::Structure(uuid)) => Some(uuid),
            _ => None,
        }
    }

    pub fn relax_type(&self, name: &str) -> Option<RelaxType> {
        match self.get(name) {
            Some(OptionValue::RelaxType(t)) => Some(*t),
            _ => None,
        }
    }
}
