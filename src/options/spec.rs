//! # 延迟求值的选项定义
//!
//! `OptionDefinition` 描述一个命令行参数：标志、取值形式、帮助文本、
//! 默认值、候选集和类型转换。默认值和候选集既可以是字面量，也可以是
//! 延迟计算（`Deferred::Computed`），后者在每次调用解析选项时才求值，
//! 注册表与存储只在解析时可用。
//!
//! 每次调用的取值流程：
//! ```text
//! Unresolved -> (用户提供? Parsed : Defaulted) -> Coerced -> Bound
//! ```
//! 候选集只在存在待校验的原始值时才求值。
//!
//! 预设通过构造函数得到新实例，builder 方法按值消费并返回定义，
//! 因此针对某个命令的覆盖不会影响共享预设。
//!
//! ## 依赖关系
//! - 被 `options/set.rs`、`options/presets.rs` 使用
//! - 使用 `context.rs`、`clap`

use crate::context::Context;
use crate::error::{CwfError, Result};
use crate::models::RelaxType;

use clap::{Arg, ArgAction, ArgMatches};
use std::fmt;
use std::rc::Rc;

/// 延迟计算
pub type Computation<T> = Rc<dyn Fn(&Context) -> Result<T>>;

/// 字面量或延迟计算
#[derive(Clone)]
pub enum Deferred<T> {
    Literal(T),
    Computed(Computation<T>),
}

impl<T: Clone> Deferred<T> {
    pub fn computed(f: impl Fn(&Context) -> Result<T> + 'static) -> Self {
        Deferred::Computed(Rc::new(f))
    }

    /// 求值；延迟计算每次调用都会重新执行
    pub fn evaluate(&self, ctx: &Context) -> Result<T> {
        match self {
            Deferred::Literal(value) => Ok(value.clone()),
            Deferred::Computed(f) => f(ctx),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Deferred::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Deferred::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// 类型转换后的选项值
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Text(String),
    Float(f64),
    Integer(u64),
    Flag(bool),
    List(Vec<OptionValue>),
    /// 结构节点的 UUID
    Structure(String),
    RelaxType(RelaxType),
}

/// 原始字符串 -> 领域值
pub type Coercion = fn(&Context, &str) -> Result<OptionValue>;

/// 参数的取值形式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// 布尔开关，不带值
    Flag,
    /// 单个值
    Single,
    /// 零个或多个值，保持输入顺序
    Multiple,
}

/// 参数在命令行上的写法
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flags {
    Named {
        short: Option<char>,
        long: &'static str,
    },
    /// 位置参数（从 1 开始）
    Positional(usize),
}

/// 解析流程中的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Unresolved,
    Parsed,
    Defaulted,
    Coerced,
    Bound,
}

/// 最终值的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// 用户在命令行上提供
    User,
    /// 来自默认值
    Default,
    /// 既未提供也无默认值
    Unset,
}

/// 一次调用中绑定好的选项
#[derive(Debug, Clone, PartialEq)]
pub struct BoundOption {
    pub name: &'static str,
    pub origin: Origin,
    pub value: Option<OptionValue>,
}

#[derive(Debug, Clone, PartialEq)]
enum RawValue {
    One(String),
    Many(Vec<String>),
}

impl RawValue {
    fn values(&self) -> &[String] {
        match self {
            RawValue::One(v) => std::slice::from_ref(v),
            RawValue::Many(vs) => vs,
        }
    }
}

fn coerce_text(_ctx: &Context, raw: &str) -> Result<OptionValue> {
    Ok(OptionValue::Text(raw.to_string()))
}

fn coerce_flag(_ctx: &Context, raw: &str) -> Result<OptionValue> {
    Ok(OptionValue::Flag(raw == "true"))
}

/// 一个命令行参数的完整定义
#[derive(Clone)]
pub struct OptionDefinition {
    pub name: &'static str,
    pub flags: Flags,
    pub kind: ValueKind,
    pub help: &'static str,
    pub metavar: Option<&'static str>,
    pub required: bool,
    pub default: Option<Deferred<String>>,
    pub choices: Option<Deferred<Vec<String>>>,
    pub coerce: Coercion,
}

impl fmt::Debug for OptionDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionDefinition")
            .field("name", &self.name)
            .field("flags", &self.flags)
            .field("kind", &self.kind)
            .field("required", &self.required)
            .field("default", &self.default)
            .field("choices", &self.choices)
            .finish()
    }
}

impl OptionDefinition {
    pub fn new(name: &'static str, flags: Flags, kind: ValueKind) -> Self {
        let (default, coerce): (Option<Deferred<String>>, Coercion) = match kind {
            ValueKind::Flag => (Some(Deferred::Literal("false".to_string())), coerce_flag),
            _ => (None, coerce_text),
        };
        OptionDefinition {
            name,
            flags,
            kind,
            help: "",
            metavar: None,
            required: false,
            default,
            choices: None,
            coerce,
        }
    }

    /// `-s/--long` 形式的选项
    pub fn named(name: &'static str, short: Option<char>, long: &'static str, kind: ValueKind) -> Self {
        OptionDefinition::new(name, Flags::Named { short, long }, kind)
    }

    /// 位置参数
    pub fn positional(name: &'static str, index: usize) -> Self {
        OptionDefinition::new(name, Flags::Positional(index), ValueKind::Single)
    }

    // ─────────────────────────────────────────────────────────────
    // 覆盖（按值消费，不修改共享预设）
    // ─────────────────────────────────────────────────────────────

    pub fn help(mut self, help: &'static str) -> Self {
        self.help = help;
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn flags(mut self, short: Option<char>, long: &'static str) -> Self {
        self.flags = Flags::Named { short, long };
        self
    }

    pub fn metavar(mut self, metavar: &'static str) -> Self {
        self.metavar = Some(metavar);
        self
    }

    pub fn default(mut self, default: Deferred<String>) -> Self {
        self.default = Some(default);
        self
    }

    pub fn default_literal(self, default: &str) -> Self {
        self.default(Deferred::Literal(default.to_string()))
    }

    pub fn choices(mut self, choices: Deferred<Vec<String>>) -> Self {
        self.choices = Some(choices);
        self
    }

    pub fn literal_choices(self, choices: &[&str]) -> Self {
        self.choices(Deferred::Literal(
            choices.iter().map(|c| c.to_string()).collect(),
        ))
    }

    pub fn coerce(mut self, coerce: Coercion) -> Self {
        self.coerce = coerce;
        self
    }

    // ─────────────────────────────────────────────────────────────
    // clap 集成
    // ─────────────────────────────────────────────────────────────

    /// 错误信息中使用的名称
    pub fn display_name(&self) -> String {
        match &self.flags {
            Flags::Named { long, .. } => format!("--{}", long),
            Flags::Positional(_) => self
                .metavar
                .map(str::to_string)
                .unwrap_or_else(|| self.name.to_uppercase()),
        }
    }

    fn rendered_help(&self) -> String {
        let mut help = self.help.to_string();
        if let Some(Deferred::Literal(choices)) = &self.choices {
            help.push_str(&format!(" [possible values: {}]", choices.join(", ")));
        }
        if self.kind != ValueKind::Flag {
            match &self.default {
                Some(Deferred::Literal(value)) => help.push_str(&format!(" [default: {}]", value)),
                Some(Deferred::Computed(_)) => help.push_str(" [default: resolved at invocation]"),
                None => {}
            }
        }
        if self.required {
            help.push_str(" [required]");
        }
        help.trim().to_string()
    }

    /// 转换为 clap 参数。
    ///
    /// 默认值、候选集与必填校验都不交给 clap，由 `resolve` 处理；
    /// 构建命令行时不触发任何延迟计算。
    pub fn to_arg(&self) -> Arg {
        let mut arg = Arg::new(self.name).help(self.rendered_help());

        arg = match &self.flags {
            Flags::Named { short, long } => {
                let arg = arg.long(*long);
                match short {
                    Some(c) => arg.short(*c),
                    None => arg,
                }
            }
            Flags::Positional(index) => arg.index(*index),
        };

        arg = match self.kind {
            ValueKind::Flag => arg.action(ArgAction::SetTrue),
            ValueKind::Single => arg.action(ArgAction::Set).num_args(1),
            ValueKind::Multiple => arg.action(ArgAction::Set).num_args(0..),
        };

        if let Some(metavar) = self.metavar {
            arg = arg.value_name(metavar);
        }
        arg
    }

    fn raw_from_matches(&self, matches: &ArgMatches) -> Option<RawValue> {
        match self.kind {
            ValueKind::Flag => matches
                .get_flag(self.name)
                .then(|| RawValue::One("true".to_string())),
            ValueKind::Single => matches
                .get_one::<String>(self.name)
                .map(|v| RawValue::One(v.clone())),
            ValueKind::Multiple => matches
                .get_many::<String>(self.name)
                .map(|values| RawValue::Many(values.cloned().collect())),
        }
    }

    fn trace_stage(&self, stage: Stage) {
        tracing::trace!(option = self.name, stage = ?stage, "option resolution");
    }

    /// 解析本次调用中该选项的值
    pub fn resolve(&self, matches: &ArgMatches, ctx: &Context) -> Result<BoundOption> {
        self.trace_stage(Stage::Unresolved);

        let (raw, origin) = match self.raw_from_matches(matches) {
            Some(raw) => {
                self.trace_stage(Stage::Parsed);
                (raw, Origin::User)
            }
            None => match &self.default {
                Some(default) => {
                    let value = default.evaluate(ctx)?;
                    self.trace_stage(Stage::Defaulted);
                    let raw = match self.kind {
                        ValueKind::Multiple => RawValue::Many(vec![value]),
                        _ => RawValue::One(value),
                    };
                    (raw, Origin::Default)
                }
                None if self.required => {
                    return Err(CwfError::MissingRequiredOption {
                        option: self.display_name(),
                    })
                }
                None => {
                    self.trace_stage(Stage::Bound);
                    return Ok(BoundOption {
                        name: self.name,
                        origin: Origin::Unset,
                        value: None,
                    });
                }
            },
        };

        if let Some(choices) = &self.choices {
            let choices = choices.evaluate(ctx)?;
            if let Some(bad) = raw.values().iter().find(|v| !choices.contains(v)) {
                return Err(CwfError::InvalidChoice {
                    option: self.name.to_string(),
                    value: bad.clone(),
                    choices,
                });
            }
        }

        let value = match &raw {
            RawValue::One(v) => (self.coerce)(ctx, v)?,
            RawValue::Many(vs) => OptionValue::List(
                vs.iter()
                    .map(|v| (self.coerce)(ctx, v))
                    .collect::<Result<Vec<_>>>()?,
            ),
        };
        self.trace_stage(Stage::Coerced);

        self.trace_stage(Stage::Bound);
        Ok(BoundOption {
            name: self.name,
            origin,
            value: Some(value),
        })
    }
}
