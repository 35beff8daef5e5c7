//! # 插件注册表模块
//!
//! 查询注册表中已登记的公共弛豫工作流实现。
//!
//! 注册表以 trait `EntryPointSource` 注入，生产环境使用 JSON 清单
//! （`manifest.rs`），测试可替换为任意实现。
//! 每次查询都重新读取注册表，不做跨调用缓存。
//!
//! ## 依赖关系
//! - 被 `options/presets.rs`（延迟候选集）与 `commands/` 使用
//! - 子模块: manifest

pub mod manifest;

pub use manifest::ManifestRegistry;

use crate::error::{CwfError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 工作流入口点所在的组
pub const WORKFLOW_GROUP: &str = "aiida.workflows";

/// 公共弛豫工作流实现的命名空间前缀
pub const RELAX_PREFIX: &str = "common_workflows.relax.";

/// 工作流的一个计算引擎步骤
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineStep {
    /// 引擎名称（如 `relax`）
    pub name: String,
    /// 该步骤所需的 code 插件
    pub code_plugin: String,
    #[serde(default)]
    pub description: String,
}

/// 注册表中的一个工作流入口点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowEntry {
    /// 完整入口点名称，如 `common_workflows.relax.quantum_espresso`
    pub name: String,
    /// 按执行顺序排列的引擎步骤
    #[serde(default)]
    pub engines: Vec<EngineStep>,
    /// 实现支持的协议；为空表示不限制
    #[serde(default)]
    pub protocols: Vec<String>,
}

impl WorkflowEntry {
    pub fn is_valid_protocol(&self, protocol: &str) -> bool {
        self.protocols.is_empty() || self.protocols.iter().any(|p| p == protocol)
    }
}

/// 入口点来源（进程级注册表的抽象）
pub trait EntryPointSource {
    /// 列出某个组下的全部入口点名称
    fn entry_point_names(&self, group: &str) -> Result<Vec<String>>;

    /// 按完整名称加载入口点
    fn load_entry_point(&self, group: &str, name: &str) -> Result<WorkflowEntry>;
}

/// 返回已注册的公共弛豫工作流实现（去掉前缀的短名）
pub fn list_implementations(source: &dyn EntryPointSource) -> Result<BTreeSet<String>> {
    let names = source.entry_point_names(WORKFLOW_GROUP)?;
    let implementations: BTreeSet<String> = names
        .iter()
        .filter_map(|name| name.strip_prefix(RELAX_PREFIX))
        .filter(|short| !short.is_empty())
        .map(str::to_string)
        .collect();

    tracing::debug!(
        total = names.len(),
        matched = implementations.len(),
        "listed relax workflow implementations"
    );
    Ok(implementations)
}

/// 按短名加载公共弛豫工作流实现
pub fn load_workflow(source: &dyn EntryPointSource, short_name: &str) -> Result<WorkflowEntry> {
    let full_name = format!("{}{}", RELAX_PREFIX, short_name);
    source.load_entry_point(WORKFLOW_GROUP, &full_name)
}
