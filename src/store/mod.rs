//! # 数据存储模块
//!
//! 持久化节点（结构、code、过程记录）的存储接口。
//!
//! 存储以 trait `Store` 注入：生产环境使用 `JsonStore`（profile 目录下的
//! `store.json`），测试使用内存实现。每个节点有顺序分配的 `pk` 和随机 UUID。
//!
//! ## 依赖关系
//! - 被 `context.rs`、`options/presets.rs`、`commands/` 使用
//! - 使用 `models/structure.rs`
//! - 子模块: default_structure, json, memory (测试)

pub mod default_structure;
pub mod json;
#[cfg(test)]
pub mod memory;

pub use default_structure::get_default_structure;
pub use json::JsonStore;

use crate::error::{CwfError, Result};
use crate::models::StructureData;

use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fs::File;
use std::rc::Rc;

/// 存储中的结构节点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureNode {
    pub pk: u64,
    pub uuid: String,
    pub structure: StructureData,
}

/// 已配置的计算 code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeNode {
    pub pk: u64,
    pub uuid: String,
    pub label: String,
    pub input_plugin: String,
    #[serde(default)]
    pub description: String,
}

/// 过程状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    /// 已创建，等待在本地执行
    Created,
    /// 已提交给 daemon，等待调度
    Waiting,
}

impl std::fmt::Display for ProcessState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessState::Created => write!(f, "created"),
            ProcessState::Waiting => write!(f, "waiting"),
        }
    }
}

/// 一次工作流启动的记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessNode {
    pub pk: u64,
    pub uuid: String,
    pub process_label: String,
    pub inputs: serde_json::Value,
    pub state: ProcessState,
}

/// 结构查询过滤器；所有字段为 `None` 时匹配全部结构
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructureFilter {
    /// site 总数
    pub site_count: Option<usize>,
    /// kind 数量
    pub kind_count: Option<usize>,
    /// 第一个 kind 的第一个元素符号
    pub first_symbol: Option<String>,
}

impl StructureFilter {
    pub fn matches(&self, structure: &StructureData) -> bool {
        if let Some(n) = self.site_count {
            if structure.sites.len() != n {
                return false;
            }
        }
        if let Some(n) = self.kind_count {
            if structure.kinds.len() != n {
                return false;
            }
        }
        if let Some(symbol) = &self.first_symbol {
            if structure.first_symbol() != Some(symbol.as_str()) {
                return false;
            }
        }
        true
    }
}

/// 存储的完整内容（JSON 与内存实现共用）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct StoreData {
    #[serde(default)]
    pub next_pk: u64,
    #[serde(default)]
    pub structures: Vec<StructureNode>,
    #[serde(default)]
    pub codes: Vec<CodeNode>,
    #[serde(default)]
    pub processes: Vec<ProcessNode>,
}

impl StoreData {
    pub fn allocate_pk(&mut self) -> u64 {
        self.next_pk += 1;
        self.next_pk
    }
}

/// 独占锁；drop 时释放
#[derive(Debug)]
pub struct StoreLock {
    file: Option<File>,
    held: Option<Rc<Cell<bool>>>,
}

impl StoreLock {
    /// 不提供锁的存储使用的空锁
    #[cfg(test)]
    pub fn unlocked() -> Self {
        StoreLock {
            file: None,
            held: None,
        }
    }

    pub(crate) fn held(file: File, flag: Rc<Cell<bool>>) -> Self {
        flag.set(true);
        StoreLock {
            file: Some(file),
            held: Some(flag),
        }
    }

    pub fn is_held(&self) -> bool {
        self.file.is_some()
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            let _ = fs2::FileExt::unlock(&file);
        }
        if let Some(flag) = &self.held {
            flag.set(false);
        }
    }
}

/// 持久化存储接口
pub trait Store {
    /// 按存储顺序返回匹配过滤器的结构
    fn query_structures(&self, filter: &StructureFilter) -> Result<Vec<StructureNode>>;

    /// 保存结构，返回其 UUID
    fn store_structure(&self, structure: StructureData) -> Result<String>;

    /// 按 input plugin 查询 code（存储顺序）
    fn query_codes(&self, input_plugin: &str) -> Result<Vec<CodeNode>>;

    fn store_code(&self, label: &str, input_plugin: &str, description: &str) -> Result<CodeNode>;

    fn store_process(
        &self,
        process_label: &str,
        inputs: serde_json::Value,
        state: ProcessState,
    ) -> Result<ProcessNode>;

    /// 获取跨进程的独占锁，用于 查询-再-创建 序列
    fn lock_exclusive(&self) -> Result<StoreLock>;

    /// 通过 pk 或 UUID（可为前缀）加载结构
    fn load_structure(&self, identifier: &str) -> Result<StructureNode> {
        let nodes = self.query_structures(&StructureFilter::default())?;
        resolve_identifier(nodes, identifier)
    }
}

fn resolve_identifier(nodes: Vec<StructureNode>, identifier: &str) -> Result<StructureNode> {
    let identifier = identifier.trim();
    let not_found = || CwfError::NotFound {
        kind: "Structure".to_string(),
        identifier: identifier.to_string(),
    };

    if let Ok(pk) = identifier.parse::<u64>() {
        if let Some(node) = nodes.iter().find(|n| n.pk == pk) {
            return Ok(node.clone());
        }
    }

    if identifier.is_empty() {
        return Err(not_found());
    }

    let mut matches = nodes.into_iter().filter(|n| n.uuid.starts_with(identifier));
    let first = matches.next().ok_or_else(not_found)?;
    if matches.next().is_some() {
        return Err(CwfError::InvalidArgument(format!(
            "UUID prefix '{}' matches more than one structure",
            identifier
        )));
    }
    Ok(first)
}

/// 生成随机 UUID（version 4 格式）
pub(crate) fn new_uuid() -> Result<String> {
    let mut bytes = [0u8; 16];
    getrandom::getrandom(&mut bytes).map_err(|e| CwfError::StoreUnavailable {
        path: "random source".to_string(),
        reason: e.to_string(),
    })?;
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    let hex = hex::encode(bytes);
    Ok(format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::structure::Lattice;

    fn structure(symbols: &[&str]) -> StructureData {
        let mut s = StructureData::new(Lattice::from_parameters(3.0, 3.0, 3.0, 90.0, 90.0, 90.0));
        for (i, symbol) in symbols.iter().enumerate() {
            s.append_atom(symbol, [i as f64, 0.0, 0.0]);
        }
        s
    }

    fn node(pk: u64, uuid: &str) -> StructureNode {
        StructureNode {
            pk,
            uuid: uuid.to_string(),
            structure: structure(&["Si"]),
        }
    }

    #[test]
    fn test_filter_matches() {
        let filter = StructureFilter {
            site_count: Some(2),
            kind_count: Some(1),
            first_symbol: Some("Si".to_string()),
        };
        assert!(filter.matches(&structure(&["Si", "Si"])));
        assert!(!filter.matches(&structure(&["Si"])));
        assert!(!filter.matches(&structure(&["Si", "Ge"])));
        assert!(!filter.matches(&structure(&["Ge", "Ge"])));
        assert!(StructureFilter::default().matches(&structure(&["C"])));
    }

    #[test]
    fn test_uuid_format() {
        let a = new_uuid().unwrap();
        let b = new_uuid().unwrap();
        assert_ne!(a, b);
        assert_eq!(a.len(), 36);
        assert_eq!(a.matches('-').count(), 4);
        assert_eq!(&a[14..15], "4");
    }

    #[test]
    fn test_resolve_identifier_by_pk_and_prefix() {
        let nodes = vec![node(1, "abc-111"), node(2, "abd-222"), node(3, "fff-333")];

        assert_eq!(resolve_identifier(nodes.clone(), "2").unwrap().pk, 2);
        assert_eq!(resolve_identifier(nodes.clone(), "fff").unwrap().pk, 3);
        assert_eq!(resolve_identifier(nodes.clone(), "abc-111").unwrap().pk, 1);

        assert!(matches!(
            resolve_identifier(nodes.clone(), "ab"),
            Err(CwfError::InvalidArgument(_))
        ));
        assert!(matches!(
            resolve_identifier(nodes.clone(), "zzz"),
            Err(CwfError::NotFound { .. })
        ));
        assert!(matches!(
            resolve_identifier(nodes, ""),
            Err(CwfError::NotFound { .. })
        ));
    }
}
