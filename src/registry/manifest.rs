//! # JSON 清单注册表
//!
//! 从 `entry_points.json` 读取入口点。清单格式：
//! ```text
//! {
//!   "aiida.workflows": [
//!     {
//!       "name": "common_workflows.relax.quantum_espresso",
//!       "engines": [
//!         { "name": "relax", "code_plugin": "quantumespresso.pw", "description": "..." }
//!       ],
//!       "protocols": ["fast", "moderate", "precise"]
//!     }
//!   ]
//! }
//! ```
//!
//! 清单不存在时视为空注册表；无法读取或格式错误时返回 `RegistryAccess`。
//!
//! ## 依赖关系
//! - 被 `context.rs` 构建
//! - 实现 `registry::EntryPointSource`

use super::{EntryPointSource, WorkflowEntry};
use crate::error::{CwfError, Result};

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// 组名 -> 入口点列表
pub type Manifest = BTreeMap<String, Vec<WorkflowEntry>>;

/// 基于 JSON 清单文件的注册表
#[derive(Debug, Clone)]
pub struct ManifestRegistry {
    path: PathBuf,
}

impl ManifestRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ManifestRegistry { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_manifest(&self) -> Result<Manifest> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no registry manifest, registry is empty");
            return Ok(Manifest::new());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| CwfError::RegistryAccess {
            reason: format!("cannot read {}: {}", self.path.display(), e),
        })?;

        serde_json::from_str(&content).map_err(|e| CwfError::RegistryAccess {
            reason: format!("malformed manifest {}: {}", self.path.display(), e),
        })
    }
}

impl EntryPointSource for ManifestRegistry {
    fn entry_point_names(&self, group: &str) -> Result<Vec<String>> {
        let manifest = self.read_manifest()?;
        Ok(manifest
            .get(group)
            .map(|entries| entries.iter().map(|e| e.name.clone()).collect())
            .unwrap_or_default())
    }

    fn load_entry_point(&self, group: &str, name: &str) -> Result<WorkflowEntry> {
        let manifest = self.read_manifest()?;
        manifest
            .get(group)
            .and_then(|entries| entries.iter().find(|e| e.name == name))
            .cloned()
            .ok_or_else(|| CwfError::NotFound {
                kind: format!("Entry point in group '{}'", group),
                identifier: name.to_string(),
            })
    }
}
