//! # JSON 文件存储
//!
//! profile 目录下的 `store.json` 保存全部节点，`store.lock` 作为跨进程的
//! 独占锁（`fs2` advisory lock）。
//!
//! 每次操作都重新读取文件，其他 cwf 进程的写入立即可见。写入先写临时文件
//! 再重命名。写操作在未持有独占锁时自行加锁，持有时复用。
//!
//! ## 依赖关系
//! - 被 `context.rs` 构建
//! - 实现 `store::Store`

use super::{
    new_uuid, CodeNode, ProcessNode, ProcessState, Store, StoreData, StoreLock, StructureFilter,
    StructureNode,
};
use crate::error::{CwfError, Result};
use crate::models::StructureData;

use fs2::FileExt;
use std::cell::Cell;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::rc::Rc;

const DATA_FILE: &str = "store.json";
const LOCK_FILE: &str = "store.lock";

/// 基于单个 JSON 文件的存储
#[derive(Debug)]
pub struct JsonStore {
    dir: PathBuf,
    lock_held: Rc<Cell<bool>>,
}

impl JsonStore {
    /// 打开（必要时创建）存储目录
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| CwfError::StoreUnavailable {
            path: dir.display().to_string(),
            reason: e.to_string(),
        })?;
        tracing::debug!(path = %dir.display(), "opened JSON store");

        Ok(JsonStore {
            dir,
            lock_held: Rc::new(Cell::new(false)),
        })
    }

    pub fn data_path(&self) -> PathBuf {
        self.dir.join(DATA_FILE)
    }

    fn lock_path(&self) -> PathBuf {
        self.dir.join(LOCK_FILE)
    }

    fn unavailable(&self, path: &Path, reason: impl ToString) -> CwfError {
        CwfError::StoreUnavailable {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    fn read(&self) -> Result<StoreData> {
        let path = self.data_path();
        if !path.exists() {
            return Ok(StoreData::default());
        }

        let content = fs::read_to_string(&path).map_err(|e| self.unavailable(&path, e))?;
        serde_json::from_str(&content).map_err(|e| CwfError::Serialization {
            path: path.display().to_string(),
            source: e,
        })
    }

    fn write(&self, data: &StoreData) -> Result<()> {
        let path = self.data_path();
        let tmp = self.dir.join(format!("{}.tmp", DATA_FILE));

        let content = serde_json::to_string_pretty(data).map_err(|e| CwfError::Serialization {
            path: path.display().to_string(),
            source: e,
        })?;
        fs::write(&tmp, content).map_err(|e| CwfError::FileWriteError {
            path: tmp.display().to_string(),
            source: e,
        })?;
        fs::rename(&tmp, &path).map_err(|e| CwfError::FileWriteError {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// 读-改-写；未持有独占锁时临时加锁
    fn update<T>(&self, apply: impl FnOnce(&mut StoreData) -> Result<T>) -> Result<T> {
        let _guard = if self.lock_held.get() {
            None
        } else {
            Some(self.lock_exclusive()?)
        };

        let mut data = self.read()?;
        let value = apply(&mut data)?;
        self.write(&data)?;
        Ok(value)
    }
}

impl Store for JsonStore {
    fn query_structures(&self, filter: &StructureFilter) -> Result<Vec<StructureNode>> {
        let data = self.read()?;
        Ok(data
            .structures
            .into_iter()
            .filter(|node| filter.matches(&node.structure))
            .collect())
    }

    fn store_structure(&self, structure: StructureData) -> Result<String> {
        let uuid = new_uuid()?;
        let pk = self.update(|data| {
            let pk = data.allocate_pk();
            data.structures.push(StructureNode {
                pk,
                uuid: uuid.clone(),
                structure,
            });
            Ok(pk)
        })?;
        tracing::debug!(pk, uuid = %uuid, "stored structure node");
        Ok(uuid)
    }

    fn query_codes(&self, input_plugin: &str) -> Result<Vec<CodeNode>> {
        let data = self.read()?;
        Ok(data
            .codes
            .into_iter()
            .filter(|code| code.input_plugin == input_plugin)
            .collect())
    }

    fn store_code(&self, label: &str, input_plugin: &str, description: &str) -> Result<CodeNode> {
        let uuid = new_uuid()?;
        self.update(|data| {
            if data.codes.iter().any(|c| c.label == label) {
                return Err(CwfError::InvalidArgument(format!(
                    "a code labelled '{}' already exists",
                    label
                )));
            }
            let code = CodeNode {
                pk: data.allocate_pk(),
                uuid,
                label: label.to_string(),
                input_plugin: input_plugin.to_string(),
                description: description.to_string(),
            };
            data.codes.push(code.clone());
            Ok(code)
        })
    }

    fn store_process(
        &self,
        process_label: &str,
        inputs: serde_json::Value,
        state: ProcessState,
    ) -> Result<ProcessNode> {
        let uuid = new_uuid()?;
        self.update(|data| {
            let process = ProcessNode {
                pk: data.allocate_pk(),
                uuid,
                process_label: process_label.to_string(),
                inputs,
                state,
            };
            data.processes.push(process.clone());
            Ok(process)
        })
    }

    fn lock_exclusive(&self) -> Result<StoreLock> {
        let path = self.lock_path();
        let file: File = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|e| self.unavailable(&path, e))?;
        file.lock_exclusive()
            .map_err(|e| self.unavailable(&path, e))?;
        tracing::trace!(path = %path.display(), "acquired store lock");

        Ok(StoreLock::held(file, Rc::clone(&self.lock_held)))
    }
}
