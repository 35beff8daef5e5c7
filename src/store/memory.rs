//! # 内存存储（测试用）
//!
//! 不加锁，记录写入次数，便于断言 get-or-create 的行为。

use super::{
    new_uuid, CodeNode, ProcessNode, ProcessState, Store, StoreData, StoreLock, StructureFilter,
    StructureNode,
};
use crate::error::{CwfError, Result};
use crate::models::StructureData;

use std::cell::{Cell, RefCell};

#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RefCell<StoreData>,
    pub structure_writes: Cell<usize>,
    /// 为真时所有操作返回 `StoreUnavailable`
    pub offline: Cell<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.get() {
            return Err(CwfError::StoreUnavailable {
                path: "memory".to_string(),
                reason: "store is offline".to_string(),
            });
        }
        Ok(())
    }
}

impl Store for MemoryStore {
    fn query_structures(&self, filter: &StructureFilter) -> Result<Vec<StructureNode>> {
        self.check_online()?;
        Ok(self
            .data
            .borrow()
            .structures
            .iter()
            .filter(|node| filter.matches(&node.structure))
            .cloned()
            .collect())
    }

    fn store_structure(&self, structure: StructureData) -> Result<String> {
        self.check_online()?;
        let uuid = new_uuid()?;
        let mut data = self.data.borrow_mut();
        let pk = data.allocate_pk();
        data.structures.push(StructureNode {
            pk,
            uuid: uuid.clone(),
            structure,
        });
        self.structure_writes.set(self.structure_writes.get() + 1);
        Ok(uuid)
    }

    fn query_codes(&self, input_plugin: &str) -> Result<Vec<CodeNode>> {
        self.check_online()?;
        Ok(self
            .data
            .borrow()
            .codes
            .iter()
            .filter(|c| c.input_plugin == input_plugin)
            .cloned()
            .collect())
    }

    fn store_code(&self, label: &str, input_plugin: &str, description: &str) -> Result<CodeNode> {
        self.check_online()?;
        let mut data = self.data.borrow_mut();
        let code = CodeNode {
            pk: data.allocate_pk(),
            uuid: new_uuid()?,
            label: label.to_string(),
            input_plugin: input_plugin.to_string(),
            description: description.to_string(),
        };
        data.codes.push(code.clone());
        Ok(code)
    }

    fn store_process(
        &self,
        process_label: &str,
        inputs: serde_json::Value,
        state: ProcessState,
    ) -> Result<ProcessNode> {
        self.check_online()?;
        let mut data = self.data.borrow_mut();
        let process = ProcessNode {
            pk: data.allocate_pk(),
            uuid: new_uuid()?,
            process_label: process_label.to_string(),
            inputs,
            state,
        };
        data.processes.push(process.clone());
        Ok(process)
    }

    fn lock_exclusive(&self) -> Result<StoreLock> {
        self.check_online()?;
        Ok(StoreLock::unlocked())
    }
}
