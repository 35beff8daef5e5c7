//! # 默认结构
//!
//! 为需要结构输入的命令提供默认值：体相硅（金刚石结构原胞）。
//!
//! 先在存储中查找任意“2 个 site、1 个 kind、第一个符号为 Si”的结构，
//! 取第一个匹配；不存在时构建并保存一个。两个分支都只返回 UUID。
//!
//! 查询与创建在存储的独占锁内完成，共享同一 profile 的并发进程
//! 不会重复创建。
//!
//! ## 依赖关系
//! - 被 `options/presets.rs`（`--structure` 的延迟默认值）和 `commands/structure.rs` 使用
//! - 使用 `models/crystal.rs`

use super::{Store, StructureFilter};
use crate::error::Result;
use crate::models::crystal::crystal;
use crate::models::StructureData;

/// 默认结构的元素
pub const DEFAULT_SYMBOL: &str = "Si";

/// 硅的晶格常数 (Å)
pub const SILICON_LATTICE_PARAMETER: f64 = 5.43;

/// 金刚石结构空间群 Fd-3m
const DIAMOND_SPACE_GROUP: u16 = 227;

/// 匹配默认结构的过滤器
pub fn default_structure_filter() -> StructureFilter {
    StructureFilter {
        site_count: Some(2),
        kind_count: Some(1),
        first_symbol: Some(DEFAULT_SYMBOL.to_string()),
    }
}

/// 构建体相硅原胞
pub fn build_default_structure() -> Result<StructureData> {
    let alat = SILICON_LATTICE_PARAMETER;
    crystal(
        &[(DEFAULT_SYMBOL, [0.0, 0.0, 0.0])],
        DIAMOND_SPACE_GROUP,
        [alat, alat, alat, 90.0, 90.0, 90.0],
        true,
    )
}

/// 返回默认结构的 UUID，必要时创建
pub fn get_default_structure(store: &dyn Store) -> Result<String> {
    let lock = store.lock_exclusive()?;
    tracing::trace!(locked = lock.is_held(), "resolving default structure");

    let filter = default_structure_filter();
    if let Some(node) = store.query_structures(&filter)?.into_iter().next() {
        tracing::debug!(pk = node.pk, uuid = %node.uuid, "found default structure");
        return Ok(node.uuid);
    }

    let structure = build_default_structure()?;
    let uuid = store.store_structure(structure)?;
    tracing::info!(uuid = %uuid, "created default bulk silicon structure");
    Ok(uuid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CwfError;
    use crate::models::structure::Lattice;
    use crate::store::memory::MemoryStore;
    use crate::store::JsonStore;

    #[test]
    fn test_creates_structure_in_empty_store() {
        let store = MemoryStore::new();
        let uuid = get_default_structure(&store).unwrap();

        assert_eq!(store.structure_writes.get(), 1);
        let node = store.load_structure(&uuid).unwrap();
        assert_eq!(node.structure.sites.len(), 2);
        assert_eq!(node.structure.kinds.len(), 1);
        assert_eq!(node.structure.first_symbol(), Some("Si"));

        // 原胞体积 = a^3 / 4
        let expected = SILICON_LATTICE_PARAMETER.powi(3) / 4.0;
        assert!((node.structure.cell_volume() - expected).abs() < 1e-8);
        let (a, _, _, alpha, _, _) = node.structure.cell.parameters();
        assert!((a - SILICON_LATTICE_PARAMETER / 2f64.sqrt()).abs() < 1e-8);
        assert!((alpha - 60.0).abs() < 1e-6);
    }

    #[test]
    fn test_second_call_returns_same_identifier() {
        let store = MemoryStore::new();
        let first = get_default_structure(&store).unwrap();
        let second = get_default_structure(&store).unwrap();

        assert_eq!(first, second);
        assert_eq!(store.structure_writes.get(), 1);
    }

    #[test]
    fn test_existing_match_is_reused() {
        let store = MemoryStore::new();
        let mut other = StructureData::new(Lattice::from_parameters(4.0, 4.0, 4.0, 90.0, 90.0, 90.0));
        other.append_atom("Si", [0.0, 0.0, 0.0]);
        other.append_atom("Si", [2.0, 2.0, 2.0]);
        let existing = store.store_structure(other).unwrap();

        assert_eq!(get_default_structure(&store).unwrap(), existing);
        assert_eq!(store.structure_writes.get(), 1);
    }

    #[test]
    fn test_first_match_wins_on_duplicates() {
        let store = MemoryStore::new();
        let first = store.store_structure(build_default_structure().unwrap()).unwrap();
        store.store_structure(build_default_structure().unwrap()).unwrap();

        assert_eq!(get_default_structure(&store).unwrap(), first);
    }

    #[test]
    fn test_non_matching_structures_are_ignored() {
        let store = MemoryStore::new();
        let mut germanium =
            StructureData::new(Lattice::from_parameters(5.65, 5.65, 5.65, 90.0, 90.0, 90.0));
        germanium.append_atom("Ge", [0.0, 0.0, 0.0]);
        germanium.append_atom("Ge", [1.4, 1.4, 1.4]);
        let ge = store.store_structure(germanium).unwrap();

        let si = get_default_structure(&store).unwrap();
        assert_ne!(si, ge);
        assert_eq!(store.structure_writes.get(), 2);
    }

    #[test]
    fn test_store_unavailable_propagates() {
        let store = MemoryStore::new();
        store.offline.set(true);
        let err = get_default_structure(&store).unwrap_err();
        assert!(matches!(err, CwfError::StoreUnavailable { .. }));
    }

    #[test]
    fn test_idempotent_against_json_store() {
        let dir = tempfile::tempdir().unwrap();
        let first = get_default_structure(&JsonStore::open(dir.path()).unwrap()).unwrap();
        let second = get_default_structure(&JsonStore::open(dir.path()).unwrap()).unwrap();

        assert_eq!(first, second);
        let store = JsonStore::open(dir.path()).unwrap();
        assert_eq!(
            store.query_structures(&StructureFilter::default()).unwrap().len(),
            1
        );
    }

    #[test]
    fn test_concurrent_callers_share_one_structure() {
        let dir = tempfile::tempdir().unwrap();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let path = dir.path().to_path_buf();
                std::thread::spawn(move || {
                    let store = JsonStore::open(path).unwrap();
                    get_default_structure(&store).unwrap()
                })
            })
            .collect();

        let uuids: std::collections::BTreeSet<String> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(uuids.len(), 1);

        let store = JsonStore::open(dir.path()).unwrap();
        let stored = store.query_structures(&StructureFilter::default()).unwrap();
        assert_eq!(stored.len(), 1);
        assert!(uuids.contains(&stored[0].uuid));
    }
}
