//! # 弛豫类型
//!
//! 公共弛豫工作流支持的弛豫类型（封闭枚举），以及标签列表与字符串转换。
//!
//! ## 依赖关系
//! - 被 `options/presets.rs`（候选集与类型转换）和 `commands/launch.rs` 使用

use crate::error::{CwfError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 弛豫的自由度类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelaxType {
    /// 只优化原子位置
    Atoms,
    /// 只优化晶胞体积
    Volume,
    /// 只优化晶胞形状（体积不变）
    Shape,
    /// 优化晶胞形状与体积
    Cell,
    /// 原子位置 + 体积
    AtomsVolume,
    /// 原子位置 + 形状
    AtomsShape,
    /// 原子位置 + 完整晶胞
    AtomsCell,
}

impl RelaxType {
    /// 按声明顺序排列的全部成员
    pub const ALL: [RelaxType; 7] = [
        RelaxType::Atoms,
        RelaxType::Volume,
        RelaxType::Shape,
        RelaxType::Cell,
        RelaxType::AtomsVolume,
        RelaxType::AtomsShape,
        RelaxType::AtomsCell,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RelaxType::Atoms => "atoms",
            RelaxType::Volume => "volume",
            RelaxType::Shape => "shape",
            RelaxType::Cell => "cell",
            RelaxType::AtomsVolume => "atoms_volume",
            RelaxType::AtomsShape => "atoms_shape",
            RelaxType::AtomsCell => "atoms_cell",
        }
    }
}

impl std::fmt::Display for RelaxType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for RelaxType {
    type Err = CwfError;

    fn from_str(s: &str) -> Result<Self> {
        RelaxType::ALL
            .into_iter()
            .find(|t| t.label() == s)
            .ok_or_else(|| CwfError::InvalidChoice {
                option: "relaxation-type".to_string(),
                value: s.to_string(),
                choices: list_relax_types().into_iter().map(String::from).collect(),
            })
    }
}

/// 返回全部弛豫类型标签（声明顺序）
pub fn list_relax_types() -> Vec<&'static str> {
    RelaxType::ALL.iter().map(RelaxType::label).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_in_declaration_order() {
        assert_eq!(
            list_relax_types(),
            vec![
                "atoms",
                "volume",
                "shape",
                "cell",
                "atoms_volume",
                "atoms_shape",
                "atoms_cell"
            ]
        );
        assert_eq!(list_relax_types(), list_relax_types());
    }

    #[test]
    fn test_every_label_parses_to_its_member() {
        for member in RelaxType::ALL {
            assert_eq!(member.label().parse::<RelaxType>().unwrap(), member);
        }
    }

    #[test]
    fn test_unknown_label_is_invalid_choice() {
        for bad in ["", "Atoms", "full", "atoms-cell"] {
            match bad.parse::<RelaxType>() {
                Err(CwfError::InvalidChoice { value, choices, .. }) => {
                    assert_eq!(value, bad);
                    assert_eq!(choices.len(), RelaxType::ALL.len());
                }
                other => panic!("expected InvalidChoice, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_serde_uses_labels() {
        let json = serde_json::to_string(&RelaxType::AtomsCell).unwrap();
        assert_eq!(json, "\"atoms_cell\"");
    }
}
