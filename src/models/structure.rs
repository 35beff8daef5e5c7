//! # 晶体结构数据模型
//!
//! 与数据存储中保存的结构节点一致的表示：晶格 + kinds + sites。
//! 一个 kind 描述一类等价原子（符号），site 引用 kind 名称并给出笛卡尔坐标。
//!
//! ## 依赖关系
//! - 被 `models/crystal.rs`、`store/` 使用
//! - 无外部模块依赖

use serde::{Deserialize, Serialize};

/// 晶格参数表示
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lattice {
    /// 晶格向量矩阵 (3x3)，行向量表示 a, b, c（单位 Å）
    pub matrix: [[f64; 3]; 3],
}

impl Lattice {
    /// 从晶格参数 (a, b, c, alpha, beta, gamma) 创建晶格
    /// 角度单位：度
    pub fn from_parameters(a: f64, b: f64, c: f64, alpha: f64, beta: f64, gamma: f64) -> Self {
        let cos_alpha = alpha.to_radians().cos();
        let cos_beta = beta.to_radians().cos();
        let (sin_gamma, cos_gamma) = gamma.to_radians().sin_cos();

        let a_vec = [a, 0.0, 0.0];
        let b_vec = [b * cos_gamma, b * sin_gamma, 0.0];

        let c1 = c * cos_beta;
        let c2 = c * (cos_alpha - cos_beta * cos_gamma) / sin_gamma;
        let c3 = (c * c - c1 * c1 - c2 * c2).sqrt();

        Lattice {
            matrix: [a_vec, b_vec, [c1, c2, c3]],
        }
    }

    /// 从晶格向量矩阵创建
    pub fn from_vectors(matrix: [[f64; 3]; 3]) -> Self {
        Lattice { matrix }
    }

    /// 获取晶格参数 (a, b, c, alpha, beta, gamma)
    pub fn parameters(&self) -> (f64, f64, f64, f64, f64, f64) {
        let [a_vec, b_vec, c_vec] = self.matrix;

        let a = norm(&a_vec);
        let b = norm(&b_vec);
        let c = norm(&c_vec);

        let alpha = (dot(&b_vec, &c_vec) / (b * c)).acos().to_degrees();
        let beta = (dot(&a_vec, &c_vec) / (a * c)).acos().to_degrees();
        let gamma = (dot(&a_vec, &b_vec) / (a * b)).acos().to_degrees();

        (a, b, c, alpha, beta, gamma)
    }

    /// 计算晶格体积
    pub fn volume(&self) -> f64 {
        let [a, b, c] = self.matrix;
        a[0] * (b[1] * c[2] - b[2] * c[1]) - a[1] * (b[0] * c[2] - b[2] * c[0])
            + a[2] * (b[0] * c[1] - b[1] * c[0])
    }

    /// 分数坐标 -> 笛卡尔坐标
    pub fn to_cartesian(&self, frac: [f64; 3]) -> [f64; 3] {
        let mut cart = [0.0; 3];
        for (i, row) in self.matrix.iter().enumerate() {
            for k in 0..3 {
                cart[k] += frac[i] * row[k];
            }
        }
        cart
    }
}

fn dot(u: &[f64; 3], v: &[f64; 3]) -> f64 {
    u.iter().zip(v.iter()).map(|(x, y)| x * y).sum()
}

fn norm(v: &[f64; 3]) -> f64 {
    dot(v, v).sqrt()
}

/// 原子种类
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kind {
    /// kind 名称（通常等于元素符号）
    pub name: String,
    /// 元素符号列表（合金位点可有多个）
    pub symbols: Vec<String>,
}

impl Kind {
    pub fn new(symbol: impl Into<String>) -> Self {
        let symbol = symbol.into();
        Kind {
            name: symbol.clone(),
            symbols: vec![symbol],
        }
    }
}

/// 原子位点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    /// 所属 kind 名称
    pub kind_name: String,
    /// 笛卡尔坐标 (Å)
    pub position: [f64; 3],
}

/// 存储中的晶体结构
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureData {
    pub cell: Lattice,
    pub pbc: [bool; 3],
    pub kinds: Vec<Kind>,
    pub sites: Vec<Site>,
}

impl StructureData {
    pub fn new(cell: Lattice) -> Self {
        StructureData {
            cell,
            pbc: [true; 3],
            kinds: Vec::new(),
            sites: Vec::new(),
        }
    }

    /// 添加原子；kind 不存在时自动创建
    pub fn append_atom(&mut self, symbol: &str, position: [f64; 3]) {
        if !self.kinds.iter().any(|k| k.name == symbol) {
            self.kinds.push(Kind::new(symbol));
        }
        self.sites.push(Site {
            kind_name: symbol.to_string(),
            position,
        });
    }

    /// 第一个 kind 的第一个符号
    pub fn first_symbol(&self) -> Option<&str> {
        self.kinds
            .first()
            .and_then(|k| k.symbols.first())
            .map(String::as_str)
    }

    /// 计算化学式
    pub fn formula(&self) -> String {
        use std::collections::BTreeMap;
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();

        for site in &self.sites {
            *counts.entry(site.kind_name.as_str()).or_insert(0) += 1;
        }

        counts
            .into_iter()
            .map(|(el, count)| {
                if count == 1 {
                    el.to_string()
                } else {
                    format!("{}{}", el, count)
                }
            })
            .collect::<Vec<_>>()
            .join("")
    }

    pub fn cell_volume(&self) -> f64 {
        self.cell.volume().abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lattice_from_parameters_cubic() {
        let lattice = Lattice::from_parameters(5.0, 5.0, 5.0, 90.0, 90.0, 90.0);
        let (a, b, c, alpha, beta, gamma) = lattice.parameters();

        assert!((a - 5.0).abs() < 1e-6);
        assert!((b - 5.0).abs() < 1e-6);
        assert!((c - 5.0).abs() < 1e-6);
        assert!((alpha - 90.0).abs() < 1e-6);
        assert!((beta - 90.0).abs() < 1e-6);
        assert!((gamma - 90.0).abs() < 1e-6);
        assert!((lattice.volume().abs() - 125.0).abs() < 1e-6);
    }

    #[test]
    fn test_lattice_hexagonal() {
        let lattice = Lattice::from_parameters(3.0, 3.0, 5.0, 90.0, 90.0, 120.0);
        let (a, _, c, _, _, gamma) = lattice.parameters();

        assert!((a - 3.0).abs() < 0.01);
        assert!((c - 5.0).abs() < 0.01);
        assert!((gamma - 120.0).abs() < 0.01);
    }

    #[test]
    fn test_to_cartesian() {
        let lattice = Lattice::from_vectors([[4.0, 0.0, 0.0], [0.0, 4.0, 0.0], [0.0, 0.0, 2.0]]);
        let cart = lattice.to_cartesian([0.5, 0.25, 0.5]);
        assert_eq!(cart, [2.0, 1.0, 1.0]);
    }

    #[test]
    fn test_append_atom_reuses_kind() {
        let mut s = StructureData::new(Lattice::from_parameters(4.0, 4.0, 4.0, 90.0, 90.0, 90.0));
        s.append_atom("Na", [0.0, 0.0, 0.0]);
        s.append_atom("Cl", [2.0, 0.0, 0.0]);
        s.append_atom("Na", [2.0, 2.0, 0.0]);

        assert_eq!(s.kinds.len(), 2);
        assert_eq!(s.sites.len(), 3);
        assert_eq!(s.first_symbol(), Some("Na"));
        assert_eq!(s.formula(), "ClNa2");
    }
}
