//! # 按空间群构建晶体
//!
//! 给定不对称单元（元素 + 分数坐标）、空间群号与晶格参数，
//! 通过对称操作与格心平移展开得到整个惯用胞，可选约化为原胞。
//!
//! 目前支持立方空间群 221 (Pm-3m)、225 (Fm-3m)、227 (Fd-3m, origin choice 1)、
//! 229 (Im-3m)。
//!
//! ## 依赖关系
//! - 被 `store/default_structure.rs` 使用
//! - 使用 `models/structure.rs`

use crate::error::{CwfError, Result};
use crate::models::structure::{Lattice, StructureData};

/// 坐标去重容差（分数坐标）
const SYMPREC: f64 = 1e-5;

/// 格心类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Centering {
    Primitive,
    FaceCentered,
    BodyCentered,
}

impl Centering {
    fn translations(&self) -> Vec<[f64; 3]> {
        match self {
            Centering::Primitive => vec![[0.0; 3]],
            Centering::FaceCentered => vec![
                [0.0, 0.0, 0.0],
                [0.0, 0.5, 0.5],
                [0.5, 0.0, 0.5],
                [0.5, 0.5, 0.0],
            ],
            Centering::BodyCentered => vec![[0.0, 0.0, 0.0], [0.5, 0.5, 0.5]],
        }
    }

    /// 原胞基矢在惯用胞分数坐标中的表示（行向量）
    fn primitive_transform(&self) -> [[f64; 3]; 3] {
        match self {
            Centering::Primitive => [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            Centering::FaceCentered => [[0.0, 0.5, 0.5], [0.5, 0.0, 0.5], [0.5, 0.5, 0.0]],
            Centering::BodyCentered => [[-0.5, 0.5, 0.5], [0.5, -0.5, 0.5], [0.5, 0.5, -0.5]],
        }
    }
}

/// 对称操作 (R | t)
#[derive(Debug, Clone)]
struct SymOp {
    rotation: [[f64; 3]; 3],
    translation: [f64; 3],
}

impl SymOp {
    fn apply(&self, x: [f64; 3]) -> [f64; 3] {
        let mut out = self.translation;
        for (i, row) in self.rotation.iter().enumerate() {
            out[i] += row[0] * x[0] + row[1] * x[1] + row[2] * x[2];
        }
        out
    }
}

#[derive(Debug)]
struct SpaceGroup {
    centering: Centering,
    ops: Vec<SymOp>,
}

impl SpaceGroup {
    fn from_number(number: u16) -> Result<Self> {
        let group = match number {
            221 => SpaceGroup {
                centering: Centering::Primitive,
                ops: cubic_point_ops(false, [0.0; 3]),
            },
            225 => SpaceGroup {
                centering: Centering::FaceCentered,
                ops: cubic_point_ops(false, [0.0; 3]),
            },
            227 => SpaceGroup {
                centering: Centering::FaceCentered,
                ops: cubic_point_ops(true, [0.25; 3]),
            },
            229 => SpaceGroup {
                centering: Centering::BodyCentered,
                ops: cubic_point_ops(false, [0.0; 3]),
            },
            other => {
                return Err(CwfError::GeometryConstruction(format!(
                    "space group {} is not supported (supported: 221, 225, 227, 229)",
                    other
                )))
            }
        };
        Ok(group)
    }
}

/// 生成 m-3m 的 48 个点操作。
///
/// `diamond_glide` 为真时按 Fd-3m origin choice 1 生成：
/// -43m 子群不带平移，其余操作写作 (-R | t)，R 属于 -43m。
fn cubic_point_ops(diamond_glide: bool, glide: [f64; 3]) -> Vec<SymOp> {
    const PERMUTATIONS: [[usize; 3]; 6] = [
        [0, 1, 2],
        [1, 2, 0],
        [2, 0, 1],
        [1, 0, 2],
        [0, 2, 1],
        [2, 1, 0],
    ];

    let mut td_ops = Vec::new();
    let mut other_ops = Vec::new();

    for perm in PERMUTATIONS {
        for signs in 0..8u8 {
            let s = [
                if signs & 1 == 0 { 1.0 } else { -1.0 },
                if signs & 2 == 0 { 1.0 } else { -1.0 },
                if signs & 4 == 0 { 1.0 } else { -1.0 },
            ];
            let mut rotation = [[0.0; 3]; 3];
            for i in 0..3 {
                rotation[i][perm[i]] = s[i];
            }
            let even_minus = signs.count_ones() % 2 == 0;
            let op = SymOp {
                rotation,
                translation: [0.0; 3],
            };
            // -43m = 所有置换 × 偶数个负号
            if even_minus {
                td_ops.push(op);
            } else {
                other_ops.push(op);
            }
        }
    }

    if !diamond_glide {
        td_ops.extend(other_ops);
        return td_ops;
    }

    let coset: Vec<SymOp> = td_ops
        .iter()
        .map(|op| {
            let mut rotation = op.rotation;
            for row in rotation.iter_mut() {
                for v in row.iter_mut() {
                    *v = -*v;
                }
            }
            SymOp {
                rotation,
                translation: glide,
            }
        })
        .collect();
    td_ops.extend(coset);
    td_ops
}

fn wrap(x: [f64; 3]) -> [f64; 3] {
    let mut out = [0.0; 3];
    for i in 0..3 {
        let mut v = x[i] - x[i].floor();
        if (1.0 - v).abs() < SYMPREC {
            v = 0.0;
        }
        out[i] = v;
    }
    out
}

fn same_site(a: &[f64; 3], b: &[f64; 3]) -> bool {
    (0..3).all(|i| {
        let d = a[i] - b[i];
        (d - d.round()).abs() < SYMPREC
    })
}

fn invert(m: &[[f64; 3]; 3]) -> Result<[[f64; 3]; 3]> {
    let det = m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0]);
    if det.abs() < 1e-12 {
        return Err(CwfError::GeometryConstruction(
            "singular cell transformation".to_string(),
        ));
    }

    let mut inv = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            let (r0, r1) = ((j + 1) % 3, (j + 2) % 3);
            let (c0, c1) = ((i + 1) % 3, (i + 2) % 3);
            inv[i][j] = (m[r0][c0] * m[r1][c1] - m[r0][c1] * m[r1][c0]) / det;
        }
    }
    Ok(inv)
}

fn row_times(x: [f64; 3], m: &[[f64; 3]; 3]) -> [f64; 3] {
    let mut out = [0.0; 3];
    for (i, row) in m.iter().enumerate() {
        for k in 0..3 {
            out[k] += x[i] * row[k];
        }
    }
    out
}

fn validate_cellpar(cellpar: &[f64; 6]) -> Result<()> {
    let [a, b, c, alpha, beta, gamma] = *cellpar;
    if [a, b, c].iter().any(|l| !l.is_finite() || *l <= 0.0) {
        return Err(CwfError::GeometryConstruction(format!(
            "cell lengths must be positive, got ({}, {}, {})",
            a, b, c
        )));
    }
    if [alpha, beta, gamma]
        .iter()
        .any(|ang| !ang.is_finite() || *ang <= 0.0 || *ang >= 180.0)
    {
        return Err(CwfError::GeometryConstruction(format!(
            "cell angles must lie in (0, 180) degrees, got ({}, {}, {})",
            alpha, beta, gamma
        )));
    }
    Ok(())
}

/// 由不对称单元构建晶体。
///
/// `basis` 为 (元素符号, 惯用胞分数坐标)；`cellpar` 为
/// (a, b, c, alpha, beta, gamma)，长度单位 Å、角度单位度。
pub fn crystal(
    basis: &[(&str, [f64; 3])],
    spacegroup: u16,
    cellpar: [f64; 6],
    primitive_cell: bool,
) -> Result<StructureData> {
    validate_cellpar(&cellpar)?;
    let group = SpaceGroup::from_number(spacegroup)?;

    let [a, b, c, alpha, beta, gamma] = cellpar;
    let is_cubic = (a - b).abs() < 1e-6
        && (a - c).abs() < 1e-6
        && [alpha, beta, gamma].iter().all(|ang| (ang - 90.0).abs() < 1e-6);
    if !is_cubic {
        return Err(CwfError::GeometryConstruction(format!(
            "space group {} requires a cubic cell, got {:?}",
            spacegroup, cellpar
        )));
    }

    let conventional = Lattice::from_parameters(a, b, c, alpha, beta, gamma);
    let centering = group.centering.translations();

    // 惯用胞内的全部等价位置
    let mut sites: Vec<(&str, [f64; 3])> = Vec::new();
    for &(symbol, position) in basis {
        for op in &group.ops {
            let image = op.apply(position);
            for t in &centering {
                let candidate = wrap([image[0] + t[0], image[1] + t[1], image[2] + t[2]]);
                if let Some((other, _)) = sites.iter().find(|(_, p)| same_site(p, &candidate)) {
                    if *other != symbol {
                        return Err(CwfError::GeometryConstruction(format!(
                            "sites of {} and {} coincide at {:?}",
                            other, symbol, candidate
                        )));
                    }
                    continue;
                }
                sites.push((symbol, candidate));
            }
        }
    }

    if !primitive_cell || group.centering == Centering::Primitive {
        let mut structure = StructureData::new(conventional.clone());
        for (symbol, frac) in sites {
            structure.append_atom(symbol, conventional.to_cartesian(frac));
        }
        return Ok(structure);
    }

    let transform = group.centering.primitive_transform();
    let to_primitive = invert(&transform)?;
    let mut prim_rows = [[0.0; 3]; 3];
    for (i, row) in transform.iter().enumerate() {
        prim_rows[i] = row_times(*row, &conventional.matrix);
    }
    let prim_lattice = Lattice::from_vectors(prim_rows);

    let mut reduced: Vec<(&str, [f64; 3])> = Vec::new();
    for (symbol, frac) in sites {
        let p = wrap(row_times(frac, &to_primitive));
        if !reduced.iter().any(|(_, q)| same_site(q, &p)) {
            reduced.push((symbol, p));
        }
    }

    let mut structure = StructureData::new(prim_lattice.clone());
    for (symbol, frac) in reduced {
        structure.append_atom(symbol, prim_lattice.to_cartesian(frac));
    }
    Ok(structure)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALAT: f64 = 5.43;

    fn close(a: [f64; 3], b: [f64; 3]) -> bool {
        (0..3).all(|i| (a[i] - b[i]).abs() < 1e-8)
    }

    #[test]
    fn test_cubic_ops_count() {
        assert_eq!(cubic_point_ops(false, [0.0; 3]).len(), 48);
        assert_eq!(cubic_point_ops(true, [0.25; 3]).len(), 48);
    }

    #[test]
    fn test_diamond_silicon_primitive() {
        let s = crystal(
            &[("Si", [0.0, 0.0, 0.0])],
            227,
            [ALAT, ALAT, ALAT, 90.0, 90.0, 90.0],
            true,
        )
        .unwrap();

        assert_eq!(s.sites.len(), 2);
        assert_eq!(s.kinds.len(), 1);
        assert_eq!(s.first_symbol(), Some("Si"));
        assert!(close(s.sites[0].position, [0.0, 0.0, 0.0]));
        assert!(close(s.sites[1].position, [ALAT / 4.0; 3]));
        assert!((s.cell_volume() - ALAT.powi(3) / 4.0).abs() < 1e-8);
        assert!(close(s.cell.matrix[0], [0.0, ALAT / 2.0, ALAT / 2.0]));
    }

    #[test]
    fn test_diamond_silicon_conventional() {
        let s = crystal(
            &[("Si", [0.0, 0.0, 0.0])],
            227,
            [ALAT, ALAT, ALAT, 90.0, 90.0, 90.0],
            false,
        )
        .unwrap();
        assert_eq!(s.sites.len(), 8);
        assert_eq!(s.formula(), "Si8");
    }

    #[test]
    fn test_rocksalt_and_bcc() {
        let nacl = crystal(
            &[("Na", [0.0, 0.0, 0.0]), ("Cl", [0.5, 0.5, 0.5])],
            225,
            [5.64, 5.64, 5.64, 90.0, 90.0, 90.0],
            false,
        )
        .unwrap();
        assert_eq!(nacl.sites.len(), 8);
        assert_eq!(nacl.formula(), "Cl4Na4");

        let fe = crystal(
            &[("Fe", [0.0, 0.0, 0.0])],
            229,
            [2.87, 2.87, 2.87, 90.0, 90.0, 90.0],
            true,
        )
        .unwrap();
        assert_eq!(fe.sites.len(), 1);
        assert!((fe.cell_volume() - 2.87f64.powi(3) / 2.0).abs() < 1e-8);
    }

    #[test]
    fn test_unsupported_space_group() {
        let err = crystal(&[("Si", [0.0; 3])], 194, [3.0, 3.0, 5.0, 90.0, 90.0, 120.0], true)
            .unwrap_err();
        assert!(matches!(err, CwfError::GeometryConstruction(_)));
    }

    #[test]
    fn test_invalid_cell_parameters() {
        for cellpar in [
            [-5.43, 5.43, 5.43, 90.0, 90.0, 90.0],
            [5.43, 5.43, 5.43, 0.0, 90.0, 90.0],
            [5.43, 5.0, 5.43, 90.0, 90.0, 90.0],
        ] {
            let err = crystal(&[("Si", [0.0; 3])], 227, cellpar, true).unwrap_err();
            assert!(matches!(err, CwfError::GeometryConstruction(_)));
        }
    }
}
