//! # 空间群对称展开
//!
//! 由基矢点、空间群编号与晶胞参数生成周期结构。
//! 只内置原型构建所需的两个空间群：
//! - 221 (Pm-3m)，48 个对称操作
//! - 186 (P6₃mc)，12 个对称操作（六方设定）
//!
//! ## 依赖关系
//! - 被 `builder.rs` 使用
//! - 使用 `models/structure.rs`

use crate::error::{Result, SmactError};
use crate::models::structure::{Atom, Crystal, Lattice};

/// 判定两个分数坐标等价的容差
const SYMPREC: f64 = 1e-5;

/// 对称操作 x' = R·x + t（分数坐标）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymOp {
    pub rotation: [[i32; 3]; 3],
    pub translation: [f64; 3],
}

impl SymOp {
    pub fn new(rotation: [[i32; 3]; 3], translation: [f64; 3]) -> Self {
        SymOp {
            rotation,
            translation,
        }
    }

    pub fn apply(&self, p: [f64; 3]) -> [f64; 3] {
        let r = &self.rotation;
        let mut out = [0.0; 3];
        for (i, o) in out.iter_mut().enumerate() {
            *o = r[i][0] as f64 * p[0]
                + r[i][1] as f64 * p[1]
                + r[i][2] as f64 * p[2]
                + self.translation[i];
        }
        out
    }
}

/// 空间群
#[derive(Debug, Clone)]
pub struct SpaceGroup {
    pub number: u32,
    pub symbol: &'static str,
    pub operations: Vec<SymOp>,
}

impl SpaceGroup {
    pub fn from_number(number: u32) -> Result<Self> {
        match number {
            221 => Ok(SpaceGroup {
                number,
                symbol: "Pm-3m",
                operations: cubic_holohedry(),
            }),
            186 => Ok(SpaceGroup {
                number,
                symbol: "P6_3mc",
                operations: p63mc(),
            }),
            other => Err(SmactError::UnsupportedSpaceGroup(other)),
        }
    }

    /// 展开基矢点的全部对称等价位置
    ///
    /// 返回 (位置, 所属基矢点下标)，按基矢点顺序、对称操作顺序排列，去重。
    pub fn equivalent_sites(&self, basis: &[[f64; 3]]) -> (Vec<[f64; 3]>, Vec<usize>) {
        let mut sites: Vec<[f64; 3]> = Vec::new();
        let mut kinds = Vec::new();

        for (kind, &point) in basis.iter().enumerate() {
            for op in &self.operations {
                let candidate = wrap(op.apply(point));
                if !sites.iter().any(|s| same_site(s, &candidate)) {
                    sites.push(candidate);
                    kinds.push(kind);
                }
            }
        }

        (sites, kinds)
    }
}

/// 晶体对称展开原语
pub trait SymmetryExpander {
    /// 生成晶胞并按 `size` 扩胞，原子使用 `species` 中对应基矢点的元素
    fn crystal(
        &self,
        species: &[&str],
        basis: &[[f64; 3]],
        spacegroup: u32,
        cell_par: [f64; 6],
        size: [usize; 3],
    ) -> Result<Crystal>;
}

/// 基于内置空间群表的展开器
#[derive(Debug, Clone, Copy, Default)]
pub struct SpaceGroupExpander;

impl SymmetryExpander for SpaceGroupExpander {
    fn crystal(
        &self,
        species: &[&str],
        basis: &[[f64; 3]],
        spacegroup: u32,
        cell_par: [f64; 6],
        size: [usize; 3],
    ) -> Result<Crystal> {
        if species.len() != basis.len() {
            return Err(SmactError::Alignment {
                context: "species vs. basis points".to_string(),
                expected: basis.len(),
                found: species.len(),
            });
        }
        if size.contains(&0) {
            return Err(SmactError::InvalidArgument(format!(
                "Repetitions must be positive, got {:?}",
                size
            )));
        }

        let group = SpaceGroup::from_number(spacegroup)?;
        let (unit_sites, kinds) = group.equivalent_sites(basis);

        let cell = Lattice::from_cell_par(cell_par);
        let matrix = [0, 1, 2].map(|i| cell.matrix[i].map(|x| x * size[i] as f64));

        let mut atoms = Vec::with_capacity(unit_sites.len() * size.iter().product::<usize>());
        for m0 in 0..size[0] {
            for m1 in 0..size[1] {
                for m2 in 0..size[2] {
                    let shift = [m0 as f64, m1 as f64, m2 as f64];
                    for (pos, &kind) in unit_sites.iter().zip(&kinds) {
                        let scaled = [0, 1, 2].map(|i| (pos[i] + shift[i]) / size[i] as f64);
                        atoms.push(Atom::new(species[kind], scaled));
                    }
                }
            }
        }

        log::debug!(
            "Expanded {} basis point(s) in {} to {} site(s)",
            basis.len(),
            group.symbol,
            atoms.len()
        );

        Ok(Crystal::new(species.concat(), Lattice::from_vectors(matrix), atoms))
    }
}

/// 坐标归约到 [0, 1)
fn wrap(p: [f64; 3]) -> [f64; 3] {
    p.map(|x| {
        let w = x.rem_euclid(1.0);
        if w == 0.0 || w > 1.0 - SYMPREC {
            0.0
        } else {
            w
        }
    })
}

/// 考虑周期性的位置比较
fn same_site(a: &[f64; 3], b: &[f64; 3]) -> bool {
    a.iter().zip(b).all(|(x, y)| {
        let d = (x - y).abs();
        d.min(1.0 - d) < SYMPREC
    })
}

/// m-3m 点群：全部带符号的坐标置换
fn cubic_holohedry() -> Vec<SymOp> {
    const PERMUTATIONS: [[usize; 3]; 6] =
        [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];

    let mut ops = Vec::with_capacity(48);
    for perm in PERMUTATIONS {
        for signs in 0..8u8 {
            let mut rotation = [[0; 3]; 3];
            for (i, row) in rotation.iter_mut().enumerate() {
                row[perm[i]] = if signs & (1 << i) == 0 { 1 } else { -1 };
            }
            ops.push(SymOp::new(rotation, [0.0; 3]));
        }
    }
    ops
}

/// P6₃mc (No. 186) 的 12 个对称操作
fn p63mc() -> Vec<SymOp> {
    const HALF_C: [f64; 3] = [0.0, 0.0, 0.5];
    const NONE: [f64; 3] = [0.0, 0.0, 0.0];

    vec![
        SymOp::new([[1, 0, 0], [0, 1, 0], [0, 0, 1]], NONE),
        SymOp::new([[0, -1, 0], [1, -1, 0], [0, 0, 1]], NONE),
        SymOp::new([[-1, 1, 0], [-1, 0, 0], [0, 0, 1]], NONE),
        SymOp::new([[-1, 0, 0], [0, -1, 0], [0, 0, 1]], HALF_C),
        SymOp::new([[0, 1, 0], [-1, 1, 0], [0, 0, 1]], HALF_C),
        SymOp::new([[1, -1, 0], [1, 0, 0], [0, 0, 1]], HALF_C),
        SymOp::new([[0, -1, 0], [-1, 0, 0], [0, 0, 1]], NONE),
        SymOp::new([[-1, 1, 0], [0, 1, 0], [0, 0, 1]], NONE),
        SymOp::new([[1, 0, 0], [1, -1, 0], [0, 0, 1]], NONE),
        SymOp::new([[0, 1, 0], [1, 0, 0], [0, 0, 1]], HALF_C),
        SymOp::new([[1, -1, 0], [0, -1, 0], [0, 0, 1]], HALF_C),
        SymOp::new([[-1, 0, 0], [-1, 1, 0], [0, 0, 1]], HALF_C),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: [f64; 3], b: [f64; 3]) -> bool {
        same_site(&a, &b)
    }

    #[test]
    fn test_operation_counts() {
        assert_eq!(SpaceGroup::from_number(221).unwrap().operations.len(), 48);
        assert_eq!(SpaceGroup::from_number(186).unwrap().operations.len(), 12);
        assert!(matches!(
            SpaceGroup::from_number(225),
            Err(SmactError::UnsupportedSpaceGroup(225))
        ));
    }

    #[test]
    fn test_pm3m_face_centres() {
        let group = SpaceGroup::from_number(221).unwrap();
        let (sites, kinds) = group.equivalent_sites(&[[0.0, 0.0, 0.0], [0.5, 0.5, 0.5], [0.5, 0.5, 0.0]]);

        assert_eq!(sites.len(), 5);
        assert_eq!(kinds, vec![0, 1, 2, 2, 2]);
        assert!(close(sites[0], [0.0, 0.0, 0.0]));
        assert!(close(sites[1], [0.5, 0.5, 0.5]));
        assert!(sites[2..].iter().any(|s| close(*s, [0.0, 0.5, 0.5])));
        assert!(sites[2..].iter().any(|s| close(*s, [0.5, 0.0, 0.5])));
        assert!(sites[2..].iter().any(|s| close(*s, [0.5, 0.5, 0.0])));
    }

    #[test]
    fn test_p63mc_2b_orbit() {
        let group = SpaceGroup::from_number(186).unwrap();
        let (sites, kinds) = group.equivalent_sites(&[[2.0 / 3.0, 1.0 / 3.0, 0.0]]);

        assert_eq!(sites.len(), 2);
        assert_eq!(kinds, vec![0, 0]);
        assert!(close(sites[0], [2.0 / 3.0, 1.0 / 3.0, 0.0]));
        assert!(close(sites[1], [1.0 / 3.0, 2.0 / 3.0, 0.5]));
    }

    #[test]
    fn test_expander_rejects_species_mismatch() {
        let err = SpaceGroupExpander
            .crystal(&["Ba", "Ti"], &[[0.0; 3], [0.5; 3], [0.5, 0.5, 0.0]], 221, [4.0, 4.0, 4.0, 90.0, 90.0, 90.0], [1, 1, 1])
            .unwrap_err();
        assert!(matches!(err, SmactError::Alignment { expected: 3, found: 2, .. }));
    }

    #[test]
    fn test_expander_repetitions() {
        let crystal = SpaceGroupExpander
            .crystal(&["Po"], &[[0.0; 3]], 221, [3.0, 3.0, 3.0, 90.0, 90.0, 90.0], [2, 1, 1])
            .unwrap();

        assert_eq!(crystal.atoms.len(), 2);
        assert!(close(crystal.atoms[0].position, [0.0, 0.0, 0.0]));
        assert!(close(crystal.atoms[1].position, [0.5, 0.0, 0.0]));
        assert!((crystal.lattice.matrix[0][0] - 6.0).abs() < 1e-9);
        assert!((crystal.lattice.matrix[1][1] - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_expander_rejects_zero_size() {
        assert!(SpaceGroupExpander
            .crystal(&["Po"], &[[0.0; 3]], 221, [3.0, 3.0, 3.0, 90.0, 90.0, 90.0], [0, 1, 1])
            .is_err());
    }
}
