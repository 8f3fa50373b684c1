//! # 原型结构构建器
//!
//! 由元素符号列表构建理想化的原型晶格：
//! - 立方钙钛矿 (空间群 221)
//! - 纤锌矿 (空间群 186)
//!
//! 对称展开交给 `SymmetryExpander`，本模块只负责为生成的位点
//! 按位置配对固定的氧化态，并包装为 `SiteLattice`。
//!
//! ## 氧化态配对规则
//! 按一个晶胞内的生成顺序逐一配对；扩胞后的镜像位点继承其母位点的氧化态。
//! 晶胞位点数多于氧化态数时返回 `Alignment` 错误，多余的氧化态不使用。
//!
//! ## 依赖关系
//! - 使用 `symmetry.rs` 展开晶胞
//! - 使用 `models/lattice.rs`, `models/structure.rs`

use crate::error::{Result, SmactError};
use crate::models::lattice::{Site, SiteLattice};
use crate::models::structure::Crystal;
use crate::symmetry::{SpaceGroupExpander, SymmetryExpander};

/// 钙钛矿默认晶胞参数
pub const PEROVSKITE_CELL: [f64; 6] = [6.0, 6.0, 6.0, 90.0, 90.0, 90.0];

/// 纤锌矿默认晶胞参数（仅作记录，展开时总是使用 `WURTZITE_FIXED_CELL`）
pub const WURTZITE_CELL: [f64; 6] = [2.0, 2.0, 6.0, 90.0, 90.0, 120.0];

/// 纤锌矿展开实际使用的晶胞参数
pub const WURTZITE_FIXED_CELL: [f64; 6] = [3.0, 3.0, 6.0, 90.0, 90.0, 120.0];

const PEROVSKITE_BASIS: [[f64; 3]; 3] = [[0.0, 0.0, 0.0], [0.5, 0.5, 0.5], [0.5, 0.5, 0.0]];
const PEROVSKITE_OXIDATION: [i32; 5] = [2, 4, -2, -2, -2];

const WURTZITE_BASIS: [[f64; 3]; 2] = [[2.0 / 3.0, 1.0 / 3.0, 0.0], [2.0 / 3.0, 1.0 / 3.0, 5.0 / 8.0]];
const WURTZITE_OXIDATION: [i32; 8] = [1, 2, 3, 4, -1, -2, -3, -4];

/// 原型几何参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrototypeParams {
    /// a, b, c (Å), alpha, beta, gamma (度)
    pub cell_par: [f64; 6],
    /// 沿 a, b, c 的扩胞倍数
    pub repetitions: [usize; 3],
}

impl PrototypeParams {
    pub fn new(cell_par: [f64; 6]) -> Self {
        PrototypeParams {
            cell_par,
            repetitions: [1, 1, 1],
        }
    }

    pub fn with_repetitions(mut self, repetitions: [usize; 3]) -> Self {
        self.repetitions = repetitions;
        self
    }

    pub fn wurtzite() -> Self {
        Self::new(WURTZITE_CELL)
    }
}

impl Default for PrototypeParams {
    fn default() -> Self {
        Self::new(PEROVSKITE_CELL)
    }
}

/// 构建立方钙钛矿晶胞
///
/// `species` 依次为 A 位、B 位、X 位元素，例如 `["Ba", "Ti", "O"]`。
pub fn cubic_perovskite(species: &[&str], params: &PrototypeParams) -> Result<(SiteLattice, Crystal)> {
    cubic_perovskite_with(&SpaceGroupExpander, species, params)
}

pub fn cubic_perovskite_with(
    expander: &dyn SymmetryExpander,
    species: &[&str],
    params: &PrototypeParams,
) -> Result<(SiteLattice, Crystal)> {
    let system = expander.crystal(
        species,
        &PEROVSKITE_BASIS,
        221,
        params.cell_par,
        params.repetitions,
    )?;

    let lattice = assign_oxidation_states(&system, params.repetitions, &PEROVSKITE_OXIDATION)?;
    Ok((lattice, system))
}

/// 构建纤锌矿晶胞
///
/// 晶胞参数总是 `[3, 3, 6, 90, 90, 120]`，`params.cell_par` 被忽略。
pub fn wurtzite(species: &[&str], params: &PrototypeParams) -> Result<(SiteLattice, Crystal)> {
    wurtzite_with(&SpaceGroupExpander, species, params)
}

pub fn wurtzite_with(
    expander: &dyn SymmetryExpander,
    species: &[&str],
    params: &PrototypeParams,
) -> Result<(SiteLattice, Crystal)> {
    if params.cell_par != WURTZITE_FIXED_CELL {
        log::debug!(
            "wurtzite ignores cell parameters {:?}, using {:?}",
            params.cell_par,
            WURTZITE_FIXED_CELL
        );
    }

    let system = expander.crystal(
        species,
        &WURTZITE_BASIS,
        186,
        WURTZITE_FIXED_CELL,
        params.repetitions,
    )?;

    let lattice = assign_oxidation_states(&system, params.repetitions, &WURTZITE_OXIDATION)?;
    Ok((lattice, system))
}

/// 为生成的位点逐一配对氧化态
fn assign_oxidation_states(
    system: &Crystal,
    repetitions: [usize; 3],
    states: &[i32],
) -> Result<SiteLattice> {
    let cells: usize = repetitions.iter().product();
    if cells == 0 || system.atoms.len() % cells != 0 {
        return Err(SmactError::Alignment {
            context: "generated sites vs. repetitions".to_string(),
            expected: cells,
            found: system.atoms.len(),
        });
    }

    let per_cell = system.atoms.len() / cells;
    if per_cell > states.len() {
        return Err(SmactError::Alignment {
            context: "unit cell sites vs. oxidation states".to_string(),
            expected: states.len(),
            found: per_cell,
        });
    }

    let sites = system
        .atoms
        .iter()
        .enumerate()
        .map(|(i, atom)| Site::new(atom.position, vec![states[i % per_cell]]))
        .collect();

    Ok(SiteLattice::new(sites))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::structure::{Atom, Lattice};

    #[test]
    fn test_perovskite_five_sites() {
        let (lattice, system) = cubic_perovskite(&["Ba", "Ti", "O"], &PrototypeParams::default()).unwrap();

        assert_eq!(lattice.len(), 5);
        assert_eq!(
            lattice.oxidation_states,
            vec![vec![2], vec![4], vec![-2], vec![-2], vec![-2]]
        );

        let elements: Vec<_> = system.atoms.iter().map(|a| a.species.as_str()).collect();
        assert_eq!(elements, vec!["Ba", "Ti", "O", "O", "O"]);
        assert!((system.lattice.matrix[0][0] - 6.0).abs() < 1e-9);
        assert_eq!(lattice.sites[1].position, [0.5, 0.5, 0.5]);
    }

    #[test]
    fn test_perovskite_repetitions_inherit_states() {
        let params = PrototypeParams::new([4.0, 4.0, 4.0, 90.0, 90.0, 90.0]).with_repetitions([2, 1, 1]);
        let (lattice, system) = cubic_perovskite(&["Sr", "Ti", "O"], &params).unwrap();

        assert_eq!(lattice.len(), 10);
        assert_eq!(system.atoms.len(), 10);
        assert_eq!(lattice.sites[5].oxidation_states, vec![2]);
        assert_eq!(lattice.sites[6].oxidation_states, vec![4]);
        assert!((lattice.sites[5].position[0] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_perovskite_wrong_species_count() {
        let err = cubic_perovskite(&["Ba", "Ti"], &PrototypeParams::default()).unwrap_err();
        assert!(matches!(err, SmactError::Alignment { .. }));
    }

    #[test]
    fn test_wurtzite_overrides_cell() {
        let params = PrototypeParams::new([10.0, 10.0, 10.0, 90.0, 90.0, 90.0]);
        let (lattice, system) = wurtzite(&["Zn", "S"], &params).unwrap();

        assert_eq!(lattice.len(), 4);
        assert_eq!(
            lattice.oxidation_states,
            vec![vec![1], vec![2], vec![3], vec![4]]
        );
        assert!((system.lattice.matrix[0][0] - 3.0).abs() < 1e-9);
        assert!((system.lattice.matrix[2][2] - 6.0).abs() < 1e-9);

        let elements: Vec<_> = system.atoms.iter().map(|a| a.species.as_str()).collect();
        assert_eq!(elements, vec!["Zn", "Zn", "S", "S"]);
    }

    struct OversizedExpander;

    impl SymmetryExpander for OversizedExpander {
        fn crystal(
            &self,
            species: &[&str],
            _basis: &[[f64; 3]],
            _spacegroup: u32,
            cell_par: [f64; 6],
            _size: [usize; 3],
        ) -> Result<Crystal> {
            let atoms = (0..6).map(|i| Atom::new(species[0], [i as f64 / 6.0, 0.0, 0.0])).collect();
            Ok(Crystal::new("x", Lattice::from_cell_par(cell_par), atoms))
        }
    }

    #[test]
    fn test_more_sites_than_states_is_alignment_error() {
        let err = cubic_perovskite_with(&OversizedExpander, &["Ba", "Ti", "O"], &PrototypeParams::default())
            .unwrap_err();
        assert!(matches!(
            err,
            SmactError::Alignment {
                expected: 5,
                found: 6,
                ..
            }
        ));
    }
}
