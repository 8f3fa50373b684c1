//! # 远程结构库接口
//!
//! 按约化化学式查询候选结构的外部材料数据库边界。
//! 本 crate 不实现网络客户端，只定义查询契约并提供离线的内存目录。
//!
//! ## 依赖关系
//! - 被 `models/record.rs` 的 `from_repository` 使用
//! - 使用 `models/species.rs`, `models/structure.rs`

use crate::error::Result;
use crate::models::species::{element_stoichiometries, SpeciesEntry};
use crate::models::structure::Crystal;

/// 远程结构库客户端
pub trait StructureRepository {
    /// 以约化化学式查询，返回零个或多个候选结构
    fn query(&self, formula: &str, api_key: &str) -> Result<Vec<Crystal>>;
}

/// 约化化学式，去掉氧化态，每个元素都写出计量数（如 `Fe3O4`, `Na1Cl1`）
pub fn reduced_formula(species: &[SpeciesEntry]) -> String {
    element_stoichiometries(species)
        .iter()
        .map(|(ele, stoic)| format!("{}{}", ele, stoic))
        .collect()
}

/// 内存结构目录
///
/// 以结构自身的元素计数约化后的化学式匹配查询，忽略 API key。
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    entries: Vec<(String, Crystal)>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, crystal: Crystal) {
        self.entries.push((crystal_reduced_formula(&crystal), crystal));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl StructureRepository for InMemoryRepository {
    fn query(&self, formula: &str, _api_key: &str) -> Result<Vec<Crystal>> {
        Ok(self
            .entries
            .iter()
            .filter(|(f, _)| f == formula)
            .map(|(_, c)| c.clone())
            .collect())
    }
}

/// 结构的约化化学式（元素按字母序，计数除以最大公约数）
fn crystal_reduced_formula(crystal: &Crystal) -> String {
    use std::collections::BTreeMap;

    let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
    for atom in &crystal.atoms {
        *counts.entry(atom.element()).or_insert(0) += 1;
    }

    let divisor = counts.values().copied().fold(0, gcd).max(1);
    counts
        .into_iter()
        .map(|(ele, n)| format!("{}{}", ele, n / divisor))
        .collect()
}

fn gcd(a: u32, b: u32) -> u32 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::structure::{Atom, Lattice};

    #[test]
    fn test_reduced_formula_strips_oxidation() {
        let species = vec![
            SpeciesEntry::new("Fe", 3, 2),
            SpeciesEntry::new("Fe", 2, 1),
            SpeciesEntry::new("O", -2, 4),
        ];
        assert_eq!(reduced_formula(&species), "Fe3O4");
    }

    #[test]
    fn test_in_memory_repository_matches_reduced_formula() {
        let lattice = Lattice::from_vectors([[4.0, 0.0, 0.0], [0.0, 4.0, 0.0], [0.0, 0.0, 4.0]]);
        let atoms = vec![
            Atom::new("Na", [0.0, 0.0, 0.0]),
            Atom::new("Na", [0.5, 0.5, 0.0]),
            Atom::new("Cl", [0.5, 0.0, 0.0]),
            Atom::new("Cl", [0.0, 0.5, 0.0]),
        ];
        let mut repo = InMemoryRepository::new();
        repo.insert(Crystal::new("NaCl", lattice, atoms));

        assert_eq!(repo.query("Cl1Na1", "key").unwrap().len(), 1);
        assert!(repo.query("Na1Cl1", "key").unwrap().is_empty());
    }
}
