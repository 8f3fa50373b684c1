//! # 位点映射
//!
//! 物种标签 → 笛卡尔坐标列表的有序关联。迭代顺序即插入顺序；
//! 结构记录构造时按规范物种顺序重新排列。
//!
//! ## 依赖关系
//! - 被 `models/record.rs`, `parsers/smact_poscar.rs` 使用
//! - 使用 `models/structure.rs`, `models/species.rs`
//! - 使用 `indexmap`

use crate::error::{Result, SmactError};
use crate::models::species::fix_implicit_unit_charge;
use crate::models::structure::Crystal;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// 有序位点映射
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteMap {
    sites: IndexMap<String, Vec<[f64; 3]>>,
}

impl SiteMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个位点，标签不存在时新建
    pub fn push(&mut self, label: impl Into<String>, coord: [f64; 3]) {
        self.sites.entry(label.into()).or_default().push(coord);
    }

    /// 设置某标签的全部坐标（覆盖原有值，保持原有位置）
    pub fn insert(&mut self, label: impl Into<String>, coords: Vec<[f64; 3]>) {
        self.sites.insert(label.into(), coords);
    }

    pub fn get(&self, label: &str) -> Option<&[[f64; 3]]> {
        self.sites.get(label).map(|v| v.as_slice())
    }

    pub fn contains(&self, label: &str) -> bool {
        self.sites.contains_key(label)
    }

    /// 标签数量
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.sites.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[[f64; 3]])> {
        self.sites.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// 各标签的位点数，按迭代顺序
    pub fn site_counts(&self) -> Vec<usize> {
        self.sites.values().map(|v| v.len()).collect()
    }

    pub fn total_sites(&self) -> usize {
        self.sites.values().map(|v| v.len()).sum()
    }

    /// 按给定标签顺序重新排列
    ///
    /// 缺失的标签返回校验错误；不在 `labels` 中的条目被丢弃。
    pub fn reorder<S: AsRef<str>>(mut self, labels: &[S]) -> Result<SiteMap> {
        let mut ordered = IndexMap::with_capacity(labels.len());
        for label in labels {
            let label = label.as_ref();
            let coords = self.sites.shift_remove(label).ok_or_else(|| {
                SmactError::Validation(format!(
                    "Species '{}' has no entry in the site map (available: {}).",
                    label,
                    self.sites.keys().cloned().collect::<Vec<_>>().join(", ")
                ))
            })?;
            ordered.insert(label.to_string(), coords);
        }
        Ok(SiteMap { sites: ordered })
    }

    /// 按物种字符串对外部结构的原子分组（笛卡尔坐标）
    pub fn from_crystal(crystal: &Crystal) -> SiteMap {
        let mut map = SiteMap::new();
        for (atom, cart) in crystal.atoms.iter().zip(crystal.cartesian_positions()) {
            map.push(fix_implicit_unit_charge(&atom.species), cart);
        }
        map
    }
}

impl FromIterator<(String, [f64; 3])> for SiteMap {
    fn from_iter<I: IntoIterator<Item = (String, [f64; 3])>>(iter: I) -> Self {
        let mut map = SiteMap::new();
        for (label, coord) in iter {
            map.push(label, coord);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::structure::{Atom, Lattice};

    #[test]
    fn test_push_groups_by_label() {
        let mut map = SiteMap::new();
        map.push("O2-", [0.0, 0.0, 0.5]);
        map.push("Ti4+", [0.0, 0.0, 0.0]);
        map.push("O2-", [0.5, 0.0, 0.0]);

        assert_eq!(map.len(), 2);
        assert_eq!(map.site_counts(), vec![2, 1]);
        assert_eq!(map.total_sites(), 3);
        assert_eq!(map.get("O2-").unwrap()[1], [0.5, 0.0, 0.0]);
    }

    #[test]
    fn test_reorder_follows_label_order() {
        let mut map = SiteMap::new();
        map.push("Ti4+", [0.0, 0.0, 0.0]);
        map.push("Ca2+", [0.5, 0.5, 0.5]);

        let ordered = map.reorder(&["Ca2+", "Ti4+"]).unwrap();
        assert_eq!(ordered.labels().collect::<Vec<_>>(), vec!["Ca2+", "Ti4+"]);
    }

    #[test]
    fn test_reorder_missing_label_fails() {
        let mut map = SiteMap::new();
        map.push("Ti4+", [0.0, 0.0, 0.0]);

        let err = map.reorder(&["Ca2+", "Ti4+"]).unwrap_err();
        assert!(matches!(err, SmactError::Validation(_)));
    }

    #[test]
    fn test_from_crystal_fixes_unit_charge() {
        let lattice = Lattice::from_vectors([[2.0, 0.0, 0.0], [0.0, 2.0, 0.0], [0.0, 0.0, 2.0]]);
        let crystal = Crystal::new(
            "NaCl",
            lattice,
            vec![
                Atom::new("Na+", [0.0, 0.0, 0.0]),
                Atom::new("Cl-", [0.5, 0.5, 0.5]),
            ],
        );

        let map = SiteMap::from_crystal(&crystal);
        assert_eq!(map.labels().collect::<Vec<_>>(), vec!["Na1+", "Cl1-"]);
        assert_eq!(map.get("Cl1-").unwrap()[0], [1.0, 1.0, 1.0]);
    }
}
