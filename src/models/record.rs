//! # 规范结构记录
//!
//! 组合有序物种列表、3x3 晶格矩阵、位点映射与晶格参数，
//! 负责规范文本格式、组成键、相等语义及各种构造入口：
//! - 直接构造（校验物种并按规范顺序重排位点）
//! - 外部结构转换（尽力修饰氧化态 + 化学计量推断）
//! - 远程结构库查询
//! - SMACT POSCAR 文本解析
//!
//! ## 依赖关系
//! - 使用 `models/species.rs`, `models/sites.rs`, `models/structure.rs`
//! - 使用 `parsers/smact_poscar.rs` 进行文本编解码
//! - 使用 `oxidation.rs`, `repository.rs` 外部协作接口
//! - 被 `store.rs` 及 CLI 使用

use crate::error::{Result, SmactError};
use crate::models::sites::SiteMap;
use crate::models::species::{
    element_stoichiometries, format_species, infer_stoichiometry, parse_label, sanitise_species,
    SpeciesEntry, SpeciesSpec,
};
use crate::models::structure::{Atom, Crystal, Lattice};
use crate::oxidation::{decorate_best_effort, Decorated, OxidationDecorator};
use crate::parsers::smact_poscar;
use crate::repository::{reduced_formula, StructureRepository};

use indexmap::IndexMap;
use std::fmt;
use std::fs;
use std::path::Path;

const LABEL_TEMPLATE: &str = "{ele}{charge}{sign}";
const COMPOSITION_TEMPLATE: &str = "{ele}_{stoic}_{charge}{sign}";

/// 规范结构记录
///
/// 两条记录相等当且仅当物种列表、晶格矩阵（逐元素）、晶格参数
/// 与位点映射（含每个物种内的坐标顺序）全部相等。
#[derive(Debug, Clone, PartialEq)]
pub struct StructureRecord {
    species: Vec<SpeciesEntry>,
    lattice_mat: [[f64; 3]; 3],
    sites: SiteMap,
    lattice_param: f64,
}

impl StructureRecord {
    /// 校验物种并构造记录
    pub fn new(
        species: &[SpeciesSpec],
        lattice_mat: [[f64; 3]; 3],
        sites: SiteMap,
        lattice_param: f64,
    ) -> Result<Self> {
        let species = sanitise_species(species)?;
        Self::from_sanitised(species, lattice_mat, sites, lattice_param)
    }

    /// 使用已规范化的物种构造记录，仍会按物种顺序重排位点
    pub fn from_sanitised(
        species: Vec<SpeciesEntry>,
        lattice_mat: [[f64; 3]; 3],
        sites: SiteMap,
        lattice_param: f64,
    ) -> Result<Self> {
        if species.is_empty() {
            return Err(SmactError::Validation("`species` cannot be empty.".to_string()));
        }

        let labels: Vec<String> = species.iter().map(SpeciesEntry::label).collect();
        let sites = sites.reorder(&labels)?;
        check_occupancy(&species, &sites)?;

        Ok(StructureRecord {
            species,
            lattice_mat,
            sites,
            lattice_param,
        })
    }

    /// 从外部结构构造
    ///
    /// 给定修饰器时先尽力修饰氧化态；失败则以原结构继续，警告随结果返回。
    /// 化学计量由各物种的位点数推断，晶格参数固定为 1.0。
    pub fn from_crystal(
        crystal: &Crystal,
        decorator: Option<&dyn OxidationDecorator>,
    ) -> Result<Decorated<Self>> {
        let (crystal, warning) = match decorator {
            Some(d) => decorate_best_effort(d, crystal),
            None => (crystal.clone(), None),
        };

        let (sites, species) = parse_crystal_sites(&crystal)?;
        let value = Self::new(&species, crystal.lattice.matrix, sites, 1.0)?;

        Ok(Decorated { value, warning })
    }

    /// 从远程结构库取第一个匹配约化化学式的结构
    ///
    /// 所有物种都带电时才尝试修饰氧化态。物种列表沿用调用者给出的值。
    pub fn from_repository(
        species: &[SpeciesSpec],
        api_key: &str,
        repository: &dyn StructureRepository,
        decorator: Option<&dyn OxidationDecorator>,
    ) -> Result<Decorated<Self>> {
        let sanitised = sanitise_species(species)?;
        let formula = reduced_formula(&sanitised);

        let candidate = repository
            .query(&formula, api_key)?
            .into_iter()
            .next()
            .ok_or_else(|| {
                SmactError::Lookup(format!(
                    "Could not find composition {} in the structure repository, \
                     please supply a structure.",
                    formula
                ))
            })?;

        let all_charged = sanitised.iter().all(|s| s.oxidation != 0);
        let (crystal, warning) = match decorator {
            Some(d) if all_charged => decorate_best_effort(d, &candidate),
            _ => (candidate, None),
        };

        let sites = SiteMap::from_crystal(&crystal);
        let value = Self::from_sanitised(sanitised, crystal.lattice.matrix, sites, 1.0)?;

        Ok(Decorated { value, warning })
    }

    /// 从 SMACT POSCAR 字符串解析
    pub fn from_poscar(poscar: &str) -> Result<Self> {
        smact_poscar::parse_smact_poscar(poscar)
    }

    /// 从 SMACT POSCAR 文件读取
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SmactError::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let content = fs::read_to_string(path).map_err(|e| SmactError::FileReadError {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_poscar(&content)
    }

    /// 序列化为 SMACT POSCAR 字符串
    pub fn as_poscar(&self) -> String {
        smact_poscar::to_smact_poscar(self)
    }

    /// 写出 SMACT POSCAR 文件
    pub fn write_file(&self, path: &Path) -> Result<()> {
        fs::write(path, self.as_poscar()).map_err(|e| SmactError::FileWriteError {
            path: path.display().to_string(),
            source: e,
        })
    }

    pub fn species(&self) -> &[SpeciesEntry] {
        &self.species
    }

    pub fn lattice_mat(&self) -> &[[f64; 3]; 3] {
        &self.lattice_mat
    }

    pub fn sites(&self) -> &SiteMap {
        &self.sites
    }

    pub fn lattice_param(&self) -> f64 {
        self.lattice_param
    }

    /// 按模板格式化每个物种，以 `delim` 连接
    pub fn format_style(&self, template: &str, delim: &str, include_ground: bool) -> String {
        format_species(&self.species, template, delim, include_ground)
    }

    /// 规范物种标签，按物种顺序
    pub fn labels(&self) -> Vec<String> {
        self.species.iter().map(SpeciesEntry::label).collect()
    }

    /// 组成键，例如 `Ca_1_2+O_3_2-Ti_1_4+`
    pub fn composition(&self) -> String {
        self.format_style(COMPOSITION_TEMPLATE, "", true)
    }

    /// 空格分隔的规范标签行
    pub fn label_line(&self) -> String {
        self.format_style(LABEL_TEMPLATE, " ", false)
    }

    /// 各元素总化学计量数
    pub fn element_stoichiometries(&self) -> IndexMap<String, u32> {
        element_stoichiometries(&self.species)
    }

    /// 约化化学式（去掉氧化态）
    pub fn reduced_formula(&self) -> String {
        reduced_formula(&self.species)
    }

    pub fn num_sites(&self) -> usize {
        self.sites.total_sites()
    }

    /// 转换为通用周期结构，用于写出模拟输入文件
    ///
    /// 晶格按晶格参数缩放，原子坐标转为分数坐标，物种字符串为规范标签。
    pub fn to_crystal(&self, name: &str) -> Crystal {
        let unscaled = Lattice::from_vectors(self.lattice_mat);
        let scale = self.lattice_param;
        let scaled = self.lattice_mat.map(|row| row.map(|x| x * scale));

        let atoms = self
            .sites
            .iter()
            .flat_map(|(label, coords)| {
                let unscaled = &unscaled;
                coords
                    .iter()
                    .map(move |&c| Atom::new(label, unscaled.cart_to_frac(c)))
            })
            .collect();

        Crystal::new(name, Lattice::from_vectors(scaled), atoms)
    }
}

impl fmt::Display for StructureRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_poscar())
    }
}

/// 每个物种至少占一个位点，且化学计量与由位点数推断出的值一致，
/// 使文本形式能解析回相等的记录
fn check_occupancy(species: &[SpeciesEntry], sites: &SiteMap) -> Result<()> {
    if let Some((label, _)) = sites.iter().find(|(_, coords)| coords.is_empty()) {
        return Err(SmactError::Validation(format!(
            "Species {} has no occupied sites.",
            label
        )));
    }

    // 文本路径总是由位点数重新推断化学计量，声明值必须与推断值逐项相同
    let declared: Vec<u32> = species.iter().map(|s| s.stoichiometry).collect();
    let inferred = infer_stoichiometry(&sites.site_counts())?;

    if declared != inferred {
        return Err(SmactError::Validation(format!(
            "Stoichiometries {:?} do not match site occupancy {:?} (inferred {:?}).",
            declared,
            sites.site_counts(),
            inferred
        )));
    }
    Ok(())
}

/// 外部结构 → (位点映射, 推断的物种列表)
fn parse_crystal_sites(crystal: &Crystal) -> Result<(SiteMap, Vec<SpeciesSpec>)> {
    let sites = SiteMap::from_crystal(crystal);
    let stoics = infer_stoichiometry(&sites.site_counts())?;

    let species = sites
        .labels()
        .zip(stoics)
        .map(|(label, stoic)| {
            let (symbol, charge) = parse_label(label)?;
            Ok(SpeciesSpec::Triple(symbol, charge, stoic))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok((sites, species))
}
