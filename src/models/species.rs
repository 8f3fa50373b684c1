//! # 物种列表与规范格式化
//!
//! 物种 = (元素, 氧化态, 化学计量数)。本模块负责：
//! - 物种输入的校验与规范排序（元素升序，同元素氧化态降序）
//! - 物种标签 `{ele}{|charge|}{sign}` 的生成与解析
//! - 模板格式化引擎，所有派生文本表示（标签、POSCAR 头、组成键）共用
//! - 由原始占位计数推断整数化学计量比
//!
//! ## 依赖关系
//! - 被 `models/sites.rs`, `models/record.rs`, `parsers/smact_poscar.rs` 使用
//! - 使用 `regex`, `indexmap`, `serde_json`

use crate::error::{Result, SmactError};

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::LazyLock;

static LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z]+)(\d*)([+-]?)$").expect("valid label regex"));

/// 带氧化态的化学物种
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Species {
    pub symbol: String,
    pub oxidation: i32,
}

impl Species {
    pub fn new(symbol: impl Into<String>, oxidation: i32) -> Self {
        Species {
            symbol: symbol.into(),
            oxidation,
        }
    }
}

/// 物种输入的两种形式
#[derive(Debug, Clone, PartialEq)]
pub enum SpeciesSpec {
    /// (元素符号, 氧化态, 化学计量数)
    Triple(String, i32, u32),
    /// (物种对象, 化学计量数)
    Object(Species, u32),
}

impl SpeciesSpec {
    pub fn triple(symbol: impl Into<String>, oxidation: i32, stoichiometry: u32) -> Self {
        SpeciesSpec::Triple(symbol.into(), oxidation, stoichiometry)
    }

    pub fn object(species: Species, stoichiometry: u32) -> Self {
        SpeciesSpec::Object(species, stoichiometry)
    }

    /// 归一化为规范三元组
    pub fn into_entry(self) -> SpeciesEntry {
        match self {
            SpeciesSpec::Triple(symbol, oxidation, stoichiometry) => SpeciesEntry {
                symbol,
                oxidation,
                stoichiometry,
            },
            SpeciesSpec::Object(species, stoichiometry) => SpeciesEntry {
                symbol: species.symbol,
                oxidation: species.oxidation,
                stoichiometry,
            },
        }
    }

    fn is_object(&self) -> bool {
        matches!(self, SpeciesSpec::Object(..))
    }
}

impl From<(&str, i32, u32)> for SpeciesSpec {
    fn from((symbol, oxidation, stoichiometry): (&str, i32, u32)) -> Self {
        SpeciesSpec::triple(symbol, oxidation, stoichiometry)
    }
}

impl From<(Species, u32)> for SpeciesSpec {
    fn from((species, stoichiometry): (Species, u32)) -> Self {
        SpeciesSpec::Object(species, stoichiometry)
    }
}

/// 规范化后的物种三元组
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpeciesEntry {
    pub symbol: String,
    pub oxidation: i32,
    pub stoichiometry: u32,
}

impl SpeciesEntry {
    pub fn new(symbol: impl Into<String>, oxidation: i32, stoichiometry: u32) -> Self {
        SpeciesEntry {
            symbol: symbol.into(),
            oxidation,
            stoichiometry,
        }
    }

    /// 规范标签，例如 `Ca2+`, `O2-`, 中性为 `Fe`
    pub fn label(&self) -> String {
        format_label(&self.symbol, self.oxidation)
    }
}

/// 校验并按规范顺序排列物种
///
/// 不修改调用者的输入；所有条目必须为同一种形式。
pub fn sanitise_species(species: &[SpeciesSpec]) -> Result<Vec<SpeciesEntry>> {
    let first = species
        .first()
        .ok_or_else(|| SmactError::Validation("`species` cannot be empty.".to_string()))?;

    if species.iter().any(|s| s.is_object() != first.is_object()) {
        return Err(SmactError::Validation(
            "`species` must contain either only (symbol, oxidation, stoichiometry) triples \
             or only (Species, stoichiometry) pairs."
                .to_string(),
        ));
    }

    let mut entries: Vec<SpeciesEntry> = species.iter().cloned().map(SpeciesSpec::into_entry).collect();
    sort_species(&mut entries);
    Ok(entries)
}

/// 规范排序：元素符号升序，同元素氧化态降序（稳定排序）
pub fn sort_species(entries: &mut [SpeciesEntry]) {
    entries.sort_by(|a, b| {
        a.symbol
            .cmp(&b.symbol)
            .then_with(|| b.oxidation.cmp(&a.oxidation))
    });
}

/// 从 JSON 解析物种输入
///
/// 接受 `[["Ca", 2, 1], ...]` 或 `[[{"symbol": "Fe", "oxidation": 2}, 1], ...]`。
pub fn species_from_json(value: &Value) -> Result<Vec<SpeciesSpec>> {
    const SHAPE_ERROR: &str = "`species` list must contain either 2-element entries of \
        species objects and stoichiometries, or 3-element entries of elements, \
        oxidations and stoichiometries.";

    let items = value.as_array().ok_or_else(|| {
        SmactError::Validation(format!("`species` must be a list, got {}.", json_kind(value)))
    })?;

    let first = items
        .first()
        .ok_or_else(|| SmactError::Validation("`species` cannot be empty.".to_string()))?;

    let first = first.as_array().ok_or_else(|| {
        SmactError::Validation(format!(
            "`species` must be a list of tuples, got list of {}.",
            json_kind(first)
        ))
    })?;

    let arity = first.len();
    if arity != 2 && arity != 3 {
        return Err(SmactError::Validation(SHAPE_ERROR.to_string()));
    }

    let object_form = match first.first() {
        Some(Value::String(_)) => false,
        Some(Value::Object(_)) => true,
        _ => return Err(SmactError::Validation(SHAPE_ERROR.to_string())),
    };

    items
        .iter()
        .map(|item| {
            let parts = item
                .as_array()
                .filter(|p| p.len() == arity)
                .ok_or_else(|| SmactError::Validation(SHAPE_ERROR.to_string()))?;

            if object_form {
                if arity != 2 {
                    return Err(SmactError::Validation(SHAPE_ERROR.to_string()));
                }
                let species: Species = serde_json::from_value(parts[0].clone())?;
                Ok(SpeciesSpec::Object(species, json_u32(&parts[1])?))
            } else {
                if arity != 3 {
                    return Err(SmactError::Validation(SHAPE_ERROR.to_string()));
                }
                let symbol = parts[0]
                    .as_str()
                    .ok_or_else(|| SmactError::Validation(SHAPE_ERROR.to_string()))?;
                let oxidation = parts[1]
                    .as_i64()
                    .and_then(|v| i32::try_from(v).ok())
                    .ok_or_else(|| {
                        SmactError::Validation(format!("Invalid oxidation state: {}", parts[1]))
                    })?;
                Ok(SpeciesSpec::triple(symbol, oxidation, json_u32(&parts[2])?))
            }
        })
        .collect()
}

fn json_u32(value: &Value) -> Result<u32> {
    value
        .as_u64()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| SmactError::Validation(format!("Invalid stoichiometry: {}", value)))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

/// 氧化态符号：'+', '-' 或中性 ''
pub fn get_sign(charge: i32) -> &'static str {
    match charge {
        c if c > 0 => "+",
        c if c < 0 => "-",
        _ => "",
    }
}

/// 生成物种标签
pub fn format_label(symbol: &str, oxidation: i32) -> String {
    if oxidation == 0 {
        symbol.to_string()
    } else {
        format!("{}{}{}", symbol, oxidation.abs(), get_sign(oxidation))
    }
}

/// 解析物种标签为 (元素符号, 氧化态)
///
/// 仅有符号而无数字时视为单位电荷，例如 `O-` → ("O", -1)。
pub fn parse_label(label: &str) -> Result<(String, i32)> {
    let caps = LABEL_RE
        .captures(label)
        .ok_or_else(|| SmactError::parse("species label", format!("'{}'", label)))?;

    let symbol = caps[1].to_string();
    let digits = &caps[2];
    let sign = &caps[3];

    let magnitude: i32 = if digits.is_empty() {
        if sign.is_empty() {
            0
        } else {
            1
        }
    } else {
        digits
            .parse()
            .map_err(|_| SmactError::parse("species label", format!("'{}'", label)))?
    };

    // 有数字无符号（如 "Fe2"）不是合法标签
    if magnitude != 0 && sign.is_empty() {
        return Err(SmactError::parse(
            "species label",
            format!("'{}' has a charge magnitude but no sign", label),
        ));
    }

    let charge = if sign == "-" { -magnitude } else { magnitude };
    Ok((symbol, charge))
}

/// 补全隐式单位电荷：`O-` → `O1-`
pub fn fix_implicit_unit_charge(species: &str) -> String {
    let mut chars = species.chars().rev();
    match (chars.next(), chars.next()) {
        (Some(sign @ ('+' | '-')), Some(prev)) if !prev.is_ascii_digit() => {
            format!("{}1{}", &species[..species.len() - 1], sign)
        }
        _ => species.to_string(),
    }
}

/// 模板格式化引擎
///
/// 模板支持 `{ele}`, `{stoic}`, `{charge}`, `{sign}` 占位符。
/// `include_ground` 为真时中性物种渲染为 `0+`，否则电荷与符号均为空。
pub fn format_species(
    species: &[SpeciesEntry],
    template: &str,
    delim: &str,
    include_ground: bool,
) -> String {
    species
        .iter()
        .map(|s| {
            let (charge, sign) = if include_ground {
                let sign = if s.oxidation >= 0 { "+" } else { "-" };
                (s.oxidation.abs().to_string(), sign)
            } else if s.oxidation == 0 {
                (String::new(), "")
            } else {
                (s.oxidation.abs().to_string(), get_sign(s.oxidation))
            };

            template
                .replace("{ele}", &s.symbol)
                .replace("{stoic}", &s.stoichiometry.to_string())
                .replace("{charge}", &charge)
                .replace("{sign}", sign)
        })
        .collect::<Vec<_>>()
        .join(delim)
}

/// 各元素的总化学计量数（忽略氧化态）
pub fn element_stoichiometries(species: &[SpeciesEntry]) -> IndexMap<String, u32> {
    let mut eles: IndexMap<String, u32> = IndexMap::new();
    for s in species {
        *eles.entry(s.symbol.clone()).or_insert(0) += s.stoichiometry;
    }
    eles
}

/// 由原始占位计数推断最简整数化学计量比
///
/// 计数先按总和归一化，再除以最小值并四舍五入。
/// 假定计数恰为真实化学计量的整数倍。
pub fn infer_stoichiometry(counts: &[usize]) -> Result<Vec<u32>> {
    if counts.is_empty() {
        return Err(SmactError::Validation(
            "Cannot infer stoichiometry from an empty occupancy list.".to_string(),
        ));
    }
    if counts.contains(&0) {
        return Err(SmactError::Validation(format!(
            "Occupancy counts must be positive, got {:?}.",
            counts
        )));
    }

    let total: usize = counts.iter().sum();
    let fractions: Vec<f64> = counts.iter().map(|&c| c as f64 / total as f64).collect();
    let min = fractions.iter().cloned().fold(f64::INFINITY, f64::min);

    Ok(fractions.iter().map(|f| (f / min).round() as u32).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entries(list: &[(&str, i32, u32)]) -> Vec<SpeciesEntry> {
        list.iter()
            .map(|&(s, o, n)| SpeciesEntry::new(s, o, n))
            .collect()
    }

    #[test]
    fn test_sanitise_orders_by_symbol() {
        let input: Vec<SpeciesSpec> = vec![("O", -2, 3).into(), ("Ca", 2, 1).into(), ("Ti", 4, 1).into()];
        let sanitised = sanitise_species(&input).unwrap();

        assert_eq!(sanitised, entries(&[("Ca", 2, 1), ("O", -2, 3), ("Ti", 4, 1)]));
    }

    #[test]
    fn test_sanitise_same_symbol_charge_descending() {
        let expected = entries(&[("Fe", 3, 2), ("Fe", 2, 1)]);

        let a: Vec<SpeciesSpec> = vec![("Fe", 2, 1).into(), ("Fe", 3, 2).into()];
        let b: Vec<SpeciesSpec> = vec![("Fe", 3, 2).into(), ("Fe", 2, 1).into()];

        assert_eq!(sanitise_species(&a).unwrap(), expected);
        assert_eq!(sanitise_species(&b).unwrap(), expected);
    }

    #[test]
    fn test_sanitise_does_not_mutate_input() {
        let input: Vec<SpeciesSpec> = vec![("O", -2, 3).into(), ("Ca", 2, 1).into()];
        let snapshot = input.clone();
        let _ = sanitise_species(&input).unwrap();

        assert_eq!(input, snapshot);
    }

    #[test]
    fn test_sanitise_species_objects() {
        let input: Vec<SpeciesSpec> = vec![
            (Species::new("O", -2), 4).into(),
            (Species::new("Fe", 2), 1).into(),
            (Species::new("Fe", 3), 2).into(),
        ];
        let sanitised = sanitise_species(&input).unwrap();

        assert_eq!(sanitised, entries(&[("Fe", 3, 2), ("Fe", 2, 1), ("O", -2, 4)]));
    }

    #[test]
    fn test_sanitise_rejects_empty() {
        assert!(matches!(sanitise_species(&[]), Err(SmactError::Validation(_))));
    }

    #[test]
    fn test_sanitise_rejects_mixed_forms() {
        let input = vec![
            SpeciesSpec::triple("Ca", 2, 1),
            SpeciesSpec::object(Species::new("O", -2), 1),
        ];
        assert!(matches!(sanitise_species(&input), Err(SmactError::Validation(_))));
    }

    #[test]
    fn test_species_from_json_triples() {
        let value = json!([["O", -2, 3], ["Ca", 2, 1]]);
        let specs = species_from_json(&value).unwrap();

        assert_eq!(specs, vec![SpeciesSpec::triple("O", -2, 3), SpeciesSpec::triple("Ca", 2, 1)]);
    }

    #[test]
    fn test_species_from_json_objects() {
        let value = json!([[{"symbol": "Fe", "oxidation": 3}, 2]]);
        let specs = species_from_json(&value).unwrap();

        assert_eq!(specs, vec![SpeciesSpec::object(Species::new("Fe", 3), 2)]);
    }

    #[test]
    fn test_species_from_json_rejects_bad_shapes() {
        // 非列表
        assert!(matches!(
            species_from_json(&json!("CaTiO3")),
            Err(SmactError::Validation(_))
        ));
        // 空列表
        assert!(matches!(species_from_json(&json!([])), Err(SmactError::Validation(_))));
        // 元素不是元组
        assert!(matches!(
            species_from_json(&json!(["Ca", "O"])),
            Err(SmactError::Validation(_))
        ));
        // 四元组
        assert!(matches!(
            species_from_json(&json!([["Ca", 2, 1, 0]])),
            Err(SmactError::Validation(_))
        ));
        // 首元素既非字符串也非物种对象
        assert!(matches!(
            species_from_json(&json!([[20, 2, 1]])),
            Err(SmactError::Validation(_))
        ));
    }

    #[test]
    fn test_label_format_and_parse() {
        assert_eq!(format_label("Ca", 2), "Ca2+");
        assert_eq!(format_label("O", -2), "O2-");
        assert_eq!(format_label("Fe", 0), "Fe");

        assert_eq!(parse_label("Ti4+").unwrap(), ("Ti".to_string(), 4));
        assert_eq!(parse_label("Cl1-").unwrap(), ("Cl".to_string(), -1));
        assert_eq!(parse_label("Cl-").unwrap(), ("Cl".to_string(), -1));
        assert_eq!(parse_label("Fe").unwrap(), ("Fe".to_string(), 0));
        assert!(parse_label("Fe2").is_err());
        assert!(parse_label("2+").is_err());
    }

    #[test]
    fn test_fix_implicit_unit_charge() {
        assert_eq!(fix_implicit_unit_charge("O-"), "O1-");
        assert_eq!(fix_implicit_unit_charge("Na+"), "Na1+");
        assert_eq!(fix_implicit_unit_charge("O2-"), "O2-");
        assert_eq!(fix_implicit_unit_charge("Fe"), "Fe");
    }

    #[test]
    fn test_format_species_modes() {
        let species = entries(&[("Fe", 0, 1), ("O", -2, 3)]);

        assert_eq!(format_species(&species, "{ele}{charge}{sign}", " ", false), "Fe O2-");
        assert_eq!(
            format_species(&species, "{ele}_{stoic}_{charge}{sign}", "", true),
            "Fe_1_0+O_3_2-"
        );
        assert_eq!(format_species(&species, "{stoic}x{ele}", ",", false), "1xFe,3xO");
    }

    #[test]
    fn test_element_stoichiometries() {
        let species = entries(&[("Fe", 3, 2), ("Fe", 2, 1), ("O", -2, 4)]);
        let eles = element_stoichiometries(&species);

        assert_eq!(eles.get("Fe"), Some(&3));
        assert_eq!(eles.get("O"), Some(&4));
        assert_eq!(eles.keys().collect::<Vec<_>>(), vec!["Fe", "O"]);
    }

    #[test]
    fn test_infer_stoichiometry() {
        assert_eq!(infer_stoichiometry(&[2, 6]).unwrap(), vec![1, 3]);
        assert_eq!(infer_stoichiometry(&[4, 4, 12]).unwrap(), vec![1, 1, 3]);
        assert_eq!(infer_stoichiometry(&[3]).unwrap(), vec![1]);
    }

    #[test]
    fn test_infer_stoichiometry_rejects_degenerate() {
        assert!(infer_stoichiometry(&[]).is_err());
        assert!(infer_stoichiometry(&[0, 2]).is_err());
    }
}
