//! # SMACT POSCAR 格式编解码
//!
//! 无损、可往返的结构记录文本格式。
//!
//! ## 格式说明
//! ```text
//! Ca2+ O2- Ti4+          # 规范物种标签，按规范顺序
//! 1.0                    # 晶格参数
//! a1 a2 a3               # 晶格向量 a
//! b1 b2 b3               # 晶格向量 b
//! c1 c2 c3               # 晶格向量 c
//! Ca O Ti                # 裸元素符号
//! 1 3 1                  # 各物种位点数（可不约化）
//! Cartesian
//! x y z Ca2+             # 每行一个位点，空行结束
//! ...
//! ```
//!
//! 浮点数以最短可往返形式输出，保证 `parse(to_string(s)) == s`。
//!
//! ## 依赖关系
//! - 被 `models/record.rs` 使用
//! - 使用 `models/species.rs`, `models/sites.rs`

use crate::error::{Result, SmactError};
use crate::models::record::StructureRecord;
use crate::models::sites::SiteMap;
use crate::models::species::{fix_implicit_unit_charge, infer_stoichiometry, parse_label, SpeciesSpec};

const FORMAT: &str = "SMACT POSCAR";
const COORD_MODE: &str = "Cartesian";

/// 将结构记录序列化为 SMACT POSCAR 字符串
pub fn to_smact_poscar(record: &StructureRecord) -> String {
    let mut result = String::new();

    // Line 0: 物种标签
    result.push_str(&record.label_line());
    result.push('\n');

    // Line 1: 晶格参数
    result.push_str(&format!("{:?}\n", record.lattice_param()));

    // Lines 2-4: 晶格向量
    for row in record.lattice_mat() {
        result.push_str(&format!("{:?} {:?} {:?}\n", row[0], row[1], row[2]));
    }

    // Line 5: 裸元素
    result.push_str(&record.format_style("{ele}", " ", false));
    result.push('\n');

    // Line 6: 位点数，与标签顺序对齐
    let counts: Vec<String> = record
        .labels()
        .iter()
        .map(|label| {
            record
                .sites()
                .get(label)
                .map(|coords| coords.len())
                .unwrap_or(0)
                .to_string()
        })
        .collect();
    result.push_str(&counts.join(" "));
    result.push('\n');

    result.push_str(COORD_MODE);
    result.push('\n');

    // 位点坐标
    for (label, coords) in record.sites().iter() {
        for c in coords {
            result.push_str(&format!("{:?} {:?} {:?} {}\n", c[0], c[1], c[2], label));
        }
    }

    result
}

/// 从 SMACT POSCAR 字符串解析结构记录
///
/// 第 6 行的计数视为未约化的占位数，化学计量重新推断。
pub fn parse_smact_poscar(content: &str) -> Result<StructureRecord> {
    let lines: Vec<&str> = content.lines().collect();

    if lines.len() < 8 {
        return Err(SmactError::parse(
            FORMAT,
            format!("expected at least 8 lines, got {}", lines.len()),
        ));
    }

    // Line 0 + Line 6: 物种与计数
    let labels: Vec<&str> = lines[0].split_whitespace().collect();
    let counts = lines[6]
        .split_whitespace()
        .map(|s| {
            s.parse::<usize>()
                .map_err(|_| SmactError::parse(FORMAT, format!("invalid site count '{}' on line 7", s)))
        })
        .collect::<Result<Vec<_>>>()?;

    if labels.len() != counts.len() {
        return Err(SmactError::parse(
            FORMAT,
            format!(
                "{} species labels but {} site counts",
                labels.len(),
                counts.len()
            ),
        ));
    }

    let stoics = infer_stoichiometry(&counts)?;
    let species = labels
        .iter()
        .zip(stoics)
        .map(|(label, stoic)| {
            let (symbol, charge) = parse_label(label)?;
            Ok(SpeciesSpec::Triple(symbol, charge, stoic))
        })
        .collect::<Result<Vec<_>>>()?;

    // Line 1: 晶格参数
    let lattice_param = parse_float(lines[1].trim(), 2)?;

    // Lines 2-4: 晶格向量
    let mut lattice = [[0.0; 3]; 3];
    for (i, row) in lattice.iter_mut().enumerate() {
        let parts: Vec<&str> = lines[2 + i].split_whitespace().collect();
        if parts.len() != 3 {
            return Err(SmactError::parse(
                FORMAT,
                format!("invalid lattice vector at line {}", 3 + i),
            ));
        }
        for (j, part) in parts.iter().enumerate() {
            row[j] = parse_float(part, 3 + i)?;
        }
    }

    // Lines 8+: 位点
    let mut sites = SiteMap::new();
    for (offset, line) in lines[8..].iter().enumerate() {
        if line.trim().is_empty() {
            break;
        }
        let line_no = 9 + offset;
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(SmactError::parse(
                FORMAT,
                format!("invalid site at line {}", line_no),
            ));
        }
        let coord = [
            parse_float(parts[0], line_no)?,
            parse_float(parts[1], line_no)?,
            parse_float(parts[2], line_no)?,
        ];
        let label = parts[parts.len() - 1];
        sites.push(fix_implicit_unit_charge(label), coord);
    }

    StructureRecord::new(&species, lattice, sites, lattice_param)
}

fn parse_float(s: &str, line_no: usize) -> Result<f64> {
    s.parse::<f64>()
        .map_err(|_| SmactError::parse(FORMAT, format!("invalid number '{}' on line {}", s, line_no)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CA_TI_O3: &str = r#"Ca2+ O2- Ti4+
1.0
3.91 0.0 0.0
0.0 3.91 0.0
0.0 0.0 3.91
Ca O Ti
1 3 1
Cartesian
0.0 0.0 0.0 Ca2+
1.955 1.955 0.0 O2-
1.955 0.0 1.955 O2-
0.0 1.955 1.955 O2-
1.955 1.955 1.955 Ti4+
"#;

    #[test]
    fn test_parse_ca_ti_o3() {
        let s = parse_smact_poscar(CA_TI_O3).unwrap();

        assert_eq!(s.composition(), "Ca_1_2+O_3_2-Ti_1_4+");
        assert_eq!(s.lattice_param(), 1.0);
        assert_eq!(s.lattice_mat()[1], [0.0, 3.91, 0.0]);
        assert_eq!(s.sites().get("O2-").unwrap().len(), 3);
        assert_eq!(s.sites().get("O2-").unwrap()[1], [1.955, 0.0, 1.955]);
    }

    #[test]
    fn test_serialize_matches_fixture() {
        let s = parse_smact_poscar(CA_TI_O3).unwrap();
        assert_eq!(to_smact_poscar(&s), CA_TI_O3);
    }

    #[test]
    fn test_counts_need_not_be_reduced() {
        let content = r#"Na1+ Cl1-
1.0
5.64 0.0 0.0
0.0 5.64 0.0
0.0 0.0 5.64
Na Cl
2 2
Cartesian
0.0 0.0 0.0 Na1+
2.82 2.82 0.0 Na1+
2.82 0.0 0.0 Cl1-
0.0 2.82 0.0 Cl1-
"#;
        let s = parse_smact_poscar(content).unwrap();

        // 物种按规范顺序重排，计量比约化为 1:1
        assert_eq!(s.composition(), "Cl_1_1-Na_1_1+");
        assert_eq!(s.labels(), vec!["Cl1-", "Na1+"]);
    }

    #[test]
    fn test_blank_line_ends_sites() {
        let content = format!("{}\n0.0 0.0 0.0 Ca2+\n", CA_TI_O3);
        let s = parse_smact_poscar(&content).unwrap();
        assert_eq!(s.sites().get("Ca2+").unwrap().len(), 1);
    }

    #[test]
    fn test_reject_truncated() {
        let err = parse_smact_poscar("Ca2+\n1.0\n").unwrap_err();
        assert!(matches!(err, SmactError::ParseError { .. }));
    }

    #[test]
    fn test_reject_count_mismatch() {
        let content = CA_TI_O3.replace("1 3 1", "1 3");
        assert!(matches!(
            parse_smact_poscar(&content),
            Err(SmactError::ParseError { .. })
        ));
    }

    #[test]
    fn test_reject_bad_number() {
        let content = CA_TI_O3.replace("3.91 0.0 0.0", "3.91 abc 0.0");
        assert!(matches!(
            parse_smact_poscar(&content),
            Err(SmactError::ParseError { .. })
        ));
    }

    #[test]
    fn test_missing_species_sites() {
        let content = CA_TI_O3.replace("1.955 1.955 1.955 Ti4+\n", "");
        assert!(matches!(
            parse_smact_poscar(&content),
            Err(SmactError::Validation(_))
        ));
    }
}
