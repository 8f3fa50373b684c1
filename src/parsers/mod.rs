//! # 解析器模块
//!
//! 提供结构文本格式的解析与序列化。
//!
//! ## 依赖关系
//! - 被 `models/record.rs` 和 CLI 使用
//! - 使用 `models/` 数据模型
//! - 子模块: poscar (VASP), smact_poscar (规范记录格式)

pub mod poscar;
pub mod smact_poscar;

use crate::error::{Result, SmactError};
use crate::models::Crystal;
use std::path::Path;

/// 从文件路径推断格式并解析为外部结构
pub fn parse_structure_file(path: &Path) -> Result<Crystal> {
    if !path.exists() {
        return Err(SmactError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "vasp" | "poscar" | "contcar" => poscar::parse_poscar_file(path),
        _ => {
            // 可能是 POSCAR/CONTCAR (无扩展名)
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.starts_with("POSCAR") || name.starts_with("CONTCAR") {
                    return poscar::parse_poscar_file(path);
                }
            }
            Err(SmactError::UnsupportedFormat(format!(
                "Cannot determine format for: {}",
                path.display()
            )))
        }
    }
}
