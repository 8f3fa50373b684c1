//! # 氧化态修饰
//!
//! 为外部结构的原子赋予氧化态。修饰是增强而非必需：
//! 失败时结构按原样（名义/中性电荷）继续使用，警告随结果返回。
//!
//! ## 依赖关系
//! - 被 `models/record.rs` 的外部结构构造路径使用
//! - 使用 `models/structure.rs`

use crate::error::{Result, SmactError};
use crate::models::species::{format_label, get_sign};
use crate::models::structure::{Atom, Crystal};

use std::collections::HashMap;
use std::fmt;

/// 氧化态修饰服务
pub trait OxidationDecorator {
    /// 返回修饰后的结构副本
    fn decorate(&self, crystal: &Crystal) -> Result<Crystal>;
}

/// 修饰失败的警告
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecorationWarning {
    pub message: String,
}

impl fmt::Display for DecorationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Couldn't decorate structure with oxidation states: {}", self.message)
    }
}

/// 附带可选修饰警告的构造结果
#[derive(Debug, Clone, PartialEq)]
pub struct Decorated<T> {
    pub value: T,
    pub warning: Option<DecorationWarning>,
}

impl<T> Decorated<T> {
    pub fn clean(value: T) -> Self {
        Decorated {
            value,
            warning: None,
        }
    }

    /// 丢弃警告，取出值
    pub fn into_inner(self) -> T {
        self.value
    }

    /// 修饰失败时视为错误
    pub fn strict(self) -> Result<T> {
        match self.warning {
            Some(w) => Err(SmactError::Decoration(w.message)),
            None => Ok(self.value),
        }
    }
}

/// 尽力修饰：失败时返回原结构与警告
pub fn decorate_best_effort(
    decorator: &dyn OxidationDecorator,
    crystal: &Crystal,
) -> (Crystal, Option<DecorationWarning>) {
    match decorator.decorate(crystal) {
        Ok(decorated) => (decorated, None),
        Err(e) => {
            log::warn!("Couldn't decorate structure '{}' with oxidation states: {}", crystal.name, e);
            let message = match e {
                SmactError::Decoration(msg) => msg,
                other => other.to_string(),
            };
            (crystal.clone(), Some(DecorationWarning { message }))
        }
    }
}

/// 按元素查表的固定氧化态修饰器
#[derive(Debug, Clone, Default)]
pub struct FixedOxidationDecorator {
    states: HashMap<String, i32>,
}

impl FixedOxidationDecorator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(mut self, element: impl Into<String>, oxidation: i32) -> Self {
        self.states.insert(element.into(), oxidation);
        self
    }

    /// 从 `"Ca=2,Ti=4,O=-2"` 形式解析
    pub fn parse(spec: &str) -> Result<Self> {
        let mut decorator = Self::new();
        for pair in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let (element, state) = pair.split_once('=').ok_or_else(|| {
                SmactError::InvalidArgument(format!("Expected ELEMENT=STATE, got '{}'", pair))
            })?;
            let state: i32 = state.trim().parse().map_err(|_| {
                SmactError::InvalidArgument(format!("Invalid oxidation state in '{}'", pair))
            })?;
            decorator.states.insert(element.trim().to_string(), state);
        }
        Ok(decorator)
    }
}

impl OxidationDecorator for FixedOxidationDecorator {
    fn decorate(&self, crystal: &Crystal) -> Result<Crystal> {
        let atoms = crystal
            .atoms
            .iter()
            .map(|atom| {
                let element = atom.element();
                let state = self.states.get(element).ok_or_else(|| {
                    SmactError::Decoration(format!("no oxidation state known for '{}'", element))
                })?;
                Ok(Atom::new(species_string(element, *state), atom.position))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Crystal::new(crystal.name.clone(), crystal.lattice.clone(), atoms))
    }
}

/// 外部结构的物种字符串约定：单位电荷省略数字（`O-`）
fn species_string(element: &str, oxidation: i32) -> String {
    if oxidation.abs() == 1 {
        format!("{}{}", element, get_sign(oxidation))
    } else {
        format_label(element, oxidation)
    }
}
