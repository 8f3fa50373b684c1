//! # 原型晶格
//!
//! 原型构建器的输出：每个位点带分数坐标与允许的氧化态列表。
//!
//! ## 依赖关系
//! - 被 `builder.rs` 使用
//! - 无外部模块依赖

use serde::{Deserialize, Serialize};

/// 晶格位点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    /// 分数坐标 [x, y, z]
    pub position: [f64; 3],

    /// 该位点允许的氧化态
    pub oxidation_states: Vec<i32>,
}

impl Site {
    pub fn new(position: [f64; 3], oxidation_states: Vec<i32>) -> Self {
        Site {
            position,
            oxidation_states,
        }
    }
}

/// 由位点组成的晶格
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteLattice {
    pub sites: Vec<Site>,

    /// 与 `sites` 一一对应的氧化态列表
    pub oxidation_states: Vec<Vec<i32>>,
}

impl SiteLattice {
    pub fn new(sites: Vec<Site>) -> Self {
        let oxidation_states = sites.iter().map(|s| s.oxidation_states.clone()).collect();
        SiteLattice {
            sites,
            oxidation_states,
        }
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}
