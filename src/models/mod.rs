//! # 数据模型模块
//!
//! 定义物种、位点映射、规范结构记录、通用周期结构与原型晶格。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `store.rs`, `builder.rs` 和 CLI 使用
//! - 子模块: species, sites, record, structure, lattice

pub mod lattice;
pub mod record;
pub mod sites;
pub mod species;
pub mod structure;

pub use lattice::{Site, SiteLattice};
pub use record::StructureRecord;
pub use sites::SiteMap;
pub use species::{Species, SpeciesEntry, SpeciesSpec};
pub use structure::{Atom, Crystal, Lattice};
