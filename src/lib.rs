//! # smact-structure - 材料筛选用的晶体结构记录
//!
//! 以紧凑、无损、可文本序列化的形式表示化合物的组成、晶格与位点占据；
//! 按组成键持久化/检索结构；由元素列表构建理想化的原型晶格。
//!
//! ## 模块
//! - `models`  - 物种、位点映射、规范结构记录、通用周期结构
//! - `parsers` - SMACT POSCAR 编解码与 VASP POSCAR 读写
//! - `store`   - 基于 SQLite 的结构数据库
//! - `builder` - 钙钛矿 / 纤锌矿原型构建
//! - `symmetry`, `oxidation`, `repository` - 外部协作接口
//!
//! ## 依赖关系
//! ```text
//! lib.rs
//!   ├── models/     (数据模型)
//!   │     └── parsers/   (文本格式)
//!   ├── store.rs    (持久化)
//!   ├── builder.rs  (原型构建)
//!   │     └── symmetry.rs
//!   ├── oxidation.rs, repository.rs (外部服务接口)
//!   └── error.rs    (错误处理)
//! ```

pub mod builder;
pub mod error;
pub mod models;
pub mod oxidation;
pub mod parsers;
pub mod repository;
pub mod store;
pub mod symmetry;

pub use error::{Result, SmactError};
pub use models::{SiteMap, Species, SpeciesEntry, SpeciesSpec, StructureRecord};
pub use store::StructureStore;
