//! 球员身份解析
//!
//! - `registry`: 注册表来源与加载（远程归档 / 本地文件）
//! - `resolver`: 精确、模糊、批量、反向查询
//! - `fuzzy`: 全名相似度
//! - `normalize`: 大小写与重音规范化

pub mod fuzzy;
pub mod normalize;
pub mod registry;
pub mod resolver;

pub use normalize::strip_accents;
pub use registry::{load_registry, ChadwickRegister, RegistrySource, REGISTER_FILE_NAME};
pub use resolver::PlayerResolver;
