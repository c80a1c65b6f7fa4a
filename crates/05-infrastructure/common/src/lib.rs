//! # Infrastructure Common
//!
//! 这个 crate 提供了 Lorn ADSP 依赖解析引擎共用的错误类型和类型元数据。
//!
//! ## 核心类型
//!
//! - [`DependencyError`] - 依赖解析错误
//! - [`ConfigError`] - 配置加载错误
//! - [`TypeInfo`] - 类型元数据，用于服务键和诊断输出

pub mod errors;
pub mod metadata;

pub use errors::*;
pub use metadata::*;
