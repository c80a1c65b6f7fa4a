//! # Dependency Injection Abstractions
//!
//! 依赖注入抽象层，定义解析引擎与其协作方之间的接口。
//!
//! ## 核心接口
//!
//! - [`ServiceKey`] - 服务键
//! - [`ComponentRegistry`] - 组件注册表接口
//! - [`ComponentRegistration`] - 组件注册信息接口
//! - [`ComponentContext`] - 组件解析上下文接口
//! - [`LifetimeScope`] - 生命周期作用域接口

pub mod container;
pub mod parameter;
pub mod registry;
pub mod resolver;
pub mod scope;
pub mod service;

pub use container::*;
pub use parameter::*;
pub use registry::*;
pub use resolver::*;
pub use scope::*;
pub use service::*;
