//! # 依赖注入具体实现
//!
//! 提供解析引擎（[`ResolveOperation`]）以及默认的组件注册表、委托注册、
//! 生命周期作用域和容器实现。
//!
//! 一次外部解析请求创建一个解析会话。会话维护激活栈用于循环依赖检测和
//! 作用域选择，并把构造完成回调推迟到最外层解析成功返回之前统一触发。

pub mod activation;
pub mod completion;
pub mod container;
pub mod operation;
pub mod registration;
pub mod registry;
pub mod scope;

pub use activation::{ActivationFrame, ActivationStack};
pub use completion::{CompletedActivation, CompletionBatch};
pub use container::{DiContainer, DiContainerBuilder};
pub use operation::ResolveOperation;
pub use registration::{ActivatingEvent, ComponentFactoryFn, DelegateRegistration, RegistrationBuilder};
pub use registry::ComponentRegistryImpl;
pub use scope::LifetimeScopeImpl;
