//! 错误类型定义

use thiserror::Error;

/// 装箱的底层错误
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    #[error("配置解析失败: {source}")]
    ParseError { source: BoxError },

    #[error("配置验证失败: {message}")]
    ValidationError { message: String },
}

impl ConfigError {
    /// 创建解析错误
    pub fn parse_error(source: impl Into<BoxError>) -> Self {
        Self::ParseError {
            source: source.into(),
        }
    }

    /// 创建验证错误
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }
}

/// 依赖注入错误类型
///
/// 解析过程中产生的所有错误都原样向上传播，中间的激活帧不会包装或重试。
#[derive(Error, Debug)]
pub enum DependencyError {
    #[error("组件未注册: {service}")]
    ComponentNotRegistered { service: String },

    #[error("组件创建失败: {service}, 原因: {source}")]
    ComponentCreationFailed { service: String, source: BoxError },

    #[error("循环依赖检测到: {dependency_chain}")]
    CircularDependency { dependency_chain: String },

    #[error("依赖解析失败: {service}, 原因: {message}")]
    DependencyResolutionFailed { service: String, message: String },

    #[error("组件类型不匹配: {service}, 期望类型 {expected}")]
    TypeMismatch { service: String, expected: String },

    #[error("作用域不匹配: 期望 {expected}, 实际 {actual}")]
    ScopeMismatch { expected: String, actual: String },
}

impl DependencyError {
    /// 创建未注册错误
    pub fn not_registered(service: impl ToString) -> Self {
        Self::ComponentNotRegistered {
            service: service.to_string(),
        }
    }

    /// 包装构造函数内部产生的错误
    pub fn creation_failed(service: impl ToString, source: impl Into<BoxError>) -> Self {
        Self::ComponentCreationFailed {
            service: service.to_string(),
            source: source.into(),
        }
    }

    /// 创建参数绑定或依赖解析失败错误
    pub fn resolution_failed(service: impl ToString, message: impl Into<String>) -> Self {
        Self::DependencyResolutionFailed {
            service: service.to_string(),
            message: message.into(),
        }
    }

    /// 是否为循环依赖错误
    pub fn is_circular_dependency(&self) -> bool {
        matches!(self, Self::CircularDependency { .. })
    }

    /// 循环依赖链描述
    pub fn dependency_chain(&self) -> Option<&str> {
        match self {
            Self::CircularDependency { dependency_chain } => Some(dependency_chain),
            _ => None,
        }
    }
}

/// 配置结果类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
