//! 服务键
//!
//! 标识"请求的是什么"：类型，加上可选的名称限定

use infrastructure_common::TypeInfo;
use std::fmt;

/// 服务键
///
/// 不可变、可比较，用于在注册表中查找组件注册信息，
/// 也用于激活栈上的循环依赖检测。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ServiceKey {
    /// 按类型请求
    Typed(TypeInfo),
    /// 按名称和类型请求
    Named { name: String, type_info: TypeInfo },
}

impl ServiceKey {
    /// 按类型创建服务键
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::Typed(TypeInfo::of::<T>())
    }

    /// 按名称创建服务键
    pub fn named<T: ?Sized + 'static>(name: impl Into<String>) -> Self {
        Self::Named {
            name: name.into(),
            type_info: TypeInfo::of::<T>(),
        }
    }

    /// 服务对应的类型信息
    pub fn type_info(&self) -> &TypeInfo {
        match self {
            Self::Typed(type_info) | Self::Named { type_info, .. } => type_info,
        }
    }

    /// 服务名称（仅命名服务）
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Typed(_) => None,
            Self::Named { name, .. } => Some(name),
        }
    }

    /// 诊断用的描述
    pub fn description(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Typed(type_info) => write!(f, "{}", type_info),
            Self::Named { name, type_info } => write!(f, "{} ({})", name, type_info),
        }
    }
}

impl From<TypeInfo> for ServiceKey {
    fn from(type_info: TypeInfo) -> Self {
        Self::Typed(type_info)
    }
}
