//! 生命周期作用域抽象接口
//!
//! 作用域树本身（创建、销毁）不属于解析引擎，引擎只读取父链和标签来选择
//! 组件实例应该归属的作用域。

use crate::registry::{ComponentRegistry, RegistrationId};
use crate::resolver::Instance;
use infrastructure_common::DependencyError;
use std::fmt;
use std::sync::Arc;

/// 根作用域的默认标签
pub const ROOT_SCOPE_TAG: &str = "root";

/// 作用域引用
pub type ScopeRef = Arc<dyn LifetimeScope>;

/// 共享实例的创建函数
pub type SharedInstanceCreator<'a> = dyn FnMut() -> Result<Instance, DependencyError> + 'a;

/// 生命周期作用域 trait
pub trait LifetimeScope: Send + Sync + fmt::Debug {
    /// 作用域ID
    fn id(&self) -> uuid::Uuid;

    /// 作用域标签
    fn tag(&self) -> &str;

    /// 父作用域，根作用域返回 `None`
    fn parent(&self) -> Option<ScopeRef>;

    /// 作用域可见的组件注册表
    fn component_registry(&self) -> Arc<dyn ComponentRegistry>;

    /// 获取或创建在本作用域内共享的实例
    ///
    /// 返回实例以及它是否是本次新创建的。`create` 失败时不缓存任何内容。
    fn get_or_create_shared(
        &self,
        registration: RegistrationId,
        create: &mut SharedInstanceCreator<'_>,
    ) -> Result<(Instance, bool), DependencyError>;
}

/// 沿父链找到根作用域
pub fn root_scope(scope: &ScopeRef) -> ScopeRef {
    let mut current = scope.clone();
    while let Some(parent) = current.parent() {
        current = parent;
    }
    current
}

/// 从自身开始沿父链查找带指定标签的作用域
pub fn find_tagged_scope(scope: &ScopeRef, tag: &str) -> Option<ScopeRef> {
    let mut current = Some(scope.clone());
    while let Some(candidate) = current {
        if candidate.tag() == tag {
            return Some(candidate);
        }
        current = candidate.parent();
    }
    None
}

/// 实例共享方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstanceSharing {
    /// 每次激活都创建新实例
    None,
    /// 在目标作用域内共享同一实例
    Shared,
}

/// 组件生命周期类型
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Lifetime {
    /// 瞬时模式 - 每次请求都创建新实例
    #[default]
    Transient,
    /// 作用域模式 - 在同一作用域内共享实例
    Scoped,
    /// 单例模式 - 在根作用域内共享实例
    Singleton,
    /// 匹配作用域模式 - 在最近的带指定标签的作用域内共享实例
    PerMatchingScope(String),
}

impl Lifetime {
    /// 实例共享方式
    pub fn sharing(&self) -> InstanceSharing {
        match self {
            Self::Transient => InstanceSharing::None,
            Self::Scoped | Self::Singleton | Self::PerMatchingScope(_) => InstanceSharing::Shared,
        }
    }

    /// 根据最内层可见作用域选择实例归属的作用域
    pub fn find_scope(&self, most_nested: &ScopeRef) -> Result<ScopeRef, DependencyError> {
        match self {
            Self::Transient | Self::Scoped => Ok(most_nested.clone()),
            Self::Singleton => Ok(root_scope(most_nested)),
            Self::PerMatchingScope(tag) => {
                find_tagged_scope(most_nested, tag).ok_or_else(|| DependencyError::ScopeMismatch {
                    expected: tag.clone(),
                    actual: most_nested.tag().to_string(),
                })
            }
        }
    }
}
