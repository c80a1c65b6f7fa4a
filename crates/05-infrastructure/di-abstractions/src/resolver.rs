//! 组件解析上下文抽象接口
//!
//! 提供依赖解析和组件实例化的入口

use crate::parameter::Parameters;
use crate::registry::ComponentRegistry;
use crate::scope::ScopeRef;
use crate::service::ServiceKey;
use infrastructure_common::{DependencyError, TypeInfo};
use std::any::Any;
use std::sync::Arc;

/// 类型擦除后的组件实例
pub type Instance = Arc<dyn Any + Send + Sync>;

/// 组件解析上下文 trait
///
/// 容器、生命周期作用域和解析会话都实现此 trait。构造函数拿到的上下文就是
/// 当前解析会话本身，因此嵌套依赖会在同一个激活栈上解析。
pub trait ComponentContext {
    /// 当前上下文使用的组件注册表
    fn component_registry(&self) -> Arc<dyn ComponentRegistry>;

    /// 当前生命周期作用域
    fn current_scope(&self) -> ScopeRef;

    /// 尝试解析服务，未注册时返回 `Ok(None)`
    fn try_resolve_service(
        &self,
        service: &ServiceKey,
        parameters: &Parameters,
    ) -> Result<Option<Instance>, DependencyError>;

    /// 解析服务，未注册时返回 [`DependencyError::ComponentNotRegistered`]
    fn resolve_service(
        &self,
        service: &ServiceKey,
        parameters: &Parameters,
    ) -> Result<Instance, DependencyError> {
        self.try_resolve_service(service, parameters)?
            .ok_or_else(|| DependencyError::not_registered(service))
    }

    /// 检查服务是否已注册
    fn is_service_registered(&self, service: &ServiceKey) -> bool {
        self.component_registry().is_registered(service)
    }
}

/// 带类型的解析扩展
///
/// 对所有 [`ComponentContext`] 自动实现，包括 `dyn ComponentContext`。
pub trait ResolveExt: ComponentContext {
    /// 解析指定类型的组件
    fn resolve<T>(&self) -> Result<Arc<T>, DependencyError>
    where
        T: Send + Sync + 'static,
    {
        self.resolve_with(&Parameters::new())
    }

    /// 使用覆盖参数解析指定类型的组件
    fn resolve_with<T>(&self, parameters: &Parameters) -> Result<Arc<T>, DependencyError>
    where
        T: Send + Sync + 'static,
    {
        let service = ServiceKey::of::<T>();
        let instance = self.resolve_service(&service, parameters)?;
        downcast_instance(&service, instance)
    }

    /// 尝试解析指定类型的组件
    fn try_resolve<T>(&self) -> Result<Option<Arc<T>>, DependencyError>
    where
        T: Send + Sync + 'static,
    {
        let service = ServiceKey::of::<T>();
        self.try_resolve_service(&service, &Parameters::new())?
            .map(|instance| downcast_instance(&service, instance))
            .transpose()
    }

    /// 解析指定名称的组件
    fn resolve_named<T>(&self, name: &str) -> Result<Arc<T>, DependencyError>
    where
        T: Send + Sync + 'static,
    {
        let service = ServiceKey::named::<T>(name);
        let instance = self.resolve_service(&service, &Parameters::new())?;
        downcast_instance(&service, instance)
    }

    /// 尝试解析指定名称的组件
    fn try_resolve_named<T>(&self, name: &str) -> Result<Option<Arc<T>>, DependencyError>
    where
        T: Send + Sync + 'static,
    {
        let service = ServiceKey::named::<T>(name);
        self.try_resolve_service(&service, &Parameters::new())?
            .map(|instance| downcast_instance(&service, instance))
            .transpose()
    }

    /// 检查指定类型是否已注册
    fn is_registered<T>(&self) -> bool
    where
        T: ?Sized + 'static,
    {
        self.is_service_registered(&ServiceKey::of::<T>())
    }
}

impl<C: ComponentContext + ?Sized> ResolveExt for C {}

/// 将类型擦除的实例转换为具体类型
pub fn downcast_instance<T>(service: &ServiceKey, instance: Instance) -> Result<Arc<T>, DependencyError>
where
    T: Send + Sync + 'static,
{
    instance
        .downcast::<T>()
        .map_err(|_| DependencyError::TypeMismatch {
            service: service.description(),
            expected: TypeInfo::of::<T>().full_name.to_string(),
        })
}
