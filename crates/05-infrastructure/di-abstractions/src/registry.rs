//! 组件注册表抽象接口

use crate::parameter::Parameters;
use crate::resolver::{ComponentContext, Instance};
use crate::scope::ScopeRef;
use crate::service::ServiceKey;
use infrastructure_common::DependencyError;
use std::fmt;
use std::sync::Arc;

/// 组件注册ID
pub type RegistrationId = uuid::Uuid;

/// 组件注册表 trait
///
/// 解析引擎只读取注册表，从不修改它。
pub trait ComponentRegistry: Send + Sync + fmt::Debug {
    /// 查找服务的默认注册信息
    fn registration_for(&self, service: &ServiceKey) -> Option<Arc<dyn ComponentRegistration>>;

    /// 查找服务的所有注册信息，按注册顺序排列
    fn registrations_for(&self, service: &ServiceKey) -> Vec<Arc<dyn ComponentRegistration>>;

    /// 获取所有注册信息
    fn registrations(&self) -> Vec<Arc<dyn ComponentRegistration>>;

    /// 检查服务是否已注册
    fn is_registered(&self, service: &ServiceKey) -> bool {
        self.registration_for(service).is_some()
    }
}

/// 组件注册信息 trait
///
/// 负责选择实例归属的作用域、构造实例以及接收"构造完成"通知。
pub trait ComponentRegistration: Send + Sync + fmt::Debug {
    /// 注册ID
    fn id(&self) -> RegistrationId;

    /// 此注册提供的服务
    fn services(&self) -> &[ServiceKey];

    /// 根据当前作用域选择实例归属的作用域
    fn find_scope(&self, most_nested: &ScopeRef) -> Result<ScopeRef, DependencyError>;

    /// 构造实例
    ///
    /// `context` 是当前解析会话，构造逻辑通过它解析自身的依赖。
    fn construct(
        &self,
        context: &dyn ComponentContext,
        parameters: &Parameters,
        target_scope: &ScopeRef,
    ) -> Result<ConstructedInstance, DependencyError>;

    /// 整个顶层解析成功结束后调用
    fn on_completed(&self, event: &ActivatedEvent<'_>);
}

/// 构造结果
#[derive(Debug, Clone)]
pub struct ConstructedInstance {
    /// 实例
    pub instance: Instance,
    /// 是否为本次新建（共享实例命中缓存时为 false）
    pub is_new: bool,
}

impl ConstructedInstance {
    /// 新建的实例
    pub fn new(instance: Instance) -> Self {
        Self {
            instance,
            is_new: true,
        }
    }

    /// 从作用域缓存取得的共享实例
    pub fn shared(instance: Instance, is_new: bool) -> Self {
        Self { instance, is_new }
    }
}

/// 构造完成事件
pub struct ActivatedEvent<'a> {
    /// 解析上下文，完成回调可以继续解析其他组件
    pub context: &'a dyn ComponentContext,
    /// 请求的服务
    pub service: &'a ServiceKey,
    /// 实例所在的作用域
    pub scope: &'a ScopeRef,
    /// 激活时使用的参数
    pub parameters: &'a Parameters,
    /// 构造出的实例
    pub instance: &'a Instance,
}

impl fmt::Debug for ActivatedEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivatedEvent")
            .field("service", &self.service)
            .field("scope", &self.scope.tag())
            .field("parameters", &self.parameters.len())
            .field("context", &"<context>")
            .finish()
    }
}
