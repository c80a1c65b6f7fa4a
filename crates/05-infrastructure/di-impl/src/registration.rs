//! 委托注册
//!
//! 用闭包构造组件实例的默认注册实现。

use di_abstractions::{
    ActivatedEvent, ComponentContext, ComponentRegistration, ConstructedInstance, Instance, InstanceSharing,
    Lifetime, Parameters, RegistrationId, ScopeRef, ServiceKey,
};
use infrastructure_common::{DependencyError, TypeInfo};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use uuid::Uuid;

/// 组件工厂函数类型
pub type ComponentFactoryFn =
    Arc<dyn Fn(&dyn ComponentContext, &Parameters) -> Result<Instance, DependencyError> + Send + Sync>;

type ActivatingHandler =
    Box<dyn Fn(&ActivatingEvent<'_>, Instance) -> Result<Instance, DependencyError> + Send + Sync>;

type ActivatedHandler = Box<dyn Fn(&ActivatedEvent<'_>) + Send + Sync>;

/// 构造后、返回前的激活事件
pub struct ActivatingEvent<'a> {
    /// 解析上下文
    pub context: &'a dyn ComponentContext,
    /// 激活参数
    pub parameters: &'a Parameters,
    /// 实例所在的作用域
    pub scope: &'a ScopeRef,
}

/// 委托注册
pub struct DelegateRegistration {
    id: RegistrationId,
    services: Vec<ServiceKey>,
    lifetime: Lifetime,
    limit_type: TypeInfo,
    factory: ComponentFactoryFn,
    activating: Vec<ActivatingHandler>,
    activated: Vec<ActivatedHandler>,
}

impl DelegateRegistration {
    /// 使用工厂闭包创建注册构建器
    pub fn builder<T, F>(factory: F) -> RegistrationBuilder<T>
    where
        T: Send + Sync + 'static,
        F: Fn(&dyn ComponentContext, &Parameters) -> Result<T, DependencyError> + Send + Sync + 'static,
    {
        RegistrationBuilder::new(Arc::new(move |context: &dyn ComponentContext, parameters: &Parameters| {
            factory(context, parameters).map(|value| Arc::new(value) as Instance)
        }))
    }

    /// 为已有实例创建单例注册构建器
    pub fn instance<T>(value: T) -> RegistrationBuilder<T>
    where
        T: Send + Sync + 'static,
    {
        let shared = Arc::new(value);
        RegistrationBuilder::<T>::new(Arc::new(move |_: &dyn ComponentContext, _: &Parameters| {
            Ok::<_, DependencyError>(shared.clone() as Instance)
        }))
        .single_instance()
    }

    /// 生命周期
    pub fn lifetime(&self) -> &Lifetime {
        &self.lifetime
    }

    /// 组件的具体类型
    pub fn limit_type(&self) -> &TypeInfo {
        &self.limit_type
    }

    fn activate(
        &self,
        context: &dyn ComponentContext,
        parameters: &Parameters,
        scope: &ScopeRef,
    ) -> Result<Instance, DependencyError> {
        let mut instance = (self.factory)(context, parameters)?;

        let event = ActivatingEvent {
            context,
            parameters,
            scope,
        };
        for handler in &self.activating {
            instance = handler(&event, instance)?;
        }
        Ok(instance)
    }
}

impl fmt::Debug for DelegateRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelegateRegistration")
            .field("id", &self.id)
            .field("services", &self.services)
            .field("lifetime", &self.lifetime)
            .field("limit_type", &self.limit_type.full_name)
            .field("factory", &"<function>")
            .field("activating", &self.activating.len())
            .field("activated", &self.activated.len())
            .finish()
    }
}

impl ComponentRegistration for DelegateRegistration {
    fn id(&self) -> RegistrationId {
        self.id
    }

    fn services(&self) -> &[ServiceKey] {
        &self.services
    }

    fn find_scope(&self, most_nested: &ScopeRef) -> Result<ScopeRef, DependencyError> {
        self.lifetime.find_scope(most_nested)
    }

    fn construct(
        &self,
        context: &dyn ComponentContext,
        parameters: &Parameters,
        target_scope: &ScopeRef,
    ) -> Result<ConstructedInstance, DependencyError> {
        match self.lifetime.sharing() {
            InstanceSharing::None => self
                .activate(context, parameters, target_scope)
                .map(ConstructedInstance::new),
            InstanceSharing::Shared => {
                let (instance, is_new) = target_scope
                    .get_or_create_shared(self.id, &mut || self.activate(context, parameters, target_scope))?;
                Ok(ConstructedInstance::shared(instance, is_new))
            }
        }
    }

    fn on_completed(&self, event: &ActivatedEvent<'_>) {
        for handler in &self.activated {
            handler(event);
        }
    }
}

/// 注册构建器
pub struct RegistrationBuilder<T> {
    services: Vec<ServiceKey>,
    lifetime: Lifetime,
    factory: ComponentFactoryFn,
    activating: Vec<ActivatingHandler>,
    activated: Vec<ActivatedHandler>,
    _component: PhantomData<fn() -> T>,
}

impl<T> RegistrationBuilder<T>
where
    T: Send + Sync + 'static,
{
    fn new(factory: ComponentFactoryFn) -> Self {
        Self {
            services: Vec::new(),
            lifetime: Lifetime::default(),
            factory,
            activating: Vec::new(),
            activated: Vec::new(),
            _component: PhantomData,
        }
    }

    /// 以组件自身类型暴露服务
    pub fn as_self(self) -> Self {
        self.as_service(ServiceKey::of::<T>())
    }

    /// 以命名服务暴露
    pub fn as_named(self, name: impl Into<String>) -> Self {
        self.as_service(ServiceKey::named::<T>(name))
    }

    /// 以指定服务键暴露
    pub fn as_service(mut self, service: ServiceKey) -> Self {
        if !self.services.contains(&service) {
            self.services.push(service);
        }
        self
    }

    /// 设置生命周期
    pub fn lifetime(mut self, lifetime: Lifetime) -> Self {
        self.lifetime = lifetime;
        self
    }

    /// 每次解析都创建新实例
    pub fn instance_per_dependency(self) -> Self {
        self.lifetime(Lifetime::Transient)
    }

    /// 在根作用域内共享
    pub fn single_instance(self) -> Self {
        self.lifetime(Lifetime::Singleton)
    }

    /// 在每个作用域内共享
    pub fn instance_per_lifetime_scope(self) -> Self {
        self.lifetime(Lifetime::Scoped)
    }

    /// 在最近的带指定标签的作用域内共享
    pub fn instance_per_matching_scope(self, tag: impl Into<String>) -> Self {
        self.lifetime(Lifetime::PerMatchingScope(tag.into()))
    }

    /// 构造完成后立即调用，可以替换实例
    pub fn on_activating<H>(mut self, handler: H) -> Self
    where
        H: Fn(&ActivatingEvent<'_>, Arc<T>) -> Result<Arc<T>, DependencyError> + Send + Sync + 'static,
    {
        self.activating.push(Box::new(move |event: &ActivatingEvent<'_>, instance: Instance| {
            let typed = instance.downcast::<T>().map_err(|_| DependencyError::TypeMismatch {
                service: TypeInfo::of::<T>().to_string(),
                expected: std::any::type_name::<T>().to_string(),
            })?;
            handler(event, typed).map(|replaced| replaced as Instance)
        }));
        self
    }

    /// 整个顶层解析成功结束后调用
    pub fn on_activated<H>(mut self, handler: H) -> Self
    where
        H: Fn(&ActivatedEvent<'_>, Arc<T>) + Send + Sync + 'static,
    {
        self.activated.push(Box::new(move |event: &ActivatedEvent<'_>| {
            if let Ok(typed) = event.instance.clone().downcast::<T>() {
                handler(event, typed);
            }
        }));
        self
    }

    /// 构建注册信息，未指定服务时以组件自身类型暴露
    pub fn build(self) -> Arc<DelegateRegistration> {
        let services = if self.services.is_empty() {
            vec![ServiceKey::of::<T>()]
        } else {
            self.services
        };

        Arc::new(DelegateRegistration {
            id: Uuid::new_v4(),
            services,
            lifetime: self.lifetime,
            limit_type: TypeInfo::of::<T>(),
            factory: self.factory,
            activating: self.activating,
            activated: self.activated,
        })
    }
}
