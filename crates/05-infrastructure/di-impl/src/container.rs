//! 依赖注入容器

use crate::registration::DelegateRegistration;
use crate::registry::ComponentRegistryImpl;
use crate::scope::{LifetimeScopeImpl, ScopeSettings};
use di_abstractions::{
    ComponentContext, ComponentRegistration, ComponentRegistry, ContainerConfig, ContainerStats, Instance,
    Lifetime, Parameters, ScopeRef, ServiceKey,
};
use infrastructure_common::{ConfigResult, DependencyError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

/// 顶层解析计数
#[derive(Debug, Default)]
pub(crate) struct ResolutionCounters {
    resolve_requests: AtomicU64,
    successful_resolutions: AtomicU64,
    not_registered: AtomicU64,
    resolution_errors: AtomicU64,
    circular_dependencies: AtomicU64,
}

impl ResolutionCounters {
    pub(crate) fn record(&self, outcome: &Result<Option<Instance>, DependencyError>) {
        self.resolve_requests.fetch_add(1, Ordering::Relaxed);
        match outcome {
            Ok(Some(_)) => {
                self.successful_resolutions.fetch_add(1, Ordering::Relaxed);
            }
            Ok(None) => {
                self.not_registered.fetch_add(1, Ordering::Relaxed);
            }
            Err(error) => {
                self.resolution_errors.fetch_add(1, Ordering::Relaxed);
                if error.is_circular_dependency() {
                    self.circular_dependencies.fetch_add(1, Ordering::Relaxed);
                }
            }
        }
    }

    fn snapshot(&self, registered_components: usize) -> ContainerStats {
        ContainerStats {
            registered_components,
            resolve_requests: self.resolve_requests.load(Ordering::Relaxed),
            successful_resolutions: self.successful_resolutions.load(Ordering::Relaxed),
            not_registered: self.not_registered.load(Ordering::Relaxed),
            resolution_errors: self.resolution_errors.load(Ordering::Relaxed),
            circular_dependencies: self.circular_dependencies.load(Ordering::Relaxed),
        }
    }
}

/// 容器构建器
#[derive(Debug, Default)]
pub struct DiContainerBuilder {
    registry: ComponentRegistryImpl,
    config: ContainerConfig,
}

impl DiContainerBuilder {
    /// 创建新的构建器
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置容器配置
    pub fn with_config(mut self, config: ContainerConfig) -> Self {
        self.config = config;
        self
    }

    /// 注册组件
    pub fn register(self, registration: Arc<dyn ComponentRegistration>) -> Self {
        self.registry.register(registration);
        self
    }

    /// 使用工厂闭包注册组件
    pub fn register_factory<T, F>(self, lifetime: Lifetime, factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&dyn ComponentContext, &Parameters) -> Result<T, DependencyError> + Send + Sync + 'static,
    {
        self.register(DelegateRegistration::builder(factory).lifetime(lifetime).build())
    }

    /// 注册单例实例
    pub fn register_instance<T>(self, instance: T) -> Self
    where
        T: Send + Sync + 'static,
    {
        self.register(DelegateRegistration::instance(instance).build())
    }

    /// 构建容器
    pub fn build(self) -> ConfigResult<DiContainer> {
        self.config.validate()?;

        let registered_components = self.registry.len();
        let counters = self
            .config
            .collect_stats
            .then(|| Arc::new(ResolutionCounters::default()));
        let settings = Arc::new(ScopeSettings {
            trace_activations: self.config.trace_activations,
            counters: counters.clone(),
        });

        let registry = Arc::new(self.registry);
        let root = LifetimeScopeImpl::root_with_settings(
            registry.clone(),
            self.config.root_scope_tag.clone(),
            settings,
        );

        info!("构建容器完成，注册了 {} 个组件", registered_components);
        Ok(DiContainer {
            registry,
            root,
            config: self.config,
            counters,
        })
    }
}

/// 依赖注入容器
///
/// 持有组件注册表和根作用域，所有解析都从根作用域或其子作用域发起。
#[derive(Debug, Clone)]
pub struct DiContainer {
    registry: Arc<ComponentRegistryImpl>,
    root: LifetimeScopeImpl,
    config: ContainerConfig,
    counters: Option<Arc<ResolutionCounters>>,
}

impl DiContainer {
    /// 创建构建器
    pub fn builder() -> DiContainerBuilder {
        DiContainerBuilder::new()
    }

    /// 根作用域
    pub fn root_scope(&self) -> &LifetimeScopeImpl {
        &self.root
    }

    /// 创建匿名子作用域
    pub fn begin_lifetime_scope(&self) -> LifetimeScopeImpl {
        self.root.begin_lifetime_scope()
    }

    /// 创建带标签的子作用域
    pub fn begin_tagged_lifetime_scope(&self, tag: impl Into<String>) -> LifetimeScopeImpl {
        self.root.begin_tagged_lifetime_scope(tag)
    }

    /// 容器配置
    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// 组件注册表
    pub fn registry(&self) -> &Arc<ComponentRegistryImpl> {
        &self.registry
    }

    /// 统计信息快照，未启用统计时只包含注册数量
    pub fn stats(&self) -> ContainerStats {
        let registered_components = self.registry.len();
        self.counters.as_ref().map_or_else(
            || ContainerStats {
                registered_components,
                ..ContainerStats::default()
            },
            |counters| counters.snapshot(registered_components),
        )
    }
}

impl ComponentContext for DiContainer {
    fn component_registry(&self) -> Arc<dyn ComponentRegistry> {
        self.registry.clone()
    }

    fn current_scope(&self) -> ScopeRef {
        self.root.scope_ref()
    }

    fn try_resolve_service(
        &self,
        service: &ServiceKey,
        parameters: &Parameters,
    ) -> Result<Option<Instance>, DependencyError> {
        self.root.try_resolve_service(service, parameters)
    }
}
