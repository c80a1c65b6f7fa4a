//! 生命周期作用域实现

use crate::container::ResolutionCounters;
use crate::operation::ResolveOperation;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use di_abstractions::{
    ComponentContext, ComponentRegistry, Instance, LifetimeScope, Parameters, RegistrationId, ScopeRef,
    ServiceKey, SharedInstanceCreator,
};
use infrastructure_common::DependencyError;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// 同一作用域树共享的设置
#[derive(Debug, Default)]
pub(crate) struct ScopeSettings {
    /// 是否为每次激活创建 span
    pub trace_activations: bool,
    /// 解析统计
    pub counters: Option<Arc<ResolutionCounters>>,
}

/// 作用域树中的节点
#[derive(Debug)]
struct ScopeNode {
    id: Uuid,
    tag: String,
    created_at: DateTime<Utc>,
    parent: Option<Arc<ScopeNode>>,
    registry: Arc<dyn ComponentRegistry>,
    /// 按注册ID缓存的共享实例
    shared_instances: DashMap<RegistrationId, Instance>,
    settings: Arc<ScopeSettings>,
}

impl LifetimeScope for ScopeNode {
    fn id(&self) -> Uuid {
        self.id
    }

    fn tag(&self) -> &str {
        &self.tag
    }

    fn parent(&self) -> Option<ScopeRef> {
        self.parent.clone().map(|parent| parent as ScopeRef)
    }

    fn component_registry(&self) -> Arc<dyn ComponentRegistry> {
        self.registry.clone()
    }

    fn get_or_create_shared(
        &self,
        registration: RegistrationId,
        create: &mut SharedInstanceCreator<'_>,
    ) -> Result<(Instance, bool), DependencyError> {
        let cached = self
            .shared_instances
            .get(&registration)
            .map(|entry| entry.value().clone());
        if let Some(instance) = cached {
            return Ok((instance, false));
        }

        // 构造期间不持有锁，构造逻辑可能会在同一作用域内解析其他共享组件
        let created = create()?;
        match self.shared_instances.entry(registration) {
            Entry::Occupied(existing) => Ok((existing.get().clone(), false)),
            Entry::Vacant(slot) => {
                slot.insert(created.clone());
                Ok((created, true))
            }
        }
    }
}

/// 生命周期作用域
///
/// 轻量句柄，克隆后指向同一个作用域。每次通过作用域解析都会创建一个新的
/// [`ResolveOperation`]。
#[derive(Debug, Clone)]
pub struct LifetimeScopeImpl {
    node: Arc<ScopeNode>,
}

impl LifetimeScopeImpl {
    /// 创建根作用域
    pub fn root(registry: Arc<dyn ComponentRegistry>, tag: impl Into<String>) -> Self {
        Self::root_with_settings(registry, tag, Arc::new(ScopeSettings::default()))
    }

    pub(crate) fn root_with_settings(
        registry: Arc<dyn ComponentRegistry>,
        tag: impl Into<String>,
        settings: Arc<ScopeSettings>,
    ) -> Self {
        Self::from_node(ScopeNode {
            id: Uuid::new_v4(),
            tag: tag.into(),
            created_at: Utc::now(),
            parent: None,
            registry,
            shared_instances: DashMap::new(),
            settings,
        })
    }

    fn from_node(node: ScopeNode) -> Self {
        debug!(
            "创建生命周期作用域: {} ({}), 创建于 {}",
            node.tag,
            node.id,
            node.created_at.to_rfc3339()
        );
        Self { node: Arc::new(node) }
    }

    /// 创建匿名子作用域
    pub fn begin_lifetime_scope(&self) -> Self {
        let id = Uuid::new_v4();
        self.begin_child(id, id.to_string())
    }

    /// 创建带标签的子作用域
    pub fn begin_tagged_lifetime_scope(&self, tag: impl Into<String>) -> Self {
        self.begin_child(Uuid::new_v4(), tag.into())
    }

    fn begin_child(&self, id: Uuid, tag: String) -> Self {
        Self::from_node(ScopeNode {
            id,
            tag,
            created_at: Utc::now(),
            parent: Some(self.node.clone()),
            registry: self.node.registry.clone(),
            shared_instances: DashMap::new(),
            settings: self.node.settings.clone(),
        })
    }

    /// 作用域ID
    pub fn id(&self) -> Uuid {
        self.node.id
    }

    /// 作用域标签
    pub fn tag(&self) -> &str {
        &self.node.tag
    }

    /// 创建时间
    pub fn created_at(&self) -> DateTime<Utc> {
        self.node.created_at
    }

    /// 父作用域
    pub fn parent(&self) -> Option<Self> {
        self.node.parent.clone().map(|node| Self { node })
    }

    /// 是否为根作用域
    pub fn is_root(&self) -> bool {
        self.node.parent.is_none()
    }

    /// 本作用域内缓存的共享实例数量
    pub fn shared_instance_count(&self) -> usize {
        self.node.shared_instances.len()
    }

    /// 作为 [`ScopeRef`] 使用
    pub fn scope_ref(&self) -> ScopeRef {
        self.node.clone()
    }

    /// 以本作用域为最内层作用域创建解析会话
    pub fn begin_resolve_operation(&self) -> ResolveOperation {
        ResolveOperation::new(self.scope_ref()).with_activation_tracing(self.node.settings.trace_activations)
    }
}

impl ComponentContext for LifetimeScopeImpl {
    fn component_registry(&self) -> Arc<dyn ComponentRegistry> {
        self.node.registry.clone()
    }

    fn current_scope(&self) -> ScopeRef {
        self.scope_ref()
    }

    fn try_resolve_service(
        &self,
        service: &ServiceKey,
        parameters: &Parameters,
    ) -> Result<Option<Instance>, DependencyError> {
        let outcome = self.begin_resolve_operation().try_resolve_service(service, parameters);
        if let Some(counters) = &self.node.settings.counters {
            counters.record(&outcome);
        }
        outcome
    }
}
