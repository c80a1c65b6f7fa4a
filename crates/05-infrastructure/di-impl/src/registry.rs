//! 组件注册表实现

use di_abstractions::{ComponentRegistration, ComponentRegistry, ServiceKey};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// 组件注册表实现
///
/// 同一服务有多个注册时，最后注册的作为默认值。
#[derive(Debug, Default)]
pub struct ComponentRegistryImpl {
    /// 服务到注册信息的映射，按注册顺序排列
    services: RwLock<HashMap<ServiceKey, Vec<Arc<dyn ComponentRegistration>>>>,
    /// 所有注册信息
    registrations: RwLock<Vec<Arc<dyn ComponentRegistration>>>,
}

impl ComponentRegistryImpl {
    /// 创建新的组件注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册组件
    pub fn register(&self, registration: Arc<dyn ComponentRegistration>) {
        let mut services = self.services.write();
        for service in registration.services() {
            info!("注册组件: {}", service);
            services
                .entry(service.clone())
                .or_default()
                .push(registration.clone());
        }
        self.registrations.write().push(registration);
    }

    /// 已注册组件数量
    pub fn len(&self) -> usize {
        self.registrations.read().len()
    }

    /// 是否没有任何注册
    pub fn is_empty(&self) -> bool {
        self.registrations.read().is_empty()
    }
}

impl ComponentRegistry for ComponentRegistryImpl {
    fn registration_for(&self, service: &ServiceKey) -> Option<Arc<dyn ComponentRegistration>> {
        self.services
            .read()
            .get(service)
            .and_then(|registrations| registrations.last().cloned())
    }

    fn registrations_for(&self, service: &ServiceKey) -> Vec<Arc<dyn ComponentRegistration>> {
        self.services
            .read()
            .get(service)
            .cloned()
            .unwrap_or_default()
    }

    fn registrations(&self) -> Vec<Arc<dyn ComponentRegistration>> {
        self.registrations.read().clone()
    }
}
