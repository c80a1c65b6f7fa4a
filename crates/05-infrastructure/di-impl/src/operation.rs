//! 解析会话
//!
//! 一次外部发起的解析请求对应一个 [`ResolveOperation`]。它持有激活栈和完成批次，
//! 并把自身作为解析上下文交给构造逻辑，嵌套依赖在同一个会话中解析。

use crate::activation::{ActivationFrame, ActivationGuard, ActivationStack};
use crate::completion::{CompletedActivation, CompletionBatch};
use di_abstractions::{
    ComponentContext, ComponentRegistration, ComponentRegistry, Instance, Parameters, ScopeRef, ServiceKey,
};
use infrastructure_common::DependencyError;
use std::cell::RefCell;
use std::sync::Arc;
use tracing::{debug, debug_span, trace, warn};

/// 解析会话
///
/// 只能在创建它的调用中使用，不可跨线程共享。
#[derive(Debug)]
pub struct ResolveOperation {
    /// 发起解析的最内层作用域
    most_nested_scope: ScopeRef,
    /// 组件注册表
    registry: Arc<dyn ComponentRegistry>,
    /// 激活栈
    activations: RefCell<ActivationStack>,
    /// 完成批次
    completed: RefCell<CompletionBatch>,
    /// 是否为每次激活创建 span
    trace_activations: bool,
}

impl ResolveOperation {
    /// 使用作用域自身的注册表创建会话
    pub fn new(most_nested_scope: ScopeRef) -> Self {
        let registry = most_nested_scope.component_registry();
        Self::with_registry(most_nested_scope, registry)
    }

    fn with_registry(most_nested_scope: ScopeRef, registry: Arc<dyn ComponentRegistry>) -> Self {
        Self {
            most_nested_scope,
            registry,
            activations: RefCell::new(ActivationStack::new()),
            completed: RefCell::new(CompletionBatch::new()),
            trace_activations: false,
        }
    }

    /// 设置是否跟踪激活
    pub fn with_activation_tracing(mut self, enabled: bool) -> Self {
        self.trace_activations = enabled;
        self
    }

    /// 解析服务，未注册时返回错误
    pub fn execute(&self, service: &ServiceKey, parameters: &Parameters) -> Result<Instance, DependencyError> {
        self.resolve_service(service, parameters)
    }

    /// 当前正在进行的激活数量
    pub fn activation_depth(&self) -> usize {
        self.activations.borrow().len()
    }

    /// 等待触发完成回调的激活数量
    pub fn pending_completions(&self) -> usize {
        self.completed.borrow().len()
    }

    /// 当前激活作用域：栈顶帧的作用域，栈为空时为会话的最内层作用域
    fn current_activation_scope(&self) -> ScopeRef {
        self.activations
            .borrow()
            .top()
            .map_or_else(|| self.most_nested_scope.clone(), |frame| frame.scope().clone())
    }

    fn create_frame(
        &self,
        registration: Arc<dyn ComponentRegistration>,
        service: &ServiceKey,
    ) -> Result<ActivationFrame, DependencyError> {
        {
            let activations = self.activations.borrow();
            if activations.contains(service) {
                let dependency_chain = activations.dependency_chain_to(service);
                warn!("检测到循环依赖: {}", dependency_chain);
                return Err(DependencyError::CircularDependency { dependency_chain });
            }

            if activations.is_empty() {
                // 最外层调用，丢弃上一次失败解析遗留的激活
                self.completed.borrow_mut().reset();
            }
        }

        ActivationFrame::new(registration, service.clone(), &self.current_activation_scope())
    }

    fn activate(&self, frame: ActivationFrame, parameters: &Parameters) -> Result<Instance, DependencyError> {
        let _span = self
            .trace_activations
            .then(|| debug_span!("activation", service = %frame.service(), scope = frame.scope().tag()).entered());

        let _guard = ActivationGuard::push(&self.activations, frame.clone());
        debug!("激活组件: {} (作用域: {})", frame.service(), frame.scope().tag());

        let constructed = frame.execute(self, parameters).map_err(|e| {
            debug!("组件 {} 构造失败: {}", frame.service(), e);
            e
        })?;

        let instance = constructed.instance.clone();
        self.completed
            .borrow_mut()
            .push(CompletedActivation::new(frame, &constructed, parameters));
        Ok(instance)
    }

    /// 激活栈回到空时触发批次中的所有完成回调
    fn complete_activations(&self) {
        if !self.activations.borrow().is_empty() {
            return;
        }

        let completed = self.completed.borrow_mut().take();
        if completed.is_empty() {
            return;
        }

        debug!("触发 {} 个完成回调", completed.len());
        for activation in &completed {
            activation.complete(self);
        }
    }
}

impl ComponentContext for ResolveOperation {
    fn component_registry(&self) -> Arc<dyn ComponentRegistry> {
        self.registry.clone()
    }

    fn current_scope(&self) -> ScopeRef {
        self.current_activation_scope()
    }

    fn try_resolve_service(
        &self,
        service: &ServiceKey,
        parameters: &Parameters,
    ) -> Result<Option<Instance>, DependencyError> {
        let Some(registration) = self.registry.registration_for(service) else {
            trace!("服务未注册: {}", service);
            return Ok(None);
        };

        let frame = self.create_frame(registration, service)?;
        let instance = self.activate(frame, parameters)?;
        self.complete_activations();

        Ok(Some(instance))
    }
}
