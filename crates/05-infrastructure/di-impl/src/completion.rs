//! 完成批次
//!
//! 收集构造成功但尚未触发完成回调的激活，等最外层解析返回前统一触发。

use crate::activation::ActivationFrame;
use di_abstractions::{ActivatedEvent, ComponentContext, ConstructedInstance, Instance, Parameters};
use tracing::trace;

/// 构造成功的激活
#[derive(Debug)]
pub struct CompletedActivation {
    frame: ActivationFrame,
    instance: Instance,
    is_new: bool,
    parameters: Parameters,
}

impl CompletedActivation {
    pub(crate) fn new(frame: ActivationFrame, constructed: &ConstructedInstance, parameters: &Parameters) -> Self {
        Self {
            frame,
            instance: constructed.instance.clone(),
            is_new: constructed.is_new,
            parameters: parameters.clone(),
        }
    }

    /// 对应的激活帧
    pub fn frame(&self) -> &ActivationFrame {
        &self.frame
    }

    /// 触发完成回调；命中缓存的共享实例不会重复通知
    pub(crate) fn complete(&self, context: &dyn ComponentContext) {
        if !self.is_new {
            trace!("跳过共享实例的完成回调: {}", self.frame.service());
            return;
        }

        trace!("触发完成回调: {}", self.frame.service());
        let event = ActivatedEvent {
            context,
            service: self.frame.service(),
            scope: self.frame.scope(),
            parameters: &self.parameters,
            instance: &self.instance,
        };
        self.frame.registration().on_completed(&event);
    }
}

/// 完成批次
#[derive(Debug, Default)]
pub struct CompletionBatch {
    activations: Vec<CompletedActivation>,
}

impl CompletionBatch {
    /// 创建空批次
    pub fn new() -> Self {
        Self {
            activations: Vec::new(),
        }
    }

    /// 记录一次构造成功的激活
    pub fn push(&mut self, activation: CompletedActivation) {
        self.activations.push(activation);
    }

    /// 批次中的激活数量
    pub fn len(&self) -> usize {
        self.activations.len()
    }

    /// 批次是否为空
    pub fn is_empty(&self) -> bool {
        self.activations.is_empty()
    }

    /// 丢弃未触发的激活
    pub fn reset(&mut self) {
        self.activations.clear();
    }

    /// 取走已收集的激活，留下一个空批次
    pub fn take(&mut self) -> Vec<CompletedActivation> {
        std::mem::take(&mut self.activations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registration::DelegateRegistration;
    use crate::registry::ComponentRegistryImpl;
    use crate::scope::LifetimeScopeImpl;
    use di_abstractions::ServiceKey;
    use parking_lot::Mutex;
    use std::sync::Arc;

    struct Widget;

    fn completed(scope: &LifetimeScopeImpl, log: &Arc<Mutex<Vec<String>>>, label: &str, is_new: bool) -> CompletedActivation {
        let log = log.clone();
        let label = label.to_string();
        let registration = DelegateRegistration::builder(|_, _| Ok(Widget))
            .on_activated(move |_event, _widget: Arc<Widget>| log.lock().push(label.clone()))
            .build();
        let frame = ActivationFrame::new(registration, ServiceKey::of::<Widget>(), &scope.scope_ref()).unwrap();
        let constructed = ConstructedInstance::shared(Arc::new(Widget), is_new);
        CompletedActivation::new(frame, &constructed, &Parameters::new())
    }

    #[test]
    fn test_take_swaps_in_empty_batch() {
        let scope = LifetimeScopeImpl::root(Arc::new(ComponentRegistryImpl::new()), "root");
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut batch = CompletionBatch::new();
        batch.push(completed(&scope, &log, "first", true));
        batch.push(completed(&scope, &log, "second", true));

        let drained = batch.take();
        assert_eq!(drained.len(), 2);
        assert!(batch.is_empty());

        for activation in &drained {
            activation.complete(&scope);
        }
        assert_eq!(*log.lock(), vec!["first", "second"]);
    }

    #[test]
    fn test_cached_shared_instance_not_notified() {
        let scope = LifetimeScopeImpl::root(Arc::new(ComponentRegistryImpl::new()), "root");
        let log = Arc::new(Mutex::new(Vec::new()));

        completed(&scope, &log, "cached", false).complete(&scope);
        assert!(log.lock().is_empty());
    }

    #[test]
    fn test_reset_discards_pending() {
        let scope = LifetimeScopeImpl::root(Arc::new(ComponentRegistryImpl::new()), "root");
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut batch = CompletionBatch::new();
        batch.push(completed(&scope, &log, "stale", true));

        batch.reset();
        assert!(batch.take().is_empty());
        assert!(log.lock().is_empty());
    }
}
