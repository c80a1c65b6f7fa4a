//! 激活帧与激活栈
//!
//! 激活栈记录当前会话中正在构造的组件，用于循环依赖检测和确定当前作用域。

use di_abstractions::{
    ComponentContext, ComponentRegistration, ConstructedInstance, Parameters, ScopeRef, ServiceKey,
};
use infrastructure_common::DependencyError;
use std::cell::RefCell;
use std::sync::Arc;

/// 依赖链分隔符
const CHAIN_SEPARATOR: &str = " -> ";

/// 一次正在进行的激活
#[derive(Debug, Clone)]
pub struct ActivationFrame {
    registration: Arc<dyn ComponentRegistration>,
    service: ServiceKey,
    scope: ScopeRef,
}

impl ActivationFrame {
    /// 创建激活帧，目标作用域在此时确定且之后不再改变
    pub(crate) fn new(
        registration: Arc<dyn ComponentRegistration>,
        service: ServiceKey,
        current_scope: &ScopeRef,
    ) -> Result<Self, DependencyError> {
        let scope = registration.find_scope(current_scope)?;
        Ok(Self {
            registration,
            service,
            scope,
        })
    }

    /// 请求的服务
    pub fn service(&self) -> &ServiceKey {
        &self.service
    }

    /// 实例归属的作用域
    pub fn scope(&self) -> &ScopeRef {
        &self.scope
    }

    /// 组件注册信息
    pub fn registration(&self) -> &Arc<dyn ComponentRegistration> {
        &self.registration
    }

    pub(crate) fn execute(
        &self,
        context: &dyn ComponentContext,
        parameters: &Parameters,
    ) -> Result<ConstructedInstance, DependencyError> {
        self.registration.construct(context, parameters, &self.scope)
    }
}

/// 激活栈
///
/// 同一服务键同一时刻最多出现一次。
#[derive(Debug, Default)]
pub struct ActivationStack {
    frames: Vec<ActivationFrame>,
}

impl ActivationStack {
    /// 创建空的激活栈
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    /// 压入激活帧
    pub fn push(&mut self, frame: ActivationFrame) {
        self.frames.push(frame);
    }

    /// 弹出栈顶帧
    pub fn pop(&mut self) -> Option<ActivationFrame> {
        self.frames.pop()
    }

    /// 栈深度
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// 是否没有正在进行的激活
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// 栈顶帧
    pub fn top(&self) -> Option<&ActivationFrame> {
        self.frames.last()
    }

    /// 服务是否正在构造中
    pub fn contains(&self, service: &ServiceKey) -> bool {
        self.frames.iter().any(|frame| frame.service == *service)
    }

    /// 从最外层到最内层列出请求的服务，最后追加新请求的服务
    pub fn dependency_chain_to(&self, service: &ServiceKey) -> String {
        self.frames
            .iter()
            .map(|frame| frame.service.description())
            .chain(std::iter::once(service.description()))
            .collect::<Vec<_>>()
            .join(CHAIN_SEPARATOR)
    }

    /// 从栈底到栈顶遍历
    pub fn iter(&self) -> impl Iterator<Item = &ActivationFrame> {
        self.frames.iter()
    }
}

/// 激活守卫
///
/// 构造时压栈，离开作用域时出栈，无论构造成功、失败还是 panic。
pub(crate) struct ActivationGuard<'a> {
    stack: &'a RefCell<ActivationStack>,
}

impl<'a> ActivationGuard<'a> {
    pub(crate) fn push(stack: &'a RefCell<ActivationStack>, frame: ActivationFrame) -> Self {
        stack.borrow_mut().push(frame);
        Self { stack }
    }
}

impl Drop for ActivationGuard<'_> {
    fn drop(&mut self) {
        self.stack.borrow_mut().pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registration::DelegateRegistration;
    use crate::registry::ComponentRegistryImpl;
    use crate::scope::LifetimeScopeImpl;
    use di_abstractions::Lifetime;

    struct A;
    struct B;
    struct C;

    fn frame_for<T: Send + Sync + 'static>(scope: &ScopeRef, make: fn() -> T) -> ActivationFrame {
        let registration = DelegateRegistration::builder(move |_, _| Ok(make())).build();
        ActivationFrame::new(registration, ServiceKey::of::<T>(), scope).unwrap()
    }

    fn root() -> ScopeRef {
        LifetimeScopeImpl::root(Arc::new(ComponentRegistryImpl::new()), "root").scope_ref()
    }

    #[test]
    fn test_membership_by_service_key() {
        let scope = root();
        let mut stack = ActivationStack::new();
        assert!(stack.is_empty());

        stack.push(frame_for(&scope, || A));
        stack.push(frame_for(&scope, || B));

        assert!(stack.contains(&ServiceKey::of::<A>()));
        assert!(stack.contains(&ServiceKey::of::<B>()));
        assert!(!stack.contains(&ServiceKey::of::<C>()));
        assert!(!stack.contains(&ServiceKey::named::<A>("other")));
        assert_eq!(stack.top().unwrap().service(), &ServiceKey::of::<B>());
    }

    #[test]
    fn test_chain_runs_bottom_to_top() {
        let scope = root();
        let mut stack = ActivationStack::new();
        stack.push(frame_for(&scope, || A));
        stack.push(frame_for(&scope, || B));
        stack.push(frame_for(&scope, || C));

        assert_eq!(stack.dependency_chain_to(&ServiceKey::of::<A>()), "A -> B -> C -> A");

        let order: Vec<_> = stack.iter().map(|frame| frame.service().description()).collect();
        assert_eq!(order, vec!["A", "B", "C"]);
        assert_eq!(stack.pop().unwrap().service(), &ServiceKey::of::<C>());
        assert_eq!(stack.len(), 2);
        assert_eq!(ActivationStack::new().dependency_chain_to(&ServiceKey::of::<A>()), "A");
    }

    #[test]
    fn test_guard_pops_on_early_exit() {
        let scope = root();
        let stack = RefCell::new(ActivationStack::new());

        let attempt = || -> Result<(), DependencyError> {
            let _guard = ActivationGuard::push(&stack, frame_for(&scope, || A));
            assert_eq!(stack.borrow().len(), 1);
            Err(DependencyError::not_registered("B"))
        };

        assert!(attempt().is_err());
        assert!(stack.borrow().is_empty());
    }

    #[test]
    fn test_frame_scope_chosen_by_registration() {
        let root_scope = LifetimeScopeImpl::root(Arc::new(ComponentRegistryImpl::new()), "root");
        let child = root_scope.begin_lifetime_scope().scope_ref();

        let singleton = DelegateRegistration::builder(|_, _| Ok(A))
            .lifetime(Lifetime::Singleton)
            .build();
        let frame = ActivationFrame::new(singleton, ServiceKey::of::<A>(), &child).unwrap();
        assert_eq!(frame.scope().id(), root_scope.id());

        let transient = DelegateRegistration::builder(|_, _| Ok(B)).build();
        let frame = ActivationFrame::new(transient, ServiceKey::of::<B>(), &child).unwrap();
        assert_eq!(frame.scope().id(), child.id());
    }
}
