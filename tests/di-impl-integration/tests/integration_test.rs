//! 容器端到端集成测试

use di_abstractions::{ContainerConfig, Lifetime, ResolveExt};
use di_impl::{DelegateRegistration, DiContainer};
use infrastructure_common::DependencyError;
use parking_lot::Mutex;
use std::io::Write;
use std::sync::{Arc, Once};

static INIT_LOGGER: Once = Once::new();

/// 初始化测试日志系统（只初始化一次）
fn init_test_logger() {
    INIT_LOGGER.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("debug")
            .try_init()
            .ok();
    });
}

/// 应用级日志记录器
#[derive(Debug, Default)]
struct AuditLog {
    entries: Mutex<Vec<String>>,
}

impl AuditLog {
    fn record(&self, entry: impl Into<String>) {
        self.entries.lock().push(entry.into());
    }

    fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }
}

/// 每个请求一个
#[derive(Debug)]
struct RequestContext {
    scope_tag: String,
}

#[derive(Debug)]
struct OrderRepository {
    request: Arc<RequestContext>,
    audit: Arc<AuditLog>,
}

#[derive(Debug)]
struct PlaceOrderHandler {
    repository: Arc<OrderRepository>,
}

fn build_container(config: ContainerConfig) -> anyhow::Result<DiContainer> {
    init_test_logger();

    let container = DiContainer::builder()
        .with_config(config)
        .register(
            DelegateRegistration::builder(|_, _| Ok(AuditLog::default()))
                .single_instance()
                .on_activated(|_, audit| audit.record("audit log ready"))
                .build(),
        )
        .register(
            DelegateRegistration::builder(|context, _| {
                Ok(RequestContext {
                    scope_tag: context.current_scope().tag().to_string(),
                })
            })
            .instance_per_matching_scope("request")
            .build(),
        )
        .register_factory(Lifetime::Scoped, |context, _| {
            Ok(OrderRepository {
                request: context.resolve::<RequestContext>()?,
                audit: context.resolve::<AuditLog>()?,
            })
        })
        .register(
            DelegateRegistration::builder(|context, _| {
                Ok(PlaceOrderHandler {
                    repository: context.resolve::<OrderRepository>()?,
                })
            })
            .on_activated(|event, handler| {
                handler
                    .repository
                    .audit
                    .record(format!("handler ready in {}", event.scope.tag()));
            })
            .build(),
        )
        .build()?;

    Ok(container)
}

#[test]
fn test_container_from_config_file() -> anyhow::Result<()> {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
    writeln!(file, "root_scope_tag = \"application\"")?;
    writeln!(file, "trace_activations = true")?;

    let config = ContainerConfig::load(file.path())?;
    let container = build_container(config)?;

    assert_eq!(container.root_scope().tag(), "application");
    assert!(container.config().trace_activations);
    assert!(container.config().collect_stats);

    let audit = container.resolve::<AuditLog>()?;
    assert_eq!(audit.entries(), vec!["audit log ready"]);
    Ok(())
}

#[test]
fn test_request_scopes_isolate_state() -> anyhow::Result<()> {
    let container = build_container(ContainerConfig::default())?;
    let first_request = container.begin_tagged_lifetime_scope("request");
    let second_request = container.begin_tagged_lifetime_scope("request");

    let first = first_request.resolve::<PlaceOrderHandler>()?;
    let first_again = first_request.resolve::<PlaceOrderHandler>()?;
    let second = second_request.resolve::<PlaceOrderHandler>()?;

    // 处理器是瞬态的，仓储在请求内共享
    assert!(!Arc::ptr_eq(&first, &first_again));
    assert!(Arc::ptr_eq(&first.repository, &first_again.repository));
    assert!(!Arc::ptr_eq(&first.repository, &second.repository));
    assert!(!Arc::ptr_eq(&first.repository.request, &second.repository.request));
    assert!(Arc::ptr_eq(&first.repository.audit, &second.repository.audit));
    assert_eq!(first.repository.request.scope_tag, "request");

    assert_eq!(
        first.repository.audit.entries(),
        vec![
            "audit log ready",
            "handler ready in request",
            "handler ready in request",
            "handler ready in request",
        ]
    );
    Ok(())
}

#[test]
fn test_nested_unit_of_work_shares_request_context() -> anyhow::Result<()> {
    let container = build_container(ContainerConfig::default())?;
    let request = container.begin_tagged_lifetime_scope("request");
    let unit_of_work = request.begin_lifetime_scope();

    let outer = request.resolve::<OrderRepository>()?;
    let inner = unit_of_work.resolve::<OrderRepository>()?;

    assert!(!Arc::ptr_eq(&outer, &inner));
    assert!(Arc::ptr_eq(&outer.request, &inner.request));
    assert_eq!(request.shared_instance_count(), 2);
    assert_eq!(unit_of_work.shared_instance_count(), 1);
    Ok(())
}

#[test]
fn test_request_component_outside_request_fails() -> anyhow::Result<()> {
    let container = build_container(ContainerConfig::default())?;

    let error = container.resolve::<PlaceOrderHandler>().unwrap_err();
    match error {
        DependencyError::ScopeMismatch { expected, actual } => {
            assert_eq!(expected, "request");
            assert_eq!(actual, "root");
        }
        other => panic!("unexpected error: {other}"),
    }

    // 失败的解析不会留下任何共享实例
    assert_eq!(container.root_scope().shared_instance_count(), 0);
    Ok(())
}

#[test]
fn test_concurrent_singleton_resolution() -> anyhow::Result<()> {
    let container = build_container(ContainerConfig::default())?;

    let resolved: Vec<Arc<AuditLog>> = std::thread::scope(|threads| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let container = container.clone();
                threads.spawn(move || container.resolve::<AuditLog>())
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("resolver thread panicked"))
            .collect::<Result<_, _>>()
    })?;

    assert!(resolved.iter().all(|audit| Arc::ptr_eq(audit, &resolved[0])));
    assert_eq!(container.root_scope().shared_instance_count(), 1);
    assert_eq!(container.stats().successful_resolutions, 8);
    Ok(())
}

#[test]
fn test_stats_snapshot_serializes() -> anyhow::Result<()> {
    let container = build_container(ContainerConfig::default())?;
    let request = container.begin_tagged_lifetime_scope("request");

    request.resolve::<PlaceOrderHandler>()?;
    assert!(container.try_resolve::<String>()?.is_none());
    assert!(container.resolve::<OrderRepository>().is_err());

    let stats = serde_json::to_value(container.stats())?;
    assert_eq!(stats["registered_components"], 4);
    assert_eq!(stats["resolve_requests"], 3);
    assert_eq!(stats["successful_resolutions"], 1);
    assert_eq!(stats["not_registered"], 1);
    assert_eq!(stats["resolution_errors"], 1);
    assert_eq!(stats["circular_dependencies"], 0);
    Ok(())
}
