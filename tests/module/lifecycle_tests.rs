//! Deployment and teardown tests
//!
//! Covers the silent skip of disabled modules, the single provider call per
//! deployment, spec equality between deploy and teardown, and the
//! channel-scoped context extension.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use peer_syscc::config::{NodeConfig, SharedConfig};
use peer_syscc::module::spec::{self, ExecutionEnvironment};
use peer_syscc::module::{
    ExecContext, InProcessRegistry, ManagerOptions, ModuleError, ModuleRegistry, ProviderError,
    SystemModuleDescriptor, SystemModuleManager, SystemModuleSet,
};

use super::test_utils::*;

#[tokio::test]
async fn test_disabled_module_deploy_is_noop() {
    let fixture = LifecycleFixture::new(whitelist(&[("escrow", "enable")]));

    fixture
        .manager
        .deploy("ch1", &descriptor("escrow", false))
        .await
        .unwrap();

    assert!(fixture.provider.calls().is_empty());
}

#[tokio::test]
async fn test_non_whitelisted_deploy_is_noop() {
    for value in ["disable", "false", "no", "", "maybe"] {
        let fixture = LifecycleFixture::new(whitelist(&[("config", value)]));
        fixture
            .manager
            .deploy("ch1", &descriptor("config", true))
            .await
            .unwrap();
        assert!(fixture.provider.calls().is_empty(), "value {:?}", value);
    }
}

#[tokio::test]
async fn test_deploy_whitelisted_module() {
    let fixture = LifecycleFixture::new(whitelist(&[("config", "true")]));
    let config = descriptor("config", true).with_init_args(vec![b"init".to_vec()]);

    fixture.manager.deploy("ch1", &config).await.unwrap();

    let executions = fixture.provider.executions();
    assert_eq!(executions.len(), 1);
    assert_eq!(fixture.provider.calls().len(), 1);

    let (ctx, cccid, spec) = &executions[0];
    assert_eq!(*ctx, ExecContext::Background);
    assert_eq!(spec.exec_env, ExecutionEnvironment::System);
    assert!(spec.code_package.is_empty());
    assert_eq!(spec.chaincode_spec.identity.name, "config");
    assert_eq!(spec.chaincode_spec.identity.path, "scc/config");
    assert_eq!(spec.chaincode_spec.input.args, vec![b"init".to_vec()]);

    assert_eq!(cccid.channel_id, "ch1");
    assert_eq!(cccid.name, "config");
    assert_eq!(cccid.version, TEST_VERSION);
    assert!(cccid.is_system);
    assert!(cccid.signed_proposal.is_none());
    assert!(uuid::Uuid::parse_str(&cccid.tx_id).is_ok());
}

#[tokio::test]
async fn test_each_deploy_uses_fresh_tx_id() {
    let fixture = LifecycleFixture::new(whitelist(&[("config", "true")]));
    let config = descriptor("config", true);

    fixture.manager.deploy("ch1", &config).await.unwrap();
    fixture.manager.deploy("ch2", &config).await.unwrap();

    let executions = fixture.provider.executions();
    assert_eq!(executions.len(), 2);
    assert_ne!(executions[0].1.tx_id, executions[1].1.tx_id);
    assert_eq!(executions[0].2, executions[1].2);
}

#[tokio::test]
async fn test_deploy_propagates_provider_error() {
    let fixture = LifecycleFixture::new(whitelist(&[("config", "true")]));
    let failure = ProviderError::InitRejected {
        status: 500,
        message: "bad init args".to_string(),
    };
    fixture.provider.fail_execute(failure.clone());

    let err = fixture
        .manager
        .deploy("ch1", &descriptor("config", true))
        .await
        .unwrap_err();

    match err {
        ModuleError::DeploymentFailed {
            name,
            channel,
            source,
        } => {
            assert_eq!(name, "config");
            assert_eq!(channel, "ch1");
            assert_eq!(source, failure);
        }
        other => panic!("unexpected error: {other}"),
    }
    // Not retried
    assert_eq!(fixture.provider.executions().len(), 1);
}

#[tokio::test]
async fn test_teardown_after_deploy_uses_equal_spec() {
    let fixture = LifecycleFixture::new(whitelist(&[("config", "true")]));
    let config = descriptor("config", true).with_init_args(vec![b"a".to_vec(), b"b".to_vec()]);

    fixture.manager.deploy("ch1", &config).await.unwrap();
    fixture.manager.teardown("ch1", &config).await.unwrap();

    let executions = fixture.provider.executions();
    let stops = fixture.provider.stops();
    assert_eq!(executions.len(), 1);
    assert_eq!(stops.len(), 1);

    let (_, deploy_cccid, deployed) = &executions[0];
    let (stop_ctx, stop_cccid, stopped) = &stops[0];
    assert_eq!(deployed, stopped);
    assert_eq!(deployed.to_bytes().unwrap(), stopped.to_bytes().unwrap());

    assert_eq!(*stop_ctx, ExecContext::Background);
    assert_eq!(stop_cccid.tx_id, "");
    assert_eq!(stop_cccid.channel_id, "ch1");
    assert_eq!(stop_cccid.version, deploy_cccid.version);
    assert!(stop_cccid.is_system);
}

#[tokio::test]
async fn test_teardown_ignores_whitelist() {
    let fixture = LifecycleFixture::new(whitelist(&[("escrow", "disable")]));

    fixture
        .manager
        .teardown("ch1", &descriptor("escrow", false))
        .await
        .unwrap();

    assert_eq!(fixture.provider.stops().len(), 1);
    assert!(fixture.provider.executions().is_empty());
}

#[tokio::test]
async fn test_teardown_propagates_provider_error() {
    let fixture = LifecycleFixture::new(whitelist(&[]));
    let failure = ProviderError::StopFailed("instance not running".to_string());
    fixture.provider.fail_stop(failure.clone());

    let err = fixture
        .manager
        .teardown("ch1", &descriptor("config", true))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ModuleError::TeardownFailed { ref source, .. } if *source == failure
    ));
}

#[tokio::test]
async fn test_whitelist_changes_apply_to_next_deploy() {
    let shared = SharedConfig::new(NodeConfig::default());
    let fixture = LifecycleFixture::new(shared.clone());
    let config = descriptor("config", true);

    fixture.manager.deploy("ch1", &config).await.unwrap();
    assert!(fixture.provider.executions().is_empty());

    shared.set("config", "enable");
    fixture.manager.deploy("ch1", &config).await.unwrap();
    assert_eq!(fixture.provider.executions().len(), 1);

    shared.set("config", "disable");
    fixture.manager.deploy("ch1", &config).await.unwrap();
    assert_eq!(fixture.provider.executions().len(), 1);
}

#[tokio::test]
async fn test_version_override() {
    let fixture = LifecycleFixture::build(
        MockRegistry::new(),
        whitelist(&[("config", "true")]),
        ManagerOptions {
            channel_scoped_context: false,
            system_module_version: Some("9.9.9".to_string()),
        },
    );
    let config = descriptor("config", true);

    fixture.manager.deploy("ch1", &config).await.unwrap();
    fixture.manager.teardown("ch1", &config).await.unwrap();

    assert_eq!(fixture.provider.executions()[0].1.version, "9.9.9");
    assert_eq!(fixture.provider.stops()[0].1.version, "9.9.9");
}

fn channel_scoped() -> ManagerOptions {
    ManagerOptions {
        channel_scoped_context: true,
        system_module_version: None,
    }
}

#[tokio::test]
async fn test_channel_scoped_context() {
    let fixture = LifecycleFixture::build(
        MockRegistry::new(),
        whitelist(&[("config", "true")]),
        channel_scoped(),
    );

    fixture
        .manager
        .deploy("ch1", &descriptor("config", true))
        .await
        .unwrap();

    let resolutions = fixture.provider.resolutions();
    assert_eq!(resolutions.len(), 1);
    let (channel, tx_id) = &resolutions[0];
    assert_eq!(channel, "ch1");

    let (ctx, cccid, _) = &fixture.provider.executions()[0];
    assert_eq!(&cccid.tx_id, tx_id);
    assert_eq!(
        *ctx,
        ExecContext::Channel {
            channel_id: "ch1".to_string(),
            tx_id: tx_id.clone(),
        }
    );
    assert_eq!(fixture.provider.simulators_done.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_channel_scoped_context_released_on_failure() {
    let fixture = LifecycleFixture::build(
        MockRegistry::new(),
        whitelist(&[("config", "true")]),
        channel_scoped(),
    );
    fixture
        .provider
        .fail_execute(ProviderError::ExecutionFailed("launch timeout".to_string()));

    let result = fixture
        .manager
        .deploy("ch1", &descriptor("config", true))
        .await;

    assert!(matches!(result, Err(ModuleError::DeploymentFailed { .. })));
    assert_eq!(fixture.provider.simulators_done.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_empty_channel_uses_background_context() {
    let fixture = LifecycleFixture::build(
        MockRegistry::new(),
        whitelist(&[("config", "true")]),
        channel_scoped(),
    );

    fixture
        .manager
        .deploy("", &descriptor("config", true))
        .await
        .unwrap();

    assert!(fixture.provider.resolutions().is_empty());
    assert_eq!(fixture.provider.executions()[0].0, ExecContext::Background);
}

#[tokio::test]
async fn test_context_resolution_failure_fails_deploy() {
    let fixture = LifecycleFixture::build(
        MockRegistry::new(),
        whitelist(&[("config", "true")]),
        channel_scoped(),
    );
    fixture
        .provider
        .fail_resolve(ProviderError::ContextUnavailable("ch9".to_string()));

    let err = fixture
        .manager
        .deploy("ch9", &descriptor("config", true))
        .await
        .unwrap_err();

    assert!(matches!(err, ModuleError::ContextResolution { ref channel, .. } if channel == "ch9"));
    assert!(fixture.provider.executions().is_empty());
}

#[tokio::test]
async fn test_deploy_all_stops_at_first_failure() {
    let fixture = LifecycleFixture::new(whitelist(&[
        ("cscc", "enable"),
        ("lscc", "enable"),
        ("qscc", "enable"),
    ]));
    fixture.provider.fail_module("lscc");
    let set = SystemModuleSet::new(vec![
        descriptor("cscc", true),
        descriptor("lscc", true),
        descriptor("qscc", true),
    ])
    .unwrap();

    let err = fixture.manager.deploy_all("ch1", &set).await.unwrap_err();

    assert!(matches!(err, ModuleError::DeploymentFailed { ref name, .. } if name == "lscc"));
    let names: Vec<String> = fixture
        .provider
        .executions()
        .into_iter()
        .map(|(_, cccid, _)| cccid.name)
        .collect();
    assert_eq!(names, vec!["cscc".to_string(), "lscc".to_string()]);
}

#[tokio::test]
async fn test_teardown_all_attempts_every_module() {
    let fixture = LifecycleFixture::new(whitelist(&[]));
    fixture
        .provider
        .fail_stop(ProviderError::StopFailed("gone".to_string()));
    let set = SystemModuleSet::new(vec![descriptor("cscc", true), descriptor("lscc", false)])
        .unwrap();

    let result = fixture.manager.teardown_all("ch1", &set).await;

    assert!(matches!(result, Err(ModuleError::TeardownFailed { ref name, .. }) if name == "cscc"));
    assert_eq!(fixture.provider.stops().len(), 2);
}

#[tokio::test]
async fn test_register_then_deploy_runs_module_init() {
    let registry = Arc::new(InProcessRegistry::new());
    let provider = Arc::new(MockProvider::with_registry(registry.clone()));
    let manager = SystemModuleManager::new(
        registry.clone(),
        provider.clone(),
        Arc::new(whitelist(&[("config", "enable"), ("escrow", "enable")])),
    );

    let code = Arc::new(RecordingChaincode::default());
    let config = SystemModuleDescriptor::new("config", "scc/config", code.clone())
        .with_init_args(vec![b"genesis".to_vec()]);
    let set = SystemModuleSet::new(vec![config.clone(), descriptor("escrow", false)]).unwrap();

    let report = manager.register_all(&set);
    assert_eq!(report.bound, vec!["config".to_string()]);
    assert!(registry.lookup("scc/escrow").is_none());

    manager.deploy_all("ch1", &set).await.unwrap();

    assert_eq!(code.init_count(), 1);
    assert_eq!(
        code.init_calls.lock().unwrap()[0],
        vec![b"genesis".to_vec()]
    );
    assert_eq!(provider.executions().len(), 1);
}

#[tokio::test]
async fn test_rejected_init_surfaces_as_deployment_error() {
    let registry = Arc::new(InProcessRegistry::new());
    let provider = Arc::new(MockProvider::with_registry(registry.clone()));
    let manager = SystemModuleManager::new(
        registry.clone(),
        provider,
        Arc::new(whitelist(&[("broken", "enable")])),
    );
    let broken = SystemModuleDescriptor::new(
        "broken",
        "scc/broken",
        Arc::new(RecordingChaincode::failing()),
    );

    manager.register_module(&broken).unwrap();
    let err = manager.deploy("ch1", &broken).await.unwrap_err();

    assert!(matches!(
        err,
        ModuleError::DeploymentFailed {
            source: ProviderError::InitRejected { status: 500, .. },
            ..
        }
    ));
}

#[test]
fn test_spec_rebuild_matches() {
    let config = descriptor("config", true).with_init_args(vec![vec![1, 2, 3]]);
    let first = spec::build_for(&config).unwrap();
    let second = spec::build_for(&config).unwrap();
    assert_eq!(first.to_bytes().unwrap(), second.to_bytes().unwrap());
    assert_eq!(first.fingerprint().unwrap(), second.fingerprint().unwrap());
}
