//! 应用状态集成测试
//!
//! 使用真实的校验器、地域目录和 TOML 存储，外部服务用 mock 代替。

use rigctl_core::{
    AlgorithmType, ConfigStore, ConnectionType, CredentialValidity, MockMinerSupervisor,
    MockNavigator, MockPeriodicTask, MockPowerManagement, MockStatsReporter, PeriodicTask,
    SetResult, StateEvent,
};
use rigctl_rs::adapters::FixedExchangeRates;
use rigctl_rs::config::{Config, VersionConfig};
use rigctl_rs::mining::SessionHooks;
use rigctl_rs::store::TomlConfigStore;
use rigctl_rs::stratum::StratumLocations;
use rigctl_rs::validation::RigCredentialValidator;
use rigctl_rs::{ApplicationState, Collaborators, NotificationBus};
use std::path::Path;
use std::sync::{Arc, Mutex};

const GENESIS_ADDRESS: &str = "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa";
const P2SH_ADDRESS: &str = "3J98t1WpEZ73CNmQviecrnyiWrnqRhWNLy";

fn counting_task(starts: usize) -> Arc<dyn PeriodicTask> {
    let mut task = MockPeriodicTask::new();
    task.expect_start().times(starts).return_const(());
    task.expect_stop().return_const(());
    task.expect_is_running().return_const(false);
    Arc::new(task)
}

fn hooks(starts: usize) -> SessionHooks {
    let mut power = MockPowerManagement::new();
    power.expect_allow_sleep().return_const(());
    power.expect_prevent_sleep().return_const(());
    SessionHooks {
        stats_poll: counting_task(starts),
        device_poll: counting_task(starts),
        sleep_guard: counting_task(starts),
        power: Arc::new(power),
    }
}

fn version_config(local: &str, qualifier: &str) -> VersionConfig {
    VersionConfig {
        local_version: Some(local.to_string()),
        prerelease_qualifier: qualifier.to_string(),
        ..VersionConfig::default()
    }
}

struct Harness {
    state: ApplicationState,
    store: Arc<TomlConfigStore>,
    events: Arc<Mutex<Vec<StateEvent>>>,
}

fn harness(
    settings_path: &Path,
    reporter: MockStatsReporter,
    supervisor: MockMinerSupervisor,
    hooks: SessionHooks,
) -> Harness {
    let config = Config::default();
    let store = Arc::new(TomlConfigStore::open(settings_path).unwrap());

    let collaborators = Collaborators {
        store: store.clone(),
        validator: Arc::new(RigCredentialValidator::mainnet()),
        directory: Arc::new(StratumLocations::from_config(&config.service)),
        rates: Arc::new(FixedExchangeRates::new(20_000.0, 0.5, "EUR")),
        reporter: Arc::new(reporter),
        supervisor: Arc::new(supervisor),
        navigator: Arc::new(MockNavigator::new()),
    };

    let bus = Arc::new(NotificationBus::new());
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    bus.subscribe_fn(move |event| sink.lock().unwrap().push(event.clone()));

    let state =
        ApplicationState::with_bus(collaborators, hooks, &version_config("1.2.0", "Alpha"), bus)
            .unwrap();

    Harness {
        state,
        store,
        events,
    }
}

fn quiet_reporter() -> MockStatsReporter {
    let mut reporter = MockStatsReporter::new();
    reporter.expect_set_credentials().times(0);
    reporter
}

fn quiet_supervisor() -> MockMinerSupervisor {
    let mut supervisor = MockMinerSupervisor::new();
    supervisor.expect_restart_miners().times(0);
    supervisor
}

#[test]
fn test_fresh_state_has_invalid_credentials() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness(
        &dir.path().join("settings.toml"),
        quiet_reporter(),
        quiet_supervisor(),
        hooks(0),
    );

    assert_eq!(h.state.payout_address(), "");
    // 空矿工名有效，空地址无效
    assert_eq!(h.state.credential_validity(), CredentialValidity::INVALID_BTC);
    assert!(!h.state.can_start(false));
    assert!(h.state.can_start(true));
}

#[test]
fn test_credentials_persist_and_push_once_valid() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");

    let mut reporter = MockStatsReporter::new();
    reporter
        .expect_set_credentials()
        .withf(|address, worker, group| {
            address == GENESIS_ADDRESS && worker == "rig01" && group.is_empty()
        })
        .times(1)
        .return_const(());

    let h = harness(&path, reporter, quiet_supervisor(), hooks(0));

    // 矿工名先写入，但地址仍无效，不推送
    assert_eq!(h.state.set_worker_name("rig01", false), SetResult::Changed);
    assert_eq!(h.state.set_payout_address("garbage", false), SetResult::Invalid);
    assert_eq!(h.state.set_payout_address(GENESIS_ADDRESS, false), SetResult::Changed);
    assert_eq!(h.state.set_payout_address(GENESIS_ADDRESS, false), SetResult::NoChange);
    assert!(h.state.can_start(false));

    let reopened = TomlConfigStore::open(&path).unwrap();
    assert_eq!(
        reopened.credential(rigctl_core::CredentialField::PayoutAddress),
        GENESIS_ADDRESS
    );
    assert_eq!(
        reopened.credential(rigctl_core::CredentialField::WorkerName),
        "rig01"
    );

    assert_eq!(
        *h.events.lock().unwrap(),
        vec![
            StateEvent::WorkerNameChanged {
                name: "rig01".to_string()
            },
            StateEvent::PayoutAddressChanged {
                address: GENESIS_ADDRESS.to_string()
            },
        ]
    );
}

#[test]
fn test_restart_while_running() {
    let dir = tempfile::tempdir().unwrap();

    let mut supervisor = MockMinerSupervisor::new();
    supervisor.expect_restart_miners().times(1).return_const(());

    let h = harness(
        &dir.path().join("settings.toml"),
        MockStatsReporter::new(),
        supervisor,
        hooks(1),
    );

    assert_eq!(h.state.set_payout_address(GENESIS_ADDRESS, true), SetResult::Changed);
    assert!(h.state.start_mining());
    assert!(!h.state.start_mining());
    assert_eq!(h.state.set_payout_address(P2SH_ADDRESS, true), SetResult::Changed);
    assert_eq!(h.state.set_rig_group("attic", true), SetResult::Changed);
    assert!(h.state.stop_mining());
    assert!(!h.state.is_currently_mining());

    // 停止后不再重启
    assert_eq!(h.state.set_worker_name("rig02", true), SetResult::Changed);
}

#[test]
fn test_service_location_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");
    let h = harness(&path, quiet_reporter(), quiet_supervisor(), hooks(0));

    assert_eq!(h.state.set_location_if_valid_or_different(0), SetResult::NoChange);
    assert_eq!(h.state.set_location_if_valid_or_different(1), SetResult::Changed);
    assert_eq!(
        h.state
            .resolve_location_url(AlgorithmType::DaggerHashimoto, ConnectionType::StratumTcp)
            .unwrap(),
        "stratum+tcp://daggerhashimoto.usa.nicehash.com:3353"
    );

    assert_eq!(h.state.set_location_if_valid_or_different(42), SetResult::Invalid);
    assert_eq!(h.state.service_location(), 0);
    assert_eq!(TomlConfigStore::open(&path).unwrap().service_location(), 0);
    assert_eq!(h.store.service_location(), 0);

    assert_eq!(
        *h.events.lock().unwrap(),
        vec![
            StateEvent::ServiceLocationChanged { index: 1 },
            StateEvent::ServiceLocationChanged { index: 0 },
        ]
    );
}

#[test]
fn test_version_and_balance_reports() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness(
        &dir.path().join("settings.toml"),
        quiet_reporter(),
        quiet_supervisor(),
        hooks(0),
    );

    assert_eq!(h.state.title(), " v1.2.0 - Alpha");
    assert!(h.state.on_version_reported("1.2.0"));
    assert!(!h.state.on_version_reported("1.1.9"));

    h.state.on_balance_reported(0.05);
    assert_eq!(h.state.balance().fiat_balance(), (500.0, "EUR".to_string()));

    let events = h.events.lock().unwrap();
    assert_eq!(events.len(), 3);
    assert!(matches!(events[0], StateEvent::VersionAvailable { .. }));
    assert_eq!(events[1], StateEvent::BalanceUpdated { btc: 0.05 });
    assert_eq!(
        events[2],
        StateEvent::FiatBalanceUpdated {
            amount: 500.0,
            symbol: "EUR".to_string()
        }
    );
}

#[tokio::test]
async fn test_async_consumer_receives_events() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness(
        &dir.path().join("settings.toml"),
        quiet_reporter(),
        quiet_supervisor(),
        hooks(1),
    );

    let mut receiver = h.state.bus().channel();
    h.state.start_mining();

    assert_eq!(receiver.recv().await.unwrap(), StateEvent::MiningStarted);
}
