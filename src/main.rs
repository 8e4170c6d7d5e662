use anyhow::{Context, Result};
use clap::Parser;
use rigctl_core::{AlgorithmType, ConnectionType, PowerManagement, SetResult};
use rigctl_rs::adapters::{
    FixedExchangeRates, LoggingMinerSupervisor, LoggingPowerManagement, LoggingStatsReporter,
    PrintNavigator,
};
use rigctl_rs::config::{Args, Command, Config};
use rigctl_rs::logging::{init_logging, LogConfig};
use rigctl_rs::mining::{SessionHooks, TickFn};
use rigctl_rs::store::TomlConfigStore;
use rigctl_rs::stratum::StratumLocations;
use rigctl_rs::validation::RigCredentialValidator;
use rigctl_rs::{ApplicationState, Collaborators, StateError};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, trace};

#[tokio::main]
async fn main() -> Result<()> {
    // 解析命令行参数
    let args = Args::parse();

    // 加载配置
    let mut config = Config::load_or_default(&args.config)?;
    config.apply_environment_overrides();
    if let Some(settings) = &args.settings {
        config.general.settings_file = PathBuf::from(settings);
    }

    // 初始化日志系统，命令行参数优先
    let _log_guard = init_logging(LogConfig {
        level: args.effective_log_level(&config.general),
        file_path: config
            .general
            .log_file
            .as_ref()
            .map(|path| path.display().to_string()),
        ..LogConfig::default()
    })?;

    debug!("Configuration loaded from: {}", args.config);

    let state = build_state(&config)?;
    state.bus().subscribe_fn(|event| {
        debug!("State event: {}", event.event_type());
    });

    match args.command {
        Command::Show => show(&state),
        Command::SetAddress { value, skip_reset } => {
            report("payout address", state.set_payout_address(value.trim(), skip_reset))
        }
        Command::SetWorker { value, skip_reset } => {
            report("worker name", state.set_worker_name(value.trim(), skip_reset))
        }
        Command::SetGroup { value, skip_reset } => {
            report("rig group", state.set_rig_group(value.trim(), skip_reset))
        }
        Command::SetLocation { index } => {
            match state.set_location_if_valid_or_different(index) {
                SetResult::Invalid => anyhow::bail!(
                    "Service location {} is out of range, reset to {}",
                    index,
                    state.service_location()
                ),
                result => {
                    println!("service location: {}", result);
                    Ok(())
                }
            }
        }
        Command::Url { algorithm, ssl } => {
            let algorithm = algorithm
                .parse::<AlgorithmType>()
                .map_err(|_| StateError::UnknownAlgorithm { name: algorithm.clone() })?;
            let connection = if ssl {
                ConnectionType::StratumSsl
            } else {
                ConnectionType::StratumTcp
            };
            println!("{}", state.resolve_location_url(algorithm, connection)?);
            Ok(())
        }
        Command::Run { demo } => run(&state, demo).await,
    }
}

fn build_state(config: &Config) -> Result<ApplicationState> {
    let store = TomlConfigStore::open(&config.general.settings_file).with_context(|| {
        format!(
            "Failed to open settings file: {}",
            config.general.settings_file.display()
        )
    })?;
    debug!("Settings stored in {}", store.path().display());

    let collaborators = Collaborators {
        store: Arc::new(store),
        validator: Arc::new(RigCredentialValidator::mainnet()),
        directory: Arc::new(StratumLocations::from_config(&config.service)),
        rates: Arc::new(FixedExchangeRates::from_config(&config.exchange)),
        reporter: Arc::new(LoggingStatsReporter),
        supervisor: Arc::new(LoggingMinerSupervisor::default()),
        navigator: Arc::new(PrintNavigator),
    };

    let power: Arc<dyn PowerManagement> = Arc::new(LoggingPowerManagement);
    let stats_tick: TickFn = Arc::new(|| trace!("Polling miner statistics"));
    let device_tick: TickFn = Arc::new(|| trace!("Checking device health"));
    let hooks = SessionHooks::with_intervals(
        tokio::runtime::Handle::current(),
        &config.session,
        power,
        stats_tick,
        device_tick,
    );

    Ok(ApplicationState::new(collaborators, hooks, &config.version)?)
}

fn show(state: &ApplicationState) -> Result<()> {
    let credentials = state.current_credentials();
    let location = state.service_location();

    println!("{}{}", rigctl_rs::NAME, state.title());
    println!("payout address: {}", credentials.payout_address);
    println!("worker name:    {}", credentials.worker_name);
    println!("rig group:      {}", credentials.rig_group);
    println!("validity:       {}", state.credential_validity());
    println!(
        "location:       {} ({})",
        location,
        state
            .locations()
            .location_name()
            .unwrap_or_else(|| "unknown".to_string())
    );
    Ok(())
}

fn report(what: &str, result: SetResult) -> Result<()> {
    match result {
        SetResult::Invalid => anyhow::bail!("Invalid {}", what),
        result => {
            println!("{}: {}", what, result);
            Ok(())
        }
    }
}

async fn run(state: &ApplicationState, demo: bool) -> Result<()> {
    if !state.can_start(demo) {
        anyhow::bail!(
            "Credentials are {}, fix them or pass --demo",
            state.credential_validity()
        );
    }

    state.reset_downstream_credentials();
    state.start_mining();
    info!("🚀 Mining session running, press Ctrl-C to stop");

    tokio::signal::ctrl_c()
        .await
        .context("Error waiting for shutdown signal")?;
    info!("🛑 Received shutdown signal");

    state.stop_mining();
    info!("👋 Mining stopped gracefully");
    Ok(())
}
