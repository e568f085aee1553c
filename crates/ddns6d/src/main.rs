// # ddns6d - IPv6 AAAA Sync Daemon
//
// Keeps one Alidns AAAA record pointed at the global IPv6 address of a
// local network interface.
//
// The daemon is a thin integration layer:
// 1. Read configuration from the environment (and `.env`)
// 2. Initialize logging and the runtime
// 3. Wire the interface address source and the Alidns repository into a
//    reconciler
// 4. Run the scheduler until SIGTERM/SIGINT
//
// All sync logic lives in ddns6-core.
//
// ## Configuration
//
// ### Required
// - `NETWORK_CARD_NAME`: interface to read the address from
// - `ACCESS_KEY_ID` / `ACCESS_KEY_SECRET`: Alidns credentials
// - `FULL_DOMAIN`: domain whose AAAA record is managed
//
// ### Optional
// - `DDNS_SYNC_INTERVAL_SECS`: seconds between passes (default 1)
// - `DDNS_PASS_TIMEOUT_SECS`: upper bound per pass, 0 disables (default 30)
// - `DDNS_PROVIDER_ENDPOINT`: Alidns endpoint URL
// - `DDNS_HTTP_TIMEOUT_SECS`: per-request timeout (default 10)
// - `DDNS_MODE`: `dry-run` to log mutations instead of sending them
// - `DDNS_LOG_LEVEL`: trace, debug, info, warn, error (default info)
// - `DDNS_SKIP_DOTENV`: set to ignore `.env`
//
// ## Example
//
// ```bash
// export NETWORK_CARD_NAME=eth0
// export ACCESS_KEY_ID=your_access_key_id
// export ACCESS_KEY_SECRET=your_access_key_secret
// export FULL_DOMAIN=home.example.com
//
// ddns6d
// ```

mod env;

use anyhow::Result;
use ddns6_core::{Reconciler, Scheduler, SchedulerReport};
use ddns6_ip_ifaddrs::InterfaceAddressSource;
use ddns6_provider_alidns::AlidnsRepository;
use env::{DaemonConfig, DotEnv};
use std::future::Future;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    let dotenv = if std::env::var_os(env::SKIP_DOTENV).is_some() {
        DotEnv::default()
    } else {
        match DotEnv::load(Path::new(".env")) {
            Ok(dotenv) => dotenv,
            Err(e) => {
                eprintln!("Configuration error: {:#}", e);
                return DdnsExitCode::ConfigError.into();
            }
        }
    };

    let config = match DaemonConfig::from_lookup(|key| dotenv.lookup(key)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    let subscriber = ddns6_core::logging::subscriber(config.log_level, std::io::stdout);
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    info!("Starting ddns6d {}", env!("CARGO_PKG_VERSION"));
    if !dotenv.is_empty() {
        info!("Loaded {} variable(s) from .env", dotenv.len());
    }
    info!(
        "Managing AAAA record {} ({} in {}) from interface {}, every {:?} [mode: {}]",
        config.sync.domain,
        config.sync.domain.host_label(),
        config.sync.domain.registrable_domain(),
        config.sync.interface,
        config.sync.scheduler.interval(),
        if config.sync.provider.dry_run { "DRY-RUN" } else { "LIVE" }
    );

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        match run_daemon(config).await {
            Ok(report) => {
                info!("ddns6d stopped after {} pass(es)", report.started);
                DdnsExitCode::CleanShutdown
            }
            Err(e) => {
                error!("Daemon error: {:#}", e);
                DdnsExitCode::RuntimeError
            }
        }
    });

    result.into()
}

/// Run the scheduler until a shutdown signal arrives
async fn run_daemon(config: DaemonConfig) -> Result<SchedulerReport> {
    let shutdown = shutdown_signal()?;

    let repository = AlidnsRepository::new(&config.sync.provider, config.sync.domain.clone())?;
    let source = InterfaceAddressSource::new(config.sync.interface.clone());

    let reconciler = Arc::new(Reconciler::new(
        Box::new(source),
        Box::new(repository),
        config.sync.domain.clone(),
    ));

    let scheduler = Scheduler::from_config(&config.sync.scheduler);
    let report = scheduler
        .run(
            move || {
                let reconciler = Arc::clone(&reconciler);
                async move { reconciler.try_reconcile().await }
            },
            shutdown,
        )
        .await;

    Ok(report)
}

/// Resolve on SIGTERM or SIGINT
///
/// Handlers are installed before the scheduler starts so an early signal is
/// not lost.
#[cfg(unix)]
fn shutdown_signal() -> Result<impl Future<Output = ()>> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    Ok(async move {
        let name = tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        };
        info!("Received shutdown signal: {}", name);
    })
}

/// Resolve on Ctrl-C
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
fn shutdown_signal() -> Result<impl Future<Output = ()>> {
    Ok(async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received shutdown signal: Ctrl-C"),
            Err(e) => error!("Failed to wait for Ctrl-C, shutting down: {}", e),
        }
    })
}
