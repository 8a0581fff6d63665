//! CFSR Claims Engine - Batch Binary
//!
//! Decides every claim case in a directory and writes a JSON report.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin claims-batch
//!
//! # Run with environment variables
//! CLAIMS_INPUT_DIR=benchmark CLAIMS_CONCURRENCY=8 cargo run --bin claims-batch
//! ```
//!
//! # Environment Variables
//!
//! * `CLAIMS_INPUT_DIR` - Directory of JSON case files (default: claims)
//! * `CLAIMS_OUTPUT_PATH` - Report path (default: results/decisions.json)
//! * `CLAIMS_CONCURRENCY` - Claims evaluated at once, 1-64 (default: 4)
//! * `CLAIMS_PACING_MS` - Pause between dispatches (default: 0)
//! * `CLAIMS_ORACLE_TIMEOUT_MS` - Facility lookup timeout (default: 5000)
//! * `CLAIMS_FACILITY_REGISTRY_PATH` - JSON facility registry; facility checks are off without it
//! * `CLAIMS_CLAUSE_SET_PATH` - Clause set document (default: embedded CFSR v1)
//! * `CLAIMS_DISTANT_TRAVEL_DAYS` - Days past submission before travel counts as distant (default: 180)
//! * `CLAIMS_TIMEZONE` - Jurisdiction for cases that name none (default: UTC)
//! * `CLAIMS_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use domain_adjudication::VerificationGateway;
use domain_policy::PolicyClauseSet;
use interface_batch::{BatchConfig, BatchRunner, CaseLoader, RegistryOracle};

/// Main entry point for the batch run.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration is invalid
/// - The clause set or facility registry cannot be loaded
/// - The input directory cannot be read or the report cannot be written
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = BatchConfig::load().context("loading CLAIMS_* configuration")?;

    init_tracing(&config.log_level);

    tracing::info!(
        input_dir = %config.input_dir.display(),
        concurrency = config.concurrency,
        pacing_ms = config.pacing_ms,
        distant_travel_days = config.distant_travel_days,
        "Starting CFSR claims batch"
    );

    let clause_set = match &config.clause_set_path {
        Some(path) => PolicyClauseSet::from_file(path)?,
        None => PolicyClauseSet::cfsr_default()?,
    };
    let engine = Arc::new(config.decision_engine(Arc::new(clause_set))?);

    let gateway = match &config.facility_registry_path {
        Some(path) => {
            let registry = RegistryOracle::from_file(path)?;
            VerificationGateway::new(Arc::new(registry), config.oracle_timeout())
        }
        None => {
            tracing::info!("No facility registry configured, facility checks disabled");
            VerificationGateway::disabled()
        }
    };

    let cases = CaseLoader::new(config.jurisdiction()?)
        .load_dir(&config.input_dir)
        .with_context(|| format!("loading cases from {}", config.input_dir.display()))?;

    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = cancel_tx.send(true);
    });

    let report = BatchRunner::from_config(&config, engine, gateway)
        .run(cases, cancel_rx)
        .await;

    report
        .write_json(&config.output_path)
        .with_context(|| format!("writing report to {}", config.output_path.display()))?;

    println!("Run {}: {}", report.run_id, report.summary);
    if report.cancelled {
        println!(
            "Cancelled after {} of {} claims",
            report.decided(),
            report.submitted
        );
    }
    println!("Report written to {}", config.output_path.display());

    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Waits for Ctrl+C or SIGTERM.
///
/// In-flight claims still finish; only new dispatches stop.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, finishing in-flight claims");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, finishing in-flight claims");
        }
    }
}
