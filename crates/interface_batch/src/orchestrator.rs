//! Batch orchestration
//!
//! Evaluates a list of claim cases on a bounded worker pool:
//!
//! ```text
//! cases ──dispatch (pacing)──> semaphore permit ──> spawn: gateway.decide ──> DecisionRecord
//!               ▲                                                                  │
//!        cancel (watch) stops new dispatches; in-flight tasks finish ─> BatchReport┘
//! ```
//!
//! The engine itself is pure; run ids and timestamps are only attached here.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;
use tracing::{error, info, instrument, warn};

use core_kernel::RunId;
use domain_adjudication::{Decision, DecisionEngine, VerificationGateway};
use crate::config::BatchConfig;
use crate::error::BatchError;
use crate::grading::{ExpectedAnswer, Grade, GradingSummary};
use crate::loader::ClaimCase;

/// A decision stamped with the run that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub run_id: RunId,
    pub decided_at: DateTime<Utc>,
    /// Name of the case the decision was made for
    pub case: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<ExpectedAnswer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<Grade>,
    pub decision: Decision,
}

impl DecisionRecord {
    fn new(run_id: RunId, case: ClaimCase, decision: Decision) -> Self {
        let grade = case.expected.map(|expected| expected.grade(decision.outcome));
        if grade == Some(Grade::Mismatch) {
            info!(
                case = %case.name,
                outcome = %decision.outcome,
                justification = %decision.justification(),
                "decision differs from expected answer"
            );
        }
        Self {
            run_id,
            decided_at: Utc::now(),
            case: case.name,
            expected: case.expected,
            grade,
            decision,
        }
    }
}

/// Result of a batch run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub run_id: RunId,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Number of cases handed to the run
    pub submitted: usize,
    /// True when the run stopped dispatching before every case was decided
    pub cancelled: bool,
    pub summary: GradingSummary,
    /// Records in input order
    pub records: Vec<DecisionRecord>,
}

impl BatchReport {
    pub fn decided(&self) -> usize {
        self.records.len()
    }

    /// Writes the report as pretty-printed JSON, creating parent directories
    pub fn write_json(&self, path: &Path) -> Result<(), BatchError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| BatchError::io(parent, e))?;
        }
        let json =
            serde_json::to_string_pretty(self).map_err(|e| BatchError::Report(e.to_string()))?;
        std::fs::write(path, json).map_err(|e| BatchError::io(path, e))
    }
}

/// Runs claim cases through the decision engine
#[derive(Debug, Clone)]
pub struct BatchRunner {
    engine: Arc<DecisionEngine>,
    gateway: VerificationGateway,
    concurrency: usize,
    pacing: Duration,
}

impl BatchRunner {
    /// A sequential runner without pacing
    pub fn new(engine: Arc<DecisionEngine>, gateway: VerificationGateway) -> Self {
        Self {
            engine,
            gateway,
            concurrency: 1,
            pacing: Duration::ZERO,
        }
    }

    pub fn from_config(
        config: &BatchConfig,
        engine: Arc<DecisionEngine>,
        gateway: VerificationGateway,
    ) -> Self {
        Self::new(engine, gateway)
            .with_concurrency(config.concurrency)
            .with_pacing(config.pacing())
    }

    /// Maximum number of claims in flight; at least one
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Pause between two dispatches
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Decides every case until done or cancelled
    ///
    /// Once `cancel` turns true no further case is dispatched; cases already
    /// running are awaited and reported.
    #[instrument(skip_all, fields(cases = cases.len(), concurrency = self.concurrency))]
    pub async fn run(
        &self,
        cases: Vec<ClaimCase>,
        mut cancel: watch::Receiver<bool>,
    ) -> BatchReport {
        let run_id = RunId::new_v7();
        let started_at = Utc::now();
        let submitted = cases.len();
        info!(%run_id, "batch run started");

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();
        let mut cancelled = false;

        for (index, case) in cases.into_iter().enumerate() {
            if *cancel.borrow_and_update() {
                cancelled = true;
                break;
            }

            if index > 0 && !self.pacing.is_zero() {
                tokio::select! {
                    _ = tokio::time::sleep(self.pacing) => {}
                    _ = cancellation(&mut cancel) => {
                        cancelled = true;
                        break;
                    }
                }
            }

            let permit = tokio::select! {
                permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
                _ = cancellation(&mut cancel) => {
                    cancelled = true;
                    break;
                }
            };

            let engine = Arc::clone(&self.engine);
            let gateway = self.gateway.clone();
            tasks.spawn(async move {
                let _permit = permit;
                let decision = gateway.decide(&engine, &case.bundle).await;
                (index, DecisionRecord::new(run_id, case, decision))
            });
        }

        if cancelled {
            warn!(
                %run_id,
                in_flight = tasks.len(),
                "batch cancelled, waiting for in-flight claims"
            );
        }

        let mut decided = Vec::with_capacity(submitted);
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(record) => decided.push(record),
                Err(e) => error!(%run_id, error = %e, "claim evaluation task failed"),
            }
        }
        decided.sort_by_key(|(index, _)| *index);
        let records: Vec<DecisionRecord> = decided.into_iter().map(|(_, record)| record).collect();

        let mut summary = GradingSummary::default();
        for record in &records {
            summary.record(record.decision.outcome, record.grade);
        }

        info!(
            %run_id,
            decided = records.len(),
            cancelled,
            accuracy = %summary.accuracy(),
            "batch run finished"
        );

        BatchReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            submitted,
            cancelled,
            summary,
            records,
        }
    }
}

/// Resolves once the flag is raised; never resolves if the sender is gone
async fn cancellation(cancel: &mut watch::Receiver<bool>) {
    loop {
        if *cancel.borrow_and_update() {
            return;
        }
        if cancel.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
