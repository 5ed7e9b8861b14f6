//! Run coordination: probe, compute, cross validate or fall back, persist.
//!
//! ```text
//! Idle ─▶ Probing ─┬─▶ Validating ────┐
//!                  ├─▶ SinglePrecise ─┼─▶ Done
//!                  └─▶ Failsafe ──────┘
//! ```
//!
//! Every registered backend whose probe answers `true` is computed on tokio's blocking
//! pool. All attempts start together and share one deadline; an attempt that errors,
//! panics or misses the deadline is journaled and otherwise ignored. The first two
//! successes in registration order are cross validated; a single success is returned
//! as is; without any success the [`Failsafe`] answers.
//!
//! A run only fails when the cross validation precondition is broken, which would mean
//! a backend returned a result for another instant than the one requested.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use camino::Utf8PathBuf;
use hifitime::Epoch;
use serde::Serialize;
use tokio::time::{timeout_at, Instant};

use crate::{
    backend::{
        failsafe::Failsafe, horizon_backend::HorizonBackend, naif_backend::NaifBackend,
        PositionBackend,
    },
    config::{BackendKind, EngineConfig},
    constants::DEFAULT_BACKEND_TIMEOUT_SECS,
    cross_validation::{cross_validate, ConsistencyReport},
    ephem_errors::EphemError,
    ephemeris::{EngineId, EphemerisResult},
    journal::{RunEvent, RunJournal},
    probe::BackendProbe,
    snapshot::{EphemerisSnapshot, Precision, SnapshotWriter},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunState {
    Idle,
    Probing,
    Validating,
    SinglePrecise,
    Failsafe,
    Done,
}

/// What a run produced.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    CrossValidated {
        first: EphemerisResult,
        second: EphemerisResult,
        report: ConsistencyReport,
    },
    SinglePrecise(EphemerisResult),
    Failsafe(EphemerisResult),
}

impl RunOutcome {
    /// Result of the highest priority backend that answered.
    pub fn primary(&self) -> &EphemerisResult {
        match self {
            RunOutcome::CrossValidated { first, .. } => first,
            RunOutcome::SinglePrecise(result) | RunOutcome::Failsafe(result) => result,
        }
    }

    pub fn precision(&self) -> Precision {
        match self {
            RunOutcome::CrossValidated { .. } => Precision::CrossValidated,
            RunOutcome::SinglePrecise(_) => Precision::Single,
            RunOutcome::Failsafe(_) => Precision::Reduced,
        }
    }

    /// `multi` when cross validated, otherwise the engine of the only result.
    pub fn engine(&self) -> EngineId {
        match self {
            RunOutcome::CrossValidated { .. } => EngineId::multi(),
            RunOutcome::SinglePrecise(result) | RunOutcome::Failsafe(result) => {
                result.engine().clone()
            }
        }
    }

    pub fn consistency(&self) -> Option<&ConsistencyReport> {
        match self {
            RunOutcome::CrossValidated { report, .. } => Some(report),
            _ => None,
        }
    }

    pub fn into_snapshot(self) -> EphemerisSnapshot {
        match self {
            RunOutcome::CrossValidated {
                first,
                second,
                report,
            } => EphemerisSnapshot::cross_validated(first, second, report),
            RunOutcome::SinglePrecise(result) | RunOutcome::Failsafe(result) => {
                EphemerisSnapshot::single(result)
            }
        }
    }
}

/// Availability of one registered backend, as reported by `senkron probe`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackendStatus {
    pub engine: EngineId,
    pub available: bool,
    pub detail: String,
}

struct BackendSlot {
    probe: Arc<dyn BackendProbe>,
    backend: Arc<dyn PositionBackend>,
}

pub struct EphemerisOrchestrator {
    slots: Vec<BackendSlot>,
    failsafe: Failsafe,
    journal: Arc<dyn RunJournal>,
    timeout: Duration,
    state: Mutex<RunState>,
}

impl EphemerisOrchestrator {
    /// Orchestrator without precise backend: every run ends in the failsafe until
    /// [`with_backend`](Self::with_backend) registers one.
    pub fn new(failsafe: Failsafe, journal: Arc<dyn RunJournal>) -> Self {
        EphemerisOrchestrator {
            slots: Vec::new(),
            failsafe,
            journal,
            timeout: Duration::from_secs(DEFAULT_BACKEND_TIMEOUT_SECS),
            state: Mutex::new(RunState::Idle),
        }
    }

    /// Register a backend after the ones already registered (lower priority).
    pub fn with_backend(
        mut self,
        probe: Arc<dyn BackendProbe>,
        backend: Arc<dyn PositionBackend>,
    ) -> Self {
        self.slots.push(BackendSlot { probe, backend });
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the JPL backends listed in `config`, in order, each behind a
    /// [`KernelProbe`](crate::probe::KernelProbe) over the ephemeris directory.
    pub fn from_config(
        config: &EngineConfig,
        journal: Arc<dyn RunJournal>,
    ) -> Result<Self, EphemError> {
        let bodies = config.body_set.bodies();
        let mut orchestrator = EphemerisOrchestrator::new(Failsafe::new(config.body_set), journal)
            .with_timeout(config.backend_timeout()?);

        for kind in &config.backends {
            let probe = config.probe(*kind);
            let backend: Arc<dyn PositionBackend> = match kind {
                BackendKind::Horizon => Arc::new(HorizonBackend::new(probe.clone(), bodies)),
                BackendKind::Naif => Arc::new(NaifBackend::new(probe.clone(), bodies)),
            };
            orchestrator = orchestrator.with_backend(Arc::new(probe), backend);
        }
        Ok(orchestrator)
    }

    /// State reached by the last (or current) run.
    pub fn state(&self) -> RunState {
        *self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn transition(&self, next: RunState) {
        *self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = next;
        self.journal.record(&RunEvent::StateChanged(next));
    }

    /// Probe every registered backend without computing anything.
    pub fn probe_backends(&self) -> Vec<BackendStatus> {
        self.slots
            .iter()
            .map(|slot| BackendStatus {
                engine: slot.backend.engine_id(),
                available: slot.probe.is_available(),
                detail: slot.probe.describe(),
            })
            .collect()
    }

    /// Attempt every available backend concurrently and keep the successes, in
    /// registration order.
    async fn attempt_backends(&self, instant: Epoch) -> Vec<EphemerisResult> {
        let deadline = Instant::now() + self.timeout;
        let mut attempts = Vec::with_capacity(self.slots.len());

        for slot in &self.slots {
            let engine = slot.backend.engine_id();
            if !slot.probe.is_available() {
                self.journal.record(&RunEvent::BackendUnavailable {
                    engine,
                    detail: slot.probe.describe(),
                });
                continue;
            }
            let backend = Arc::clone(&slot.backend);
            let handle = tokio::task::spawn_blocking(move || backend.compute(instant));
            attempts.push((engine, handle));
        }

        let mut successes = Vec::with_capacity(attempts.len());
        for (engine, handle) in attempts {
            let attempt = match timeout_at(deadline, handle).await {
                Ok(Ok(computed)) => computed,
                Ok(Err(join_error)) if join_error.is_panic() => {
                    Err(EphemError::compute(engine.as_str(), "backend panicked"))
                }
                Ok(Err(join_error)) => Err(EphemError::compute(engine.as_str(), join_error)),
                Err(_elapsed) => Err(EphemError::BackendTimeout {
                    engine: engine.to_string(),
                    seconds: self.timeout.as_secs_f64(),
                }),
            };

            match attempt {
                Ok(result) => {
                    self.journal.record(&RunEvent::BackendSucceeded {
                        engine: result.engine().clone(),
                        bodies: result.len(),
                    });
                    successes.push(result);
                }
                Err(error) => self.journal.record(&RunEvent::BackendFailed {
                    engine,
                    error: error.to_string(),
                }),
            }
        }
        successes
    }

    /// Produce the best available result for `instant`.
    ///
    /// Return
    /// ----------
    /// * The outcome; backend failures never surface here.
    /// * [`EphemError::ValidationPrecondition`] if two successful results disagree on
    ///   their timestamp.
    pub async fn run(&self, instant: Epoch) -> Result<RunOutcome, EphemError> {
        self.transition(RunState::Probing);
        let mut successes = self.attempt_backends(instant).await.into_iter();

        let outcome = match (successes.next(), successes.next()) {
            (Some(first), Some(second)) => {
                self.transition(RunState::Validating);
                let report = match cross_validate(&first, &second) {
                    Ok(report) => report,
                    Err(error) => {
                        self.transition(RunState::Done);
                        return Err(error);
                    }
                };
                self.journal.record(&RunEvent::CrossValidated {
                    first: first.engine().clone(),
                    second: second.engine().clone(),
                    score: report.aggregate_score(),
                });
                RunOutcome::CrossValidated {
                    first,
                    second,
                    report,
                }
            }
            (Some(only), None) => {
                self.transition(RunState::SinglePrecise);
                RunOutcome::SinglePrecise(only)
            }
            _ => {
                self.transition(RunState::Failsafe);
                self.journal.record(&RunEvent::FailsafeEngaged);
                RunOutcome::Failsafe(self.failsafe.compute(instant))
            }
        };

        self.journal.record(&RunEvent::RunFinished {
            engine: outcome.engine(),
            precision: outcome.precision(),
        });
        self.transition(RunState::Done);
        Ok(outcome)
    }

    /// [`run`](Self::run), then write the snapshot and the summary with `writer`.
    ///
    /// Return
    /// ----------
    /// * The outcome and the snapshot path. Errors come from the precondition check or
    ///   from writing the files.
    pub async fn run_and_persist(
        &self,
        instant: Epoch,
        writer: &SnapshotWriter,
    ) -> Result<(RunOutcome, Utf8PathBuf), EphemError> {
        let outcome = self.run(instant).await?;
        let path = writer.write(&outcome.clone().into_snapshot())?;
        self.journal
            .record(&RunEvent::SnapshotWritten { path: path.clone() });
        Ok((outcome, path))
    }
}
