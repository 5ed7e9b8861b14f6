//! Run journal: the single channel through which a run reports what happened.
//!
//! The orchestrator never touches global logging state. It is handed an
//! `Arc<dyn RunJournal>` and records [`RunEvent`]s into it; the binary decides where they
//! go. Available sinks:
//!
//! - [`TracingJournal`]: forwards to `tracing` under the `ephemeris_engine` target.
//! - [`JsonlJournal`]: appends one JSON object per event to a file
//!   (`logs/genesis_log.jsonl` by default).
//! - [`MemoryJournal`]: keeps the events, for tests and for callers that inspect a run.
//! - [`FanoutJournal`]: duplicates events to several sinks.
//!
//! Recording never fails: a sink that cannot write reports it through `tracing` and
//! drops the event.

use std::{
    fmt,
    fs::OpenOptions,
    io::Write,
    sync::{Arc, Mutex},
};

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    constants::JOURNAL_MODULE,
    ephemeris::EngineId,
    orchestrator::RunState,
    snapshot::Precision,
    time::{format_utc, now_utc},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventLevel {
    Info,
    Warn,
}

/// Something that happened during a run.
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    StateChanged(RunState),
    BackendUnavailable { engine: EngineId, detail: String },
    BackendSucceeded { engine: EngineId, bodies: usize },
    BackendFailed { engine: EngineId, error: String },
    CrossValidated { first: EngineId, second: EngineId, score: f64 },
    FailsafeEngaged,
    SnapshotWritten { path: Utf8PathBuf },
    RunFinished { engine: EngineId, precision: Precision },
}

impl RunEvent {
    pub fn level(&self) -> EventLevel {
        match self {
            RunEvent::BackendUnavailable { .. }
            | RunEvent::BackendFailed { .. }
            | RunEvent::FailsafeEngaged => EventLevel::Warn,
            _ => EventLevel::Info,
        }
    }
}

impl fmt::Display for RunEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunEvent::StateChanged(state) => write!(f, "state -> {state:?}"),
            RunEvent::BackendUnavailable { engine, detail } => {
                write!(f, "{engine} unavailable: {detail}")
            }
            RunEvent::BackendSucceeded { engine, bodies } => {
                write!(f, "{engine} computed {bodies} bodies")
            }
            RunEvent::BackendFailed { engine, error } => write!(f, "{engine} failed: {error}"),
            RunEvent::CrossValidated {
                first,
                second,
                score,
            } => write!(f, "{first} vs {second}: consistency {score:.3}"),
            RunEvent::FailsafeEngaged => {
                write!(f, "no precise backend succeeded, failsafe engaged")
            }
            RunEvent::SnapshotWritten { path } => write!(f, "snapshot written to {path}"),
            RunEvent::RunFinished { engine, precision } => {
                write!(f, "run finished: engine={engine} precision={precision}")
            }
        }
    }
}

pub trait RunJournal: Send + Sync {
    fn record(&self, event: &RunEvent);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingJournal;

impl RunJournal for TracingJournal {
    fn record(&self, event: &RunEvent) {
        match event.level() {
            EventLevel::Info => info!(target: "ephemeris_engine", "{event}"),
            EventLevel::Warn => warn!(target: "ephemeris_engine", "{event}"),
        }
    }
}

#[derive(Serialize)]
struct JournalLine<'a> {
    timestamp: String,
    module: &'a str,
    level: EventLevel,
    message: String,
}

/// Append-only JSON Lines journal.
#[derive(Debug)]
pub struct JsonlJournal {
    path: Utf8PathBuf,
    lock: Mutex<()>,
}

impl JsonlJournal {
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        JsonlJournal {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    fn append(&self, event: &RunEvent) -> Result<(), crate::ephem_errors::EphemError> {
        let line = JournalLine {
            timestamp: now_utc().map(format_utc).unwrap_or_default(),
            module: JOURNAL_MODULE,
            level: event.level(),
            message: event.to_string(),
        };
        let mut encoded = serde_json::to_string(&line)?;
        encoded.push('\n');

        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(parent) = self.path.parent().filter(|p| !p.as_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(encoded.as_bytes())?;
        Ok(())
    }
}

impl RunJournal for JsonlJournal {
    fn record(&self, event: &RunEvent) {
        if let Err(e) = self.append(event) {
            warn!("cannot append to journal {}: {e}", self.path);
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct MemoryJournal {
    events: Mutex<Vec<RunEvent>>,
}

impl MemoryJournal {
    pub fn new() -> Self {
        MemoryJournal::default()
    }

    /// Copy of the events recorded so far, in order.
    pub fn events(&self) -> Vec<RunEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl RunJournal for MemoryJournal {
    fn record(&self, event: &RunEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event.clone());
    }
}

/// Sends every event to each inner journal, in order.
#[derive(Default, Clone)]
pub struct FanoutJournal {
    sinks: Vec<Arc<dyn RunJournal>>,
}

impl FanoutJournal {
    pub fn new(sinks: Vec<Arc<dyn RunJournal>>) -> Self {
        FanoutJournal { sinks }
    }

    pub fn push(&mut self, sink: Arc<dyn RunJournal>) {
        self.sinks.push(sink);
    }
}

impl RunJournal for FanoutJournal {
    fn record(&self, event: &RunEvent) {
        for sink in &self.sinks {
            sink.record(event);
        }
    }
}

#[cfg(test)]
mod journal_test {
    use super::*;

    #[test]
    fn test_levels_and_messages() {
        let failed = RunEvent::BackendFailed {
            engine: EngineId::naif("de421.bsp"),
            error: "boom".into(),
        };
        assert_eq!(failed.level(), EventLevel::Warn);
        assert_eq!(failed.to_string(), "naif:de421.bsp failed: boom");

        let ok = RunEvent::BackendSucceeded {
            engine: EngineId::horizon("DE440"),
            bodies: 7,
        };
        assert_eq!(ok.level(), EventLevel::Info);
        assert_eq!(ok.to_string(), "horizon:DE440 computed 7 bodies");
    }

    #[test]
    fn test_jsonl_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path =
            Utf8PathBuf::from_path_buf(dir.path().join("logs").join("genesis_log.jsonl")).unwrap();
        let journal = JsonlJournal::new(path.clone());

        journal.record(&RunEvent::FailsafeEngaged);
        journal.record(&RunEvent::StateChanged(RunState::Done));

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["module"], "ephemeris_engine");
        assert_eq!(lines[0]["level"], "warn");
        assert_eq!(
            lines[0]["message"],
            "no precise backend succeeded, failsafe engaged"
        );
        assert!(lines[1]["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn test_fanout_reaches_every_sink() {
        let first = Arc::new(MemoryJournal::new());
        let second = Arc::new(MemoryJournal::new());
        let fanout = FanoutJournal::new(vec![first.clone() as Arc<dyn RunJournal>, second.clone()]);

        fanout.record(&RunEvent::FailsafeEngaged);
        assert_eq!(first.events(), vec![RunEvent::FailsafeEngaged]);
        assert_eq!(second.events(), vec![RunEvent::FailsafeEngaged]);
    }
}
