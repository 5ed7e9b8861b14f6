use thiserror::Error;

#[derive(Error, Debug)]
pub enum EphemError {
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Backend {engine} failed: {reason}")]
    BackendCompute { engine: String, reason: String },

    #[error("Backend {engine} timed out after {seconds} s")]
    BackendTimeout { engine: String, seconds: f64 },

    #[error("Cross validation requires identical timestamps, got {first} and {second}")]
    ValidationPrecondition { first: String, second: String },

    #[error("Epoch outside the ephemeris coverage: {0}")]
    EpochOutOfRange(String),

    #[error("No segment for NAIF id {target} at ET {et_seconds}")]
    SegmentNotFound { target: i32, et_seconds: f64 },

    #[error("Body {body} is not supported by {engine}")]
    UnsupportedBody { body: String, engine: String },

    #[error("Invalid JPL ephemeris file: {0}")]
    InvalidEphemFile(String),

    #[error("Invalid JPL ephemeris file source: {0}")]
    InvalidEphemFileSource(String),

    #[error("Invalid JPL ephemeris file version: {0}")]
    InvalidJPLEphemFileVersion(String),

    #[error("Unknown body: {0}")]
    UnknownBody(String),

    #[error("Invalid instant: {0}")]
    InvalidInstant(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("UTF-8 Path error: {0}")]
    Utf8PathError(String),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Unable to persist {path}: {reason}")]
    PersistError { path: String, reason: String },

    #[cfg(feature = "jpl-download")]
    #[error("HTTP reqwest error: {0}")]
    ReqwestError(#[from] reqwest::Error),
}

impl EphemError {
    /// Whether the orchestrator may swallow this error and fall through to the next backend.
    ///
    /// Only a broken cross validation precondition is a caller bug that must surface.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, EphemError::ValidationPrecondition { .. })
    }

    pub(crate) fn compute(engine: impl Into<String>, reason: impl ToString) -> Self {
        EphemError::BackendCompute {
            engine: engine.into(),
            reason: reason.to_string(),
        }
    }
}

impl PartialEq for EphemError {
    fn eq(&self, other: &Self) -> bool {
        use EphemError::*;
        match (self, other) {
            (BackendUnavailable(a), BackendUnavailable(b)) => a == b,
            (
                BackendCompute {
                    engine: e1,
                    reason: r1,
                },
                BackendCompute {
                    engine: e2,
                    reason: r2,
                },
            ) => e1 == e2 && r1 == r2,
            (
                BackendTimeout {
                    engine: e1,
                    seconds: s1,
                },
                BackendTimeout {
                    engine: e2,
                    seconds: s2,
                },
            ) => e1 == e2 && s1 == s2,
            (
                ValidationPrecondition {
                    first: f1,
                    second: s1,
                },
                ValidationPrecondition {
                    first: f2,
                    second: s2,
                },
            ) => f1 == f2 && s1 == s2,
            (EpochOutOfRange(a), EpochOutOfRange(b)) => a == b,
            (
                SegmentNotFound {
                    target: t1,
                    et_seconds: e1,
                },
                SegmentNotFound {
                    target: t2,
                    et_seconds: e2,
                },
            ) => t1 == t2 && e1 == e2,
            (
                UnsupportedBody {
                    body: b1,
                    engine: e1,
                },
                UnsupportedBody {
                    body: b2,
                    engine: e2,
                },
            ) => b1 == b2 && e1 == e2,
            (InvalidEphemFile(a), InvalidEphemFile(b)) => a == b,
            (InvalidEphemFileSource(a), InvalidEphemFileSource(b)) => a == b,
            (InvalidJPLEphemFileVersion(a), InvalidJPLEphemFileVersion(b)) => a == b,
            (UnknownBody(a), UnknownBody(b)) => a == b,
            (InvalidInstant(a), InvalidInstant(b)) => a == b,
            (InvalidConfig(a), InvalidConfig(b)) => a == b,
            (Utf8PathError(a), Utf8PathError(b)) => a == b,
            (PersistError { path: p1, .. }, PersistError { path: p2, .. }) => p1 == p2,

            // Not comparable: equal when the variant matches
            (IoError(_), IoError(_)) => true,
            (JsonError(_), JsonError(_)) => true,
            #[cfg(feature = "jpl-download")]
            (ReqwestError(_), ReqwestError(_)) => true,

            _ => false,
        }
    }
}
