use serde::{Serialize, Deserialize};
use std::fmt;

/// Broad category of a failure, used by callers to decide how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A required input (e.g. user preferences) does not exist
    MissingPrerequisite,
    /// Caller supplied data that violates an input contract
    InvalidInput,
    /// A collaborator could not deliver the data it was asked for
    DataSource,
    Io,
    Serialization,
    Config,
    Timeout,
}

/// Unified error type for the scheduler.
/// All fallible functions return Result<T, PlanError> instead of String errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanError {
    pub kind: ErrorKind,
    pub message: String,
    pub stage: String,
    pub context: Option<String>,
    pub source: Option<String>,
}

impl PlanError {
    /// Create a new error with kind, stage and message
    pub fn new<S: Into<String>>(kind: ErrorKind, message: S, stage: &'static str) -> Self {
        PlanError {
            kind,
            message: message.into(),
            stage: stage.to_string(),
            context: None,
            source: None,
        }
    }

    pub fn invalid_input<S: Into<String>>(message: S, stage: &'static str) -> Self {
        Self::new(ErrorKind::InvalidInput, message, stage)
    }

    pub fn data_source<S: Into<String>>(message: S, stage: &'static str) -> Self {
        Self::new(ErrorKind::DataSource, message, stage)
    }

    /// Add additional context information
    pub fn with_context<S: Into<String>>(mut self, context: S) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add source error information
    pub fn with_source<S: Into<String>>(mut self, source: S) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn is_invalid_input(&self) -> bool {
        self.kind == ErrorKind::InvalidInput
    }
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.stage, self.message)?;
        if let Some(ref context) = self.context {
            write!(f, " (context: {})", context)?;
        }
        if let Some(ref source) = self.source {
            write!(f, " (source: {})", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for PlanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

/// Rejections raised while validating a practice attempt.
/// The mastery record is never touched when one of these is returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AttemptError {
    #[error("difficulty weight must be a positive finite number, got {0}")]
    NonPositiveWeight(f64),
    #[error("unknown activity type '{0}'")]
    UnknownActivity(String),
    #[error("attempt is for word '{attempt}' but progress belongs to '{progress}'")]
    WordMismatch { attempt: String, progress: String },
    #[error("attempt is for user '{attempt}' but progress belongs to '{progress}'")]
    UserMismatch { attempt: String, progress: String },
}

impl From<AttemptError> for PlanError {
    fn from(err: AttemptError) -> Self {
        PlanError::invalid_input(err.to_string(), "record_attempt")
    }
}

impl From<anyhow::Error> for PlanError {
    fn from(err: anyhow::Error) -> Self {
        PlanError::new(
            ErrorKind::DataSource,
            format!("{:#}", err),
            "data_source"
        ).with_source("anyhow")
    }
}

impl From<std::io::Error> for PlanError {
    fn from(err: std::io::Error) -> Self {
        PlanError::new(
            ErrorKind::Io,
            format!("I/O error: {}", err),
            "io"
        ).with_source("std::io")
    }
}

impl From<serde_json::Error> for PlanError {
    fn from(err: serde_json::Error) -> Self {
        PlanError::new(
            ErrorKind::Serialization,
            format!("JSON error: {}", err),
            "json_parse"
        ).with_source("serde_json")
    }
}

impl From<toml::de::Error> for PlanError {
    fn from(err: toml::de::Error) -> Self {
        PlanError::new(
            ErrorKind::Config,
            format!("TOML error: {}", err),
            "config"
        ).with_source("toml")
    }
}

impl From<tokio::time::error::Elapsed> for PlanError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        PlanError::new(
            ErrorKind::Timeout,
            "Data gathering timed out",
            "timeout"
        ).with_source("tokio::time")
    }
}
