//! Error types for the spec engine.
//!
//! Only usage errors live here. Data that fails a spec is reported through
//! [`Conformance::Invalid`](crate::Conformance) and problem lists instead.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for spec operations.
pub type SpecResult<T> = Result<T, SpecError>;

/// Errors raised by spec construction, resolution and instrumentation.
#[derive(Error, Debug)]
pub enum SpecError {
    #[error("Unable to resolve spec: {0}")]
    UnregisteredSpec(String),

    #[error("Spec {0} refers only to itself through named references")]
    CircularReference(String),

    #[error("Spec {name} nests more than {limit} named references deep")]
    RecursionLimit { name: String, limit: usize },

    #[error("Unable to resolve function spec: {0}")]
    UnregisteredFnSpec(String),

    #[error("{0} requires at least one sub-spec")]
    EmptySpec(&'static str),

    #[error("Duplicate tag :{tag} in {kind}")]
    DuplicateTag { kind: &'static str, tag: String },

    #[error("Invalid options for {kind}: {message}")]
    InvalidOptions { kind: &'static str, message: String },

    #[error("Invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Spec {0} has no unform function")]
    NoUnformer(String),

    #[error("Value cannot be unformed by {spec}: {value}")]
    Unformable { spec: String, value: String },

    #[error("Spec assertion failed\n{0}")]
    AssertionFailed(String),

    #[error("Call to {name} did not conform to spec ({stage})\n{explanation}")]
    InstrumentFailure {
        name: String,
        stage: InstrumentStage,
        explanation: String,
    },

    #[error("Invalid spec definition {name}: {message}")]
    Definition { name: String, message: String },

    #[error("Spec document not found at path: {0}")]
    DocumentNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Which side of an instrumented call failed its spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstrumentStage {
    Args,
    Ret,
    Fn,
}

impl std::fmt::Display for InstrumentStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstrumentStage::Args => write!(f, ":args"),
            InstrumentStage::Ret => write!(f, ":ret"),
            InstrumentStage::Fn => write!(f, ":fn"),
        }
    }
}

impl SpecError {
    /// Whether the error came from an unresolvable name.
    pub fn is_unregistered(&self) -> bool {
        matches!(
            self,
            SpecError::UnregisteredSpec(_) | SpecError::UnregisteredFnSpec(_)
        )
    }
}
