//! Error types for the risk assessment service

use thiserror::Error;

/// Errors raised while loading artifacts or assessing a student
#[derive(Error, Debug)]
pub enum RiskError {
    /// Artifact or configuration could not be loaded; the service must not start
    #[error("Startup failed: {0}")]
    Startup(String),

    /// The trained feature schema is empty or unusable
    #[error("Invalid feature schema: {0}")]
    Schema(String),

    /// Aligned vector does not match the trained feature schema
    #[error("Feature schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Model structure cannot be evaluated
    #[error("Malformed model: {0}")]
    Model(String),

    /// Model produced something that is not a probability
    #[error("Invalid probability from model: {0}")]
    InvalidProbability(f64),

    /// Answers outside their declared domain
    #[error("Invalid answers: {}", .0.join("; "))]
    InvalidAnswers(Vec<String>),

    /// Threshold or scale configuration is inconsistent
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl RiskError {
    /// Errors caused by the caller's input rather than the deployment
    pub fn is_client_error(&self) -> bool {
        matches!(self, RiskError::InvalidAnswers(_) | RiskError::Csv(_))
    }
}

pub type Result<T> = std::result::Result<T, RiskError>;
