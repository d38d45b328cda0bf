use thiserror::Error;

#[derive(Debug, Error)]
pub enum RomeError {
    #[error("not initialized: run 'rome init'")]
    NotInitialized,

    #[error("missing dependency: {0}")]
    MissingDependency(String),

    #[error("transaction failed: {call}: {reason}")]
    TransactionFailure { call: String, reason: String },

    #[error("configuration mismatch: {0}")]
    ConfigurationMismatch(String),

    #[error("unknown network: {0}")]
    UnknownNetwork(String),

    #[error("artifact not found: {0}")]
    ArtifactNotFound(String),

    #[error("invalid pipeline: {0}")]
    InvalidPipeline(String),

    #[error("invalid name '{0}': use letters, digits, '-' or '_'")]
    InvalidName(String),

    #[error("rpc error: {0}")]
    Rpc(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl RomeError {
    pub fn missing<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<String> = names.into_iter().map(|s| s.as_ref().to_string()).collect();
        RomeError::MissingDependency(names.join(", "))
    }

    /// Stable snake_case tag used in run reports.
    pub fn kind(&self) -> &'static str {
        match self {
            RomeError::MissingDependency(_) => "missing_dependency",
            RomeError::TransactionFailure { .. } => "transaction_failure",
            RomeError::ConfigurationMismatch(_) | RomeError::UnknownNetwork(_) => {
                "configuration_mismatch"
            }
            RomeError::InvalidPipeline(_) => "invalid_pipeline",
            _ => "other",
        }
    }

    pub fn tx_failure(call: impl Into<String>, reason: impl Into<String>) -> Self {
        RomeError::TransactionFailure {
            call: call.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RomeError>;
