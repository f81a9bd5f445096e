use thiserror::Error;

/// Errors surfaced by the reaper core and the command around it.
#[derive(Debug, Error)]
pub enum ReapError {
    #[error("unsupported kind: {kind}/{name}")]
    UnsupportedKind { kind: String, name: String },

    #[error("unknown resource type: {0}")]
    UnknownResourceType(String),

    #[error("{kind}/{name} was not declared when the determiner was built")]
    KindNotPrepared { kind: String, name: String },

    #[error("invalid label selector ({name}): {reason}")]
    InvalidSelector { name: String, reason: String },

    #[error("invalid apiVersion: {0:?}")]
    InvalidApiVersion(String),

    #[error("{kind}/{name} has no {field}")]
    MissingField {
        kind: String,
        name: String,
        field: &'static str,
    },

    #[error("failed to decode {kind}/{name}: {source}")]
    Decode {
        kind: String,
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("execution cancelled")]
    Cancelled,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    ParsingFailed(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

pub type Result<T> = std::result::Result<T, ReapError>;
