// Error types module

use thiserror::Error;

/// Errors that stop a single rewrite
///
/// Every variant is answered with 403 Forbidden and a short diagnostic.
/// Nothing here is retried by the proxy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RewriteError {
    /// Signing configuration could not be fetched or parsed
    #[error("Configuration unavailable: {0}")]
    ConfigUnavailable(String),

    /// Path does not match `/{signature}/.../{source}`
    #[error("Malformed URI")]
    MalformedUri,

    /// Signature segment is empty
    #[error("Missing signature")]
    MissingSignature,

    /// Signature does not match the request path
    #[error("Invalid signature")]
    SignatureInvalid,
}

impl RewriteError {
    /// HTTP status returned to the client
    pub fn to_http_status(&self) -> u16 {
        403
    }

    /// Short label for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            RewriteError::ConfigUnavailable(_) => "config_unavailable",
            RewriteError::MalformedUri => "malformed_uri",
            RewriteError::MissingSignature => "missing_signature",
            RewriteError::SignatureInvalid => "signature_invalid",
        }
    }

    pub fn config_unavailable(reason: impl Into<String>) -> Self {
        RewriteError::ConfigUnavailable(reason.into())
    }
}

/// Errors from the configuration store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store backend unavailable: {0}")]
    Unavailable(String),
}

/// Errors loading the process configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Environment variable '{0}' is referenced but not set")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
