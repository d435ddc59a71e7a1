use thiserror::Error;

/// Errors related to environment and token configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The requested deployment environment is not known.
    #[error("unsupported environment {0}")]
    UnsupportedEnvironment(String),
    /// The requested token symbol is not in the configured token list.
    #[error("unsupported token {0}")]
    UnsupportedToken(String),
}
