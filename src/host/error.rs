use std::fmt;

/// HTTP configuration error
///
/// Unlike module scan failures, which discovery absorbs and logs, these stop
/// the API from being configured or started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The handler-type set contains no controller
    NoControllers {
        /// Number of types that were offered
        offered: usize,
    },
    /// A route template could not be parsed
    InvalidRoute { template: String, reason: String },
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationError::NoControllers { offered } => {
                write!(f, "Configuration error: does not contain any controllers ({offered} type(s) offered)")
            }
            ConfigurationError::InvalidRoute { template, reason } => {
                write!(f, "Configuration error: invalid route template '{template}': {reason}")
            }
        }
    }
}

impl std::error::Error for ConfigurationError {}
