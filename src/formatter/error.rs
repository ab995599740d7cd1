use std::fmt;

/// Formatter configuration error
///
/// Returned by [`FormatterBuilder`](super::FormatterBuilder) methods when a
/// required argument is empty or cannot be parsed. The builder is left
/// untouched when this is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatterError {
    /// A required argument was empty or malformed
    InvalidArgument {
        /// Name of the offending argument (e.g. `media_type`)
        argument: &'static str,
        /// What was wrong with it
        reason: String,
    },
}

impl FormatterError {
    pub(crate) fn invalid(argument: &'static str, reason: impl Into<String>) -> Self {
        FormatterError::InvalidArgument {
            argument,
            reason: reason.into(),
        }
    }

    pub(crate) fn empty(argument: &'static str) -> Self {
        Self::invalid(argument, "value must not be empty")
    }

    /// Name of the argument that was rejected.
    #[must_use]
    pub fn argument(&self) -> &'static str {
        match self {
            FormatterError::InvalidArgument { argument, .. } => argument,
        }
    }
}

impl fmt::Display for FormatterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatterError::InvalidArgument { argument, reason } => {
                write!(f, "Formatter configuration error: invalid argument '{argument}': {reason}")
            }
        }
    }
}

impl std::error::Error for FormatterError {}

/// Reject empty or whitespace-only required strings.
pub(crate) fn require(argument: &'static str, value: &str) -> Result<(), FormatterError> {
    if value.trim().is_empty() {
        Err(FormatterError::empty(argument))
    } else {
        Ok(())
    }
}
