use thiserror::Error;

/// Errors that can occur when reading, writing or persisting a property bag
#[derive(Debug, Error)]
pub enum PropertyError {
    /// A required argument (path, section id) was empty
    #[error("Missing required argument `{0}`")]
    MissingArgument(&'static str),

    /// No conversion path exists from the stored raw form to the requested type
    #[error("Conversion to {target} is not supported: {reason}")]
    Unsupported {
        /// Name of the requested type
        target: &'static str,
        /// Why the stored form cannot become that type
        reason: String,
    },

    /// The stored text is not valid syntax for the requested type
    #[error("Cannot parse {value:?} as {target}: {reason}")]
    Format {
        /// Name of the requested type
        target: &'static str,
        /// The offending text
        value: String,
        /// Parser diagnostic
        reason: String,
    },

    /// A persisted document is structurally malformed
    #[error("Malformed document at {location}: {reason}")]
    MalformedDocument {
        /// Section, key path or stream position of the problem
        location: String,
        /// What was wrong
        reason: String,
    },

    /// Underlying storage failure, propagated unchanged
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PropertyError {
    pub(crate) fn unsupported(target: &'static str, reason: impl Into<String>) -> Self {
        PropertyError::Unsupported {
            target,
            reason: reason.into(),
        }
    }

    pub(crate) fn format(
        target: &'static str,
        value: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        PropertyError::Format {
            target,
            value: value.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn malformed(location: impl Into<String>, reason: impl Into<String>) -> Self {
        PropertyError::MalformedDocument {
            location: location.into(),
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, PropertyError>;
