/// Convenience result type used across storyweave.
pub type StoryResult<T> = Result<T, StoryError>;

/// Top-level error taxonomy used by generation APIs.
#[derive(thiserror::Error, Debug)]
pub enum StoryError {
    /// Invalid user-provided configuration or project data.
    #[error("validation error: {0}")]
    Validation(String),

    /// An element was driven into a state its API does not allow (e.g. nested loop groups).
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// A script failed while producing its groups.
    #[error("script '{script}' faulted: {message}")]
    ScriptFault {
        /// Name of the faulting script.
        script: String,
        /// Rendered failure message.
        message: String,
    },

    /// A resource needed to materialize an asset is not available.
    #[error("missing resource: {0}")]
    MissingResource(String),

    /// A command violates the timeline format (e.g. `end_time < start_time`).
    #[error("format violation: {0}")]
    FormatViolation(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StoryError {
    /// Build a [`StoryError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`StoryError::InvalidState`] value.
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Build a [`StoryError::MissingResource`] value.
    pub fn missing_resource(msg: impl Into<String>) -> Self {
        Self::MissingResource(msg.into())
    }

    /// Build a [`StoryError::FormatViolation`] value.
    pub fn format_violation(msg: impl Into<String>) -> Self {
        Self::FormatViolation(msg.into())
    }

    /// Build a [`StoryError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
