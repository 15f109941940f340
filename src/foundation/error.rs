/// Convenience result type used across Tessera.
pub type TesseraResult<T> = Result<T, TesseraError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum TesseraError {
    /// Invalid user-provided configuration (colors, swatches, sizes, timings).
    #[error("validation error: {0}")]
    Validation(String),

    /// A caller broke an API contract (for example an opacity outside `[0, 1]`).
    #[error("invariant violation: {0}")]
    Invariant(String),

    /// Drawing surface or frame sink failures.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TesseraError {
    /// Build a [`TesseraError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`TesseraError::Invariant`] value.
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::Invariant(msg.into())
    }

    /// Build a [`TesseraError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`TesseraError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Prefix a validation message with the field or item it came from. Other kinds pass through.
    pub(crate) fn within(self, ctx: impl std::fmt::Display) -> Self {
        match self {
            Self::Validation(msg) => Self::Validation(format!("{ctx}: {msg}")),
            other => other,
        }
    }
}

impl From<serde_json::Error> for TesseraError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
