/// Crate-wide result alias.
pub type GridtraceResult<T> = Result<T, GridtraceError>;

#[derive(thiserror::Error, Debug)]
/// Errors surfaced at the I/O and render boundaries.
///
/// The per-call evaluation path never produces these; malformed elements are repaired or
/// skipped instead.
pub enum GridtraceError {
    /// Input could not be read or parsed into a project.
    #[error("validation error: {0}")]
    Validation(String),

    /// Raster surface setup or encoding failed.
    #[error("render error: {0}")]
    Render(String),

    /// Serialization of evaluated output failed.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Any other error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GridtraceError {
    /// Build a [`GridtraceError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`GridtraceError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`GridtraceError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
