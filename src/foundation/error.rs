use std::path::PathBuf;

/// Convenience result type used across ogcard.
pub type CardResult<T> = Result<T, CardError>;

/// Top-level error taxonomy used by the card pipeline.
#[derive(thiserror::Error, Debug)]
pub enum CardError {
    /// Invalid configuration or request data.
    #[error("validation error: {0}")]
    Validation(String),

    /// The source page could not be fetched (network failure or non-success status).
    #[error("fetch error: {0}")]
    Fetch(String),

    /// Rasterization failed.
    #[error("render error: {0}")]
    Render(String),

    /// The finished raster could not be encoded.
    #[error("encode error: {0}")]
    Encode(String),

    /// Reading or writing a cache entry failed.
    #[error("cache error at '{}': {source}", path.display())]
    Cache {
        /// Cache file involved in the failure.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CardError {
    /// Build a [`CardError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CardError::Fetch`] value.
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    /// Build a [`CardError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`CardError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`CardError::Cache`] value.
    pub fn cache(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Cache {
            path: path.into(),
            source,
        }
    }

    /// True when the failure means no source page was available.
    pub fn is_fetch(&self) -> bool {
        matches!(self, Self::Fetch(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
