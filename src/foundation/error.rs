use crate::resolve::resolver::Tier;

/// Convenience result type used across splashback.
pub type SplashResult<T> = Result<T, SplashError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Image loading failures never escape the resolver: they are converted into fallback-chain
/// advancement. Degenerate layout input is not an error at all; it is clamped.
#[derive(thiserror::Error, Debug)]
pub enum SplashError {
    /// Invalid user-provided plate, config, or locator data.
    #[error("validation error: {0}")]
    Validation(String),

    /// A motif source did not finish loading within the per-tier timeout.
    #[error("image load timeout: {tier} tier exceeded {timeout_ms} ms")]
    ImageLoadTimeout {
        /// Tier whose attempt timed out.
        tier: Tier,
        /// Timeout that elapsed.
        timeout_ms: u64,
    },

    /// Network, filesystem, cross-origin, or decode failure for a motif source.
    #[error("image load error: {0}")]
    ImageLoad(String),

    /// The surface cannot be read back (tainted by a cross-origin motif).
    #[error("export unavailable: surface is not origin-clean")]
    ExportUnavailable,

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SplashError {
    /// Build a [`SplashError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SplashError::ImageLoad`] value.
    pub fn image_load(msg: impl Into<String>) -> Self {
        Self::ImageLoad(msg.into())
    }

    /// Build a [`SplashError::ImageLoadTimeout`] value.
    pub fn image_load_timeout(tier: Tier, timeout_ms: u64) -> Self {
        Self::ImageLoadTimeout { tier, timeout_ms }
    }

    /// Build a [`SplashError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
