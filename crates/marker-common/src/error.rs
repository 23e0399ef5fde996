//! Error types for the marker rendering crates.

use thiserror::Error;

/// Result type alias using MarkerError.
pub type MarkerResult<T> = Result<T, MarkerError>;

/// Primary error type for marker operations.
///
/// Layout, rasterization and interpolation never produce these; they degrade
/// instead. Errors surface only from resource loading and from registry
/// operations that name an identity the caller got wrong.
#[derive(Debug, Error)]
pub enum MarkerError {
    // === Resource Errors ===
    #[error("Failed to load font: {0}")]
    FontLoad(String),

    #[error("Failed to decode icon: {0}")]
    IconDecode(String),

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("PNG encoding failed: {0}")]
    Encode(String),

    #[error("Invalid canvas: {0}")]
    InvalidCanvas(String),

    #[error("I/O error: {0}")]
    Io(String),

    // === Registry Errors ===
    #[error("Marker not found: {0}")]
    UnknownMarker(String),

    #[error("Marker already exists: {0}")]
    DuplicateMarker(String),

    #[error("Marker is already transitioning: {0}")]
    TransitionInFlight(String),

    // === Surface Errors ===
    #[error("Map surface rejected marker instance: {0}")]
    SurfaceRejected(String),
}

impl MarkerError {
    /// Whether the error only degrades output rather than failing a request.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            MarkerError::IconDecode(_) | MarkerError::SurfaceRejected(_)
        )
    }
}

impl From<std::io::Error> for MarkerError {
    fn from(err: std::io::Error) -> Self {
        MarkerError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for MarkerError {
    fn from(err: serde_json::Error) -> Self {
        MarkerError::InvalidConfig(format!("JSON error: {}", err))
    }
}

impl From<serde_yaml::Error> for MarkerError {
    fn from(err: serde_yaml::Error) -> Self {
        MarkerError::InvalidConfig(format!("YAML error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_errors() {
        assert!(MarkerError::IconDecode("bad svg".into()).is_recoverable());
        assert!(MarkerError::SurfaceRejected("full".into()).is_recoverable());
        assert!(!MarkerError::UnknownMarker("m1".into()).is_recoverable());
    }

    #[test]
    fn test_io_conversion() {
        let err: MarkerError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, MarkerError::Io(_)));
        assert!(err.to_string().contains("gone"));
    }
}
