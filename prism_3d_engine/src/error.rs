//! Error types for the Prism3D engine
//!
//! Every fallible engine operation returns [`Result`]. Errors are raised at
//! setup time (scene, mesh, material, sector configuration) or by the
//! rasterizer backend; the per-frame pipeline itself never fails halfway
//! through a pass.

use std::fmt;

/// Result type for Prism3D engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Prism3D engine errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Rasterizer backend failure (poisoned device lock, invalid binding, ...)
    BackendError(String),

    /// Out of image memory
    OutOfMemory,

    /// Invalid resource (unknown key, missing image, malformed mesh, ...)
    InvalidResource(String),

    /// Initialization failed (backend or target setup)
    InitializationFailed(String),

    /// Authoring mistake detected at setup time (batch owner in a sector, ...)
    ConfigurationError(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of image memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Log an error through the engine logger and build the matching [`Error`]
///
/// The variant defaults to `BackendError` when omitted.
///
/// # Example
///
/// ```ignore
/// let err = engine_err!("prism3d::Scene", "Model '{}' not found", name);
/// let err = engine_err!(ConfigurationError, "prism3d::Scene", "Bad batch owner");
/// ```
#[macro_export]
macro_rules! engine_err {
    ($kind:ident, $source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::prism3d::Error::$kind(message)
    }};
    ($source:expr, $($arg:tt)*) => {
        $crate::engine_err!(BackendError, $source, $($arg)*)
    };
}

/// Log an error and return it from the enclosing function
///
/// Same arguments as [`engine_err!`].
#[macro_export]
macro_rules! engine_bail {
    ($($arg:tt)*) => {
        return Err($crate::engine_err!($($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
