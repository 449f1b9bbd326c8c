//! Error types for the drover library.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Comprehensive error type for all drover operations.
///
/// The variants map directly onto the failure taxonomy of the run loop:
/// [`DroverError::CacheMiss`] is recoverable by falling back to generation
/// (except under the `onlycache` strength, where it aborts the run),
/// [`DroverError::Generation`] and [`DroverError::Execution`] consume an
/// attempt and are retried while budget remains, and
/// [`DroverError::ConflictingOptions`] fails fast before any step runs.
#[derive(Error, Debug)]
pub enum DroverError {
    /// No cached code exists for the requested fingerprint
    #[error("Cache entry not found for step \"{prompt}\" (fingerprint {fingerprint})")]
    CacheMiss { fingerprint: String, prompt: String },
    /// The model call failed or returned an unusable envelope
    #[error("Code generation failed: {message}")]
    Generation { message: String },
    /// Generated code raised while running against the page
    #[error("Execution failed: {message}")]
    Execution { message: String },
    /// Incompatible run options requested together
    #[error("Conflicting options: {message}")]
    ConflictingOptions { message: String },
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl DroverError {
    /// Creates a generation error from any displayable cause.
    pub fn generation(message: impl fmt::Display) -> Self {
        Self::Generation {
            message: message.to_string(),
        }
    }

    /// Creates an execution error from any displayable cause.
    pub fn execution(message: impl fmt::Display) -> Self {
        Self::Execution {
            message: message.to_string(),
        }
    }

    /// Creates a configuration error from any displayable cause.
    pub fn configuration(message: impl fmt::Display) -> Self {
        Self::Configuration {
            message: message.to_string(),
        }
    }

    /// Creates a file system error for the given path.
    pub fn file_system(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileSystem {
            path: path.into(),
            source,
        }
    }

    /// Whether this error is a missing cache entry.
    ///
    /// The run loop uses this to distinguish the run-fatal `onlycache`
    /// condition from ordinary retryable attempt failures.
    pub fn is_cache_miss(&self) -> bool {
        matches!(self, Self::CacheMiss { .. })
    }
}

/// Extension trait for Result to provide concise error mapping with
/// anyhow-style context.
pub trait ResultExt<T, E> {
    /// Add context to any error type, converting to DroverError.
    fn with_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;

    /// Add lazy context to any error type, converting to DroverError.
    fn with_context_lazy<C, F>(self, f: F) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E> ResultExt<T, E> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn with_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|e| DroverError::Configuration {
            message: format!("{}: {}", context, e),
        })
    }

    fn with_context_lazy<C, F>(self, f: F) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| DroverError::Configuration {
            message: format!("{}: {}", f(), e),
        })
    }
}

/// Specialized extension trait for file-system Results.
pub trait FsResultExt<T> {
    /// Map IO errors to [`DroverError::FileSystem`] with the offending path.
    fn fs_context(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> FsResultExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| DroverError::file_system(path, e))
    }
}

/// Result type alias for drover operations
pub type Result<T> = std::result::Result<T, DroverError>;
