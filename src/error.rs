//! Error types for the cross-reference resolution engine
//!
//! Two families live here. `IndexError` covers the crate's outer edge (snapshot
//! and document files, configuration, caret lookup) and is a real error.
//! `ResolveMiss` names why the resolution path produced no answer; it is data,
//! not a failure, and callers normally collapse it to `None`.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or saving the data the resolver works on
#[derive(Error, Debug)]
pub enum IndexError {
    /// File system errors
    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Snapshot or document content could not be decoded
    #[error("Malformed data in '{path}': {reason}")]
    MalformedData { path: PathBuf, reason: String },

    #[error("Unsupported snapshot version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    /// Caret lookup errors
    #[error("No token at offset {offset} in '{path}'")]
    TokenNotFound { path: PathBuf, offset: u32 },

    /// Configuration errors
    #[error("Invalid configuration: {reason}")]
    ConfigError { reason: String },

    /// General errors for cases where we need to preserve existing behavior
    #[error("{0}")]
    General(String),
}

impl IndexError {
    /// Get a stable status code for this error type.
    ///
    /// Returns a string identifier that can be used in JSON responses
    /// for programmatic error handling.
    pub fn status_code(&self) -> String {
        match self {
            Self::FileRead { .. } => "FILE_READ_ERROR",
            Self::FileWrite { .. } => "FILE_WRITE_ERROR",
            Self::MalformedData { .. } => "MALFORMED_DATA",
            Self::UnsupportedVersion { .. } => "UNSUPPORTED_VERSION",
            Self::TokenNotFound { .. } => "TOKEN_NOT_FOUND",
            Self::ConfigError { .. } => "CONFIG_ERROR",
            Self::General(_) => "GENERAL_ERROR",
        }
        .to_string()
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::FileRead { .. } => vec![
                "Check that the file exists and you have read permissions",
                "Pass --index to point at the snapshot exported by your indexer",
            ],
            Self::MalformedData { .. } => vec![
                "Re-export the snapshot or syntax document from the indexer",
                "Validate the JSON against the format described in DESIGN.md",
            ],
            Self::UnsupportedVersion { .. } => {
                vec!["Re-export the snapshot with a matching indexer version"]
            }
            Self::TokenNotFound { .. } => vec![
                "Offsets are byte offsets into the original document",
                "Point the caret at a leaf token, not at whitespace between blocks",
            ],
            Self::ConfigError { .. } => {
                vec!["Run 'frameref init --force' to regenerate .frameref/settings.toml"]
            }
            _ => vec![],
        }
    }
}

/// Why a resolution step produced no answer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveMiss {
    /// The call-site shape cannot be turned into a signature
    #[error("call site cannot be encoded as a signature")]
    Unencodable,

    /// The index has nothing under the signature or key
    #[error("no index entry for '{signature}'")]
    NotFound { signature: String },

    /// The declaration exists but its value is not a compile-time literal
    #[error("'{signature}' does not resolve to a literal value")]
    NonLiteral { signature: String },
}

impl ResolveMiss {
    pub fn not_found(signature: impl Into<String>) -> Self {
        Self::NotFound {
            signature: signature.into(),
        }
    }

    pub fn non_literal(signature: impl Into<String>) -> Self {
        Self::NonLiteral {
            signature: signature.into(),
        }
    }
}

/// Result type alias for index operations
pub type IndexResult<T> = Result<T, IndexError>;

/// Result type alias for resolution steps
pub type Resolution<T> = Result<T, ResolveMiss>;

/// Helper trait for adding context to errors
pub trait ErrorContext<T> {
    /// Add context to an error
    fn context(self, msg: &str) -> Result<T, IndexError>;

    /// Add context with a path
    fn with_path(self, path: &std::path::Path) -> Result<T, IndexError>;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, msg: &str) -> Result<T, IndexError> {
        self.map_err(|e| IndexError::General(format!("{msg}: {e}")))
    }

    fn with_path(self, path: &std::path::Path) -> Result<T, IndexError> {
        self.map_err(|e| IndexError::MalformedData {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_are_stable() {
        let err = IndexError::TokenNotFound {
            path: PathBuf::from("a.twig"),
            offset: 3,
        };
        assert_eq!(err.status_code(), "TOKEN_NOT_FOUND");
        assert!(!err.recovery_suggestions().is_empty());
        assert_eq!(err.to_string(), "No token at offset 3 in 'a.twig'");
    }

    #[test]
    fn test_with_path_wraps_decode_errors() {
        let parsed: Result<u32, _> = serde_json::from_str::<u32>("nope");
        let err = parsed.with_path(std::path::Path::new("index.json")).unwrap_err();
        assert_eq!(err.status_code(), "MALFORMED_DATA");
        assert!(err.to_string().contains("index.json"));
    }

    #[test]
    fn test_resolve_miss_messages() {
        assert_eq!(
            ResolveMiss::not_found("#K#C\\Foo.BAR").to_string(),
            "no index entry for '#K#C\\Foo.BAR'"
        );
        assert_eq!(
            ResolveMiss::Unencodable.to_string(),
            "call site cannot be encoded as a signature"
        );
    }
}
