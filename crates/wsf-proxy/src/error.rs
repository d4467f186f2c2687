use thiserror::Error;
use wsf_proxy_path::PathError;

/// Errors surfaced by the proxy.
///
/// Navigation misses are not errors (they yield `None` or a null node) and
/// rejected mutations return `false`; this type covers the cases a caller
/// cannot reasonably treat as "absent".
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },
    #[error("node does not resolve to a value")]
    NullNode,
    #[error("invalid path: {0}")]
    InvalidPath(#[from] PathError),
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
    #[error("json encode failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProxyError {
    pub(crate) fn mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        ProxyError::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }
}
