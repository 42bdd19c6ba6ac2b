//! Errors raised while reconciling output hashes.
//!
//! Every variant is fatal for the invocation: nothing is retried and no
//! partially reconciled output should be emitted.

use thiserror::Error;

/// Result alias for core operations
pub type Result<T> = std::result::Result<T, RehashError>;

/// Failures of the reconciliation core
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RehashError {
    #[error("Unsupported artifact kind ({kind}): content of this representation cannot be rewritten")]
    UnsupportedArtifactKind { kind: String },

    #[error("Unit '{unit}' has no content hash for type '{content_type}'")]
    MissingIdentifierTable { unit: String, content_type: String },

    #[error("Unit '{unit}' lists file '{file}' which is not in the output set")]
    MissingArtifact { unit: String, file: String },

    #[error("Unsupported hash function: {name}")]
    UnsupportedHashFunction { name: String },

    #[error("Unsupported digest encoding: {name}")]
    UnsupportedDigestEncoding { name: String },

    #[error("Digest length must be at least 1, got {length}")]
    InvalidDigestLength { length: usize },
}
