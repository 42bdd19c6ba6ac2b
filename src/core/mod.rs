//! Core hash reconciliation logic.
//!
//! This module contains:
//! - Digest: content hashing with configurable function/encoding/length
//! - Content: reading and literal rewriting of artifact content
//! - Identifier: resolving the hash a file was originally named with
//! - Substitution: old -> new hash mapping for one invocation
//! - Ordering: unit processing order
//! - Reconciler: main driver

pub mod content;
pub mod digest;
pub mod error;
pub mod identifier;
pub mod ordering;
pub mod reconciler;
pub mod substitution;

// Re-export commonly used types
pub use content::{ensure_supported, read_text, substitute_all};
pub use digest::{digest, ContentDigest, DigestEncoding, HashFunction, HashOptions, HashOverrides};
pub use error::RehashError;
pub use identifier::{extension, old_identifier, ContentTypes, HashStrategy, OldIdentifier};
pub use ordering::{compare_units, processing_order};
pub use reconciler::{ReconcileOptions, Reconciler};
pub use substitution::{SubstitutionKey, SubstitutionMap};
