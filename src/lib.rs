//! rehash - Post-build content hash reconciliation
//!
//! Recomputes the content hashes embedded in build-output file names once
//! the artifacts hold their final bytes, and propagates every changed hash
//! to the files that reference it (source maps, runtime manifests).
//!
//! # Architecture
//!
//! The host build hands over a snapshot of its output units and artifacts
//! and calls [`Reconciler::reconcile`] once:
//! - Units are ordered so runtime units are finalized last
//! - Known substitutions are replayed before a unit is hashed
//! - Main files are digested and renamed; secondary files are rewritten
//! - Renames are returned to the host, content is rewritten in place
//!
//! # Modules
//!
//! - `core`: Digest engine, content accessor, reconciler
//! - `domain`: Data structures (Artifact, OutputUnit, OutputSet)
//! - `config`: Layered configuration
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Reconcile a build snapshot and print the report
//! rehash reconcile dist/snapshot.json
//!
//! # Digest a single file with the configured options
//! rehash digest dist/app.js
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;

// Re-export main types at crate root for convenience
pub use self::core::{HashOptions, HashStrategy, ReconcileOptions, Reconciler, RehashError};
pub use domain::{Artifact, OutputSet, OutputUnit, Rename, RenameSet, UnitId};
