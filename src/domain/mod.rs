//! Domain types for the rehash reconciler.
//!
//! This module contains the data handed over by the host build:
//! - Artifact: output content in one of its representations
//! - OutputUnit: files produced together
//! - OutputSet: units plus artifacts, and the renames applied to them

pub mod artifact;
pub mod output;
pub mod unit;

// Re-export commonly used types
pub use artifact::{Artifact, RawValue};
pub use output::{OutputSet, Rename, RenameSet};
pub use unit::{OutputUnit, UnitId};
