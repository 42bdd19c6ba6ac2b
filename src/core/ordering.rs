//! Processing order of output units.
//!
//! Runtime units embed the names of every other unit, so they go last.
//! Ties are broken by unit id.

use std::cmp::Ordering;

use crate::domain::OutputUnit;

/// Compare two units for processing order
pub fn compare_units(a: &OutputUnit, b: &OutputUnit) -> Ordering {
    a.has_runtime
        .cmp(&b.has_runtime)
        .then_with(|| a.id.cmp(&b.id))
}

/// Indices of `units` in processing order
pub fn processing_order(units: &[OutputUnit]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..units.len()).collect();
    order.sort_by(|&a, &b| compare_units(&units[a], &units[b]));
    order
}
