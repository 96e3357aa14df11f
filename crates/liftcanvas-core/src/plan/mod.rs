//! Exercise prescription sub-model
//!
//! Tolerant decode/encode of sets and exercises across the historical wire
//! shapes, plus the scoped batch mutator for set-value edits:
//! - Decoding never fails for a previously-accepted shape
//! - Encoding only ever emits the canonical explicit-array shape
//! - Edits clamp, quantize, and track per-set customization

mod edit;
mod exercise;
mod set;

pub use edit::{apply_scoped_edit, scope_selectable, EditApplied, EditScope, EditValue};
pub use exercise::PlanExercise;
pub use set::{PlanSet, SetType};
