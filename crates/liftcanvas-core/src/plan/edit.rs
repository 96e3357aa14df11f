//! Scoped batch mutation of prescribed set values
//!
//! A single edited value (weight, reps, or RIR) is applied across a
//! user-chosen scope of sibling sets within one exercise. Warmup sets are
//! always edited in isolation and never offer a scope selector.
//!
//! Batch scopes (`Remaining`/`AllWorking`) force-overwrite the value on
//! every in-scope set, including sets previously detached from the base
//! prescription, and leave every set's link flag unchanged. Only a
//! `ThisOnly` edit detaches the edited set (`is_linked_to_base = false`).

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::exercise::PlanExercise;
use super::set::PlanSet;
use crate::config::EditConfig;
use crate::constants::prescription::{REPS_MAX, REPS_MIN, RIR_MAX};
use crate::error::CanvasError;

/// Which sibling sets an edit applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditScope {
    /// Only the edited set
    ThisOnly,
    /// Every non-warmup set at or after the edited set's index
    Remaining,
    /// Every non-warmup set in the exercise
    AllWorking,
}

/// The edited value, already typed to its field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditValue {
    /// Weight in kg
    Weight(f64),
    Reps(u32),
    Rir(u32),
}

impl EditValue {
    /// Clamp and quantize to the prescription limits; the weight quantum
    /// comes from the `[edit]` config section
    fn clamped(self, config: &EditConfig) -> EditValue {
        match self {
            EditValue::Weight(kg) => {
                let kg = kg.max(0.0);
                let quantum = config.weight_quantum_kg;
                let kg = if quantum > 0.0 {
                    (kg / quantum).round() * quantum
                } else {
                    kg
                };
                EditValue::Weight(kg)
            }
            EditValue::Reps(r) => EditValue::Reps(r.clamp(REPS_MIN, REPS_MAX)),
            EditValue::Rir(r) => EditValue::Rir(r.min(RIR_MAX)),
        }
    }

    fn write_to(self, set: &mut PlanSet) {
        match self {
            EditValue::Weight(kg) => set.weight = Some(kg),
            EditValue::Reps(r) => set.reps = r,
            // RIR is never surfaced on warmups; scope resolution already
            // excludes them so this write is safe.
            EditValue::Rir(r) => set.rir = Some(r),
        }
    }
}

/// Result of a scoped edit, for callers that surface what changed
#[derive(Debug, Clone, PartialEq)]
pub struct EditApplied {
    /// Scope actually used (warmup edits collapse to `ThisOnly`)
    pub scope: EditScope,
    /// Indices of the sets that were written
    pub touched: Vec<usize>,
}

/// Whether the scope selector may be offered for this set
pub fn scope_selectable(set: &PlanSet) -> bool {
    !set.set_type.is_warmup()
}

/// Apply one edited value across the resolved scope within an exercise
pub fn apply_scoped_edit(
    exercise: &mut PlanExercise,
    set_index: usize,
    value: EditValue,
    scope: EditScope,
    config: &EditConfig,
) -> Result<EditApplied, CanvasError> {
    let Some(edited) = exercise.sets.get(set_index) else {
        return Err(CanvasError::InvalidAction(format!(
            "set index {} out of range for exercise {}",
            set_index, exercise.id
        )));
    };

    if edited.set_type.is_warmup() && matches!(value, EditValue::Rir(_)) {
        return Err(CanvasError::InvalidAction(
            "rir is not editable on warmup sets".to_string(),
        ));
    }

    // Warmups are always edited in isolation regardless of selected scope
    let scope = if edited.set_type.is_warmup() {
        EditScope::ThisOnly
    } else {
        scope
    };

    let value = value.clamped(config);

    let touched: Vec<usize> = match scope {
        EditScope::ThisOnly => vec![set_index],
        EditScope::Remaining => exercise
            .working_set_indices()
            .into_iter()
            .filter(|&i| i >= set_index)
            .collect(),
        EditScope::AllWorking => exercise.working_set_indices(),
    };

    for &i in &touched {
        value.write_to(&mut exercise.sets[i]);
    }

    // Only an isolated edit marks the set as individually customized
    if scope == EditScope::ThisOnly {
        exercise.sets[set_index].is_linked_to_base = false;
    }

    debug!(
        exercise = %exercise.id,
        set_index,
        ?scope,
        touched = touched.len(),
        "applied scoped edit"
    );

    Ok(EditApplied { scope, touched })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn exercise_with_weights(weights: &[f64]) -> PlanExercise {
        let sets: Vec<_> = weights
            .iter()
            .map(|w| json!({ "reps": 8, "weight": w }))
            .collect();
        PlanExercise::from_value(&json!({ "id": "e1", "name": "Squat", "sets": sets }))
    }

    fn weights(ex: &PlanExercise) -> Vec<f64> {
        ex.sets.iter().map(|s| s.weight.unwrap()).collect()
    }

    fn edit(
        ex: &mut PlanExercise,
        set_index: usize,
        value: EditValue,
        scope: EditScope,
    ) -> Result<EditApplied, CanvasError> {
        apply_scoped_edit(ex, set_index, value, scope, &EditConfig::default())
    }

    #[test]
    fn test_remaining_scope_from_index() {
        let mut ex = exercise_with_weights(&[60.0, 60.0, 60.0, 60.0]);
        edit(&mut ex, 2, EditValue::Weight(70.0), EditScope::Remaining).unwrap();
        assert_eq!(weights(&ex), vec![60.0, 60.0, 70.0, 70.0]);
        // Batch scopes never alter link flags
        assert!(ex.sets.iter().all(|s| s.is_linked_to_base));
    }

    #[test]
    fn test_this_only_scope_detaches() {
        let mut ex = exercise_with_weights(&[60.0, 60.0, 60.0, 60.0]);
        edit(&mut ex, 2, EditValue::Weight(70.0), EditScope::ThisOnly).unwrap();
        assert_eq!(weights(&ex), vec![60.0, 60.0, 70.0, 60.0]);
        let flags: Vec<bool> = ex.sets.iter().map(|s| s.is_linked_to_base).collect();
        assert_eq!(flags, vec![true, true, false, true]);
    }

    #[test]
    fn test_all_working_scope() {
        let mut ex = exercise_with_weights(&[60.0, 62.5, 65.0, 67.5]);
        edit(&mut ex, 3, EditValue::Weight(70.0), EditScope::AllWorking).unwrap();
        assert_eq!(weights(&ex), vec![70.0, 70.0, 70.0, 70.0]);
    }

    #[test]
    fn test_batch_scope_overwrites_detached_sets_and_preserves_flags() {
        let mut ex = exercise_with_weights(&[60.0, 60.0, 60.0]);
        // Detach set 1 individually first
        edit(&mut ex, 1, EditValue::Weight(55.0), EditScope::ThisOnly).unwrap();
        assert!(!ex.sets[1].is_linked_to_base);

        // A later batch edit force-overwrites its value but leaves the
        // detachment flag as it was
        edit(&mut ex, 0, EditValue::Weight(65.0), EditScope::AllWorking).unwrap();
        assert_eq!(weights(&ex), vec![65.0, 65.0, 65.0]);
        assert!(ex.sets[0].is_linked_to_base);
        assert!(!ex.sets[1].is_linked_to_base);
        assert!(ex.sets[2].is_linked_to_base);
    }

    #[test]
    fn test_warmup_forced_this_only_and_skipped_by_scopes() {
        let mut ex = PlanExercise::from_value(&json!({
            "id": "e1",
            "name": "Squat",
            "sets": [
                { "type": "warmup", "reps": 5, "weight": 40.0 },
                { "reps": 8, "weight": 60.0 },
                { "reps": 8, "weight": 60.0 },
            ],
        }));

        // Editing the warmup with a batch scope collapses to ThisOnly
        let applied =
            edit(&mut ex, 0, EditValue::Weight(45.0), EditScope::AllWorking).unwrap();
        assert_eq!(applied.scope, EditScope::ThisOnly);
        assert_eq!(ex.sets[0].weight, Some(45.0));
        assert_eq!(ex.sets[1].weight, Some(60.0));
        assert!(!scope_selectable(&ex.sets[0]));
        assert!(scope_selectable(&ex.sets[1]));

        // A batch edit from a working set never touches the warmup
        edit(&mut ex, 1, EditValue::Weight(62.5), EditScope::AllWorking).unwrap();
        assert_eq!(ex.sets[0].weight, Some(45.0));
        assert_eq!(ex.sets[1].weight, Some(62.5));
        assert_eq!(ex.sets[2].weight, Some(62.5));
    }

    #[test]
    fn test_rir_rejected_on_warmup() {
        let mut ex = PlanExercise::from_value(&json!({
            "id": "e1",
            "name": "Squat",
            "sets": [{ "type": "warmup", "reps": 5 }],
        }));
        let err = edit(&mut ex, 0, EditValue::Rir(2), EditScope::ThisOnly);
        assert!(err.is_err());
    }

    #[test]
    fn test_clamping_and_quantization() {
        let mut ex = exercise_with_weights(&[60.0]);

        edit(&mut ex, 0, EditValue::Weight(61.3), EditScope::ThisOnly).unwrap();
        assert_eq!(ex.sets[0].weight, Some(61.5));

        edit(&mut ex, 0, EditValue::Weight(-10.0), EditScope::ThisOnly).unwrap();
        assert_eq!(ex.sets[0].weight, Some(0.0));

        edit(&mut ex, 0, EditValue::Reps(99), EditScope::ThisOnly).unwrap();
        assert_eq!(ex.sets[0].reps, REPS_MAX);

        edit(&mut ex, 0, EditValue::Reps(0), EditScope::ThisOnly).unwrap();
        assert_eq!(ex.sets[0].reps, REPS_MIN);

        edit(&mut ex, 0, EditValue::Rir(9), EditScope::ThisOnly).unwrap();
        assert_eq!(ex.sets[0].rir, Some(RIR_MAX));
    }

    #[test]
    fn test_configured_weight_quantum() {
        let mut ex = exercise_with_weights(&[60.0]);
        let config = EditConfig {
            weight_quantum_kg: 2.5,
        };

        // 61.3 snaps to the nearest 2.5 kg plate jump
        apply_scoped_edit(
            &mut ex,
            0,
            EditValue::Weight(61.3),
            EditScope::ThisOnly,
            &config,
        )
        .unwrap();
        assert_eq!(ex.sets[0].weight, Some(62.5));
    }

    #[test]
    fn test_out_of_range_index() {
        let mut ex = exercise_with_weights(&[60.0]);
        let err = edit(&mut ex, 5, EditValue::Reps(8), EditScope::ThisOnly);
        assert!(matches!(err, Err(CanvasError::InvalidAction(_))));
    }
}
