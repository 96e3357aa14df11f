//! Exercise prescription model and legacy-shape expansion
//!
//! The modern wire shape carries `sets` as an explicit array. A legacy shape
//! instead carried an integer set count (`sets: 3` or `set_count: 3`) with
//! flat `reps`/`rir`/`weight` scalars at the exercise level; decoding expands
//! that into N identical working sets. The legacy shape is decode-only.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use super::set::{as_f64, as_u32, PlanSet, SetType};
use crate::constants::prescription::DEFAULT_REPS;

/// One exercise within a session plan or routine draft
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanExercise {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exercise_id: Option<String>,
    pub name: String,
    pub sets: Vec<PlanSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_muscles: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equipment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coach_note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    /// Rest between sets, in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rest_between_sets: Option<u32>,
}

impl PlanExercise {
    /// Decode an exercise from any previously-accepted wire shape.
    /// Never fails: the explicit set array is tried first, then the legacy
    /// integer-count shape, then an empty set list.
    pub fn from_value(value: &Value) -> Self {
        let obj = value.as_object();

        let id = obj
            .and_then(|o| o.get("id"))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let name = obj
            .and_then(|o| o.get("name"))
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();

        let sets = decode_sets(value);

        PlanExercise {
            id,
            exercise_id: string_field(value, &["exerciseId", "exercise_id"]),
            name,
            sets,
            primary_muscles: field(value, &["primaryMuscles", "primary_muscles"])
                .and_then(Value::as_array)
                .map(|arr| {
                    arr.iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                }),
            equipment: string_field(value, &["equipment"]),
            coach_note: string_field(value, &["coachNote", "coach_note"]),
            position: field(value, &["position"]).and_then(as_u32),
            rest_between_sets: field(value, &["restBetweenSets", "rest_between_sets"])
                .and_then(as_u32),
        }
    }

    /// Sets participating in scope resolution (everything but warmups)
    pub fn working_set_indices(&self) -> Vec<usize> {
        self.sets
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.set_type.is_warmup())
            .map(|(i, _)| i)
            .collect()
    }
}

impl<'de> Deserialize<'de> for PlanExercise {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(PlanExercise::from_value(&value))
    }
}

/// Decode the set list: explicit array first, legacy count expansion only
/// after the array form is absent, never speculatively.
fn decode_sets(value: &Value) -> Vec<PlanSet> {
    let Some(obj) = value.as_object() else {
        return Vec::new();
    };

    if let Some(array) = obj.get("sets").and_then(Value::as_array) {
        return array.iter().map(PlanSet::from_value).collect();
    }

    // Legacy shape: integer count with flat scalars at the exercise level
    let count = obj
        .get("sets")
        .and_then(as_u32)
        .or_else(|| obj.get("set_count").and_then(as_u32));

    let Some(count) = count else {
        return Vec::new();
    };

    debug!(count, "expanding legacy integer set count");

    let reps = obj.get("reps").and_then(as_u32).unwrap_or(DEFAULT_REPS);
    let weight = obj.get("weight").and_then(as_f64);
    let rir = obj.get("rir").and_then(as_u32);

    (0..count)
        .map(|_| {
            let mut set = PlanSet::new(SetType::Working);
            set.reps = reps;
            set.weight = weight;
            set.rir = rir;
            set
        })
        .collect()
}

/// First present key among the accepted spellings (camelCase canonical,
/// snake_case legacy)
fn field<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    let obj = value.as_object()?;
    keys.iter().find_map(|key| obj.get(*key))
}

fn string_field(value: &Value, keys: &[&str]) -> Option<String> {
    field(value, keys)?
        .as_str()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
