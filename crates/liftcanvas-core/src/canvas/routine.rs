//! Multi-day routine draft summary
//!
//! Workout summary ids must be stable across re-parses of the same draft
//! revision: list-diffing and animation keys break if they regenerate. Ids
//! derive from the server-assigned card id when present, else
//! deterministically from the day number. Never random.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::plan::PlanExercise;

/// Whether the draft creates a new routine or updates an existing one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RoutineMode {
    Create,
    #[serde(rename_all = "camelCase")]
    Update {
        #[serde(alias = "source_routine_id")]
        source_routine_id: String,
        #[serde(
            default,
            alias = "source_routine_name",
            skip_serializing_if = "Option::is_none"
        )]
        source_routine_name: Option<String>,
    },
}

impl Default for RoutineMode {
    fn default() -> Self {
        RoutineMode::Create
    }
}

/// One workout day within a routine draft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutineWorkoutSummary {
    /// Stable across re-parses of the same draft revision
    pub id: String,
    pub day: u32,
    pub title: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<PlanExercise>,
}

/// A multi-day routine draft as summarized on a card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutineSummaryData {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Sessions per week
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<u32>,
    pub workouts: Vec<RoutineWorkoutSummary>,
    #[serde(default, alias = "draft_id", skip_serializing_if = "Option::is_none")]
    pub draft_id: Option<String>,
    #[serde(default)]
    pub revision: u64,
    #[serde(flatten)]
    pub mode: RoutineMode,
}

impl RoutineSummaryData {
    /// Decode a routine summary, deriving stable workout ids from the card
    /// id when present, else from the day number.
    pub fn from_value(card_id: &str, value: &Value) -> Result<RoutineSummaryData, String> {
        #[derive(Deserialize)]
        struct RawWorkout {
            #[serde(default)]
            id: Option<String>,
            day: u32,
            #[serde(default)]
            title: Option<String>,
            #[serde(default)]
            blocks: Vec<PlanExercise>,
        }

        #[derive(Deserialize)]
        struct RawSummary {
            name: String,
            #[serde(default)]
            description: Option<String>,
            #[serde(default)]
            frequency: Option<u32>,
            #[serde(default)]
            workouts: Vec<RawWorkout>,
            #[serde(default, alias = "draftId")]
            draft_id: Option<String>,
            #[serde(default)]
            revision: u64,
            #[serde(default)]
            mode: Option<String>,
            #[serde(default, alias = "sourceRoutineId")]
            source_routine_id: Option<String>,
            #[serde(default, alias = "sourceRoutineName")]
            source_routine_name: Option<String>,
        }

        let raw: RawSummary = serde_json::from_value(value.clone()).map_err(|e| e.to_string())?;

        // An absent mode means create; update must name its source routine
        let mode = match raw.mode.as_deref() {
            None | Some("create") => RoutineMode::Create,
            Some("update") => RoutineMode::Update {
                source_routine_id: raw
                    .source_routine_id
                    .ok_or_else(|| "update mode without source_routine_id".to_string())?,
                source_routine_name: raw.source_routine_name,
            },
            Some(other) => return Err(format!("unknown routine mode: {}", other)),
        };

        let workouts = raw
            .workouts
            .into_iter()
            .map(|w| {
                let id = w
                    .id
                    .filter(|id| !id.is_empty())
                    .unwrap_or_else(|| stable_workout_id(card_id, w.day));
                RoutineWorkoutSummary {
                    id,
                    day: w.day,
                    title: w.title.unwrap_or_else(|| format!("Day {}", w.day)),
                    blocks: w.blocks,
                }
            })
            .collect();

        Ok(RoutineSummaryData {
            name: raw.name,
            description: raw.description,
            frequency: raw.frequency,
            workouts,
            draft_id: raw.draft_id,
            revision: raw.revision,
            mode,
        })
    }
}

/// Deterministic workout id: card-scoped when the server assigned a card
/// id, day-scoped otherwise
fn stable_workout_id(card_id: &str, day: u32) -> String {
    if card_id.is_empty() {
        format!("workout-day{}", day)
    } else {
        format!("{}-day{}", card_id, day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn draft() -> Value {
        json!({
            "name": "Upper/Lower Split",
            "description": "4-day strength block",
            "frequency": 4,
            "draft_id": "draft-9",
            "revision": 3,
            "workouts": [
                { "day": 1, "title": "Upper A" },
                { "day": 2, "title": "Lower A", "blocks": [
                    { "id": "e1", "name": "Squat", "set_count": 3, "reps": 5, "weight": 100 },
                ]},
            ],
        })
    }

    #[test]
    fn test_ids_stable_across_reparses() {
        let a = RoutineSummaryData::from_value("card-7", &draft()).unwrap();
        let b = RoutineSummaryData::from_value("card-7", &draft()).unwrap();
        assert_eq!(a.workouts[0].id, b.workouts[0].id);
        assert_eq!(a.workouts[1].id, b.workouts[1].id);
        assert_eq!(a.workouts[0].id, "card-7-day1");
    }

    #[test]
    fn test_ids_derive_from_day_without_card_id() {
        let parsed = RoutineSummaryData::from_value("", &draft()).unwrap();
        assert_eq!(parsed.workouts[0].id, "workout-day1");
        assert_eq!(parsed.workouts[1].id, "workout-day2");
    }

    #[test]
    fn test_explicit_workout_id_wins() {
        let mut value = draft();
        value["workouts"][0]["id"] = json!("srv-w1");
        let parsed = RoutineSummaryData::from_value("card-7", &value).unwrap();
        assert_eq!(parsed.workouts[0].id, "srv-w1");
        assert_eq!(parsed.workouts[1].id, "card-7-day2");
    }

    #[test]
    fn test_update_mode_carries_source() {
        let mut value = draft();
        value["mode"] = json!("update");
        value["sourceRoutineId"] = json!("routine-42");
        value["sourceRoutineName"] = json!("Old Split");
        let parsed = RoutineSummaryData::from_value("card-7", &value).unwrap();
        match parsed.mode {
            RoutineMode::Update {
                source_routine_id,
                source_routine_name,
            } => {
                assert_eq!(source_routine_id, "routine-42");
                assert_eq!(source_routine_name.as_deref(), Some("Old Split"));
            }
            RoutineMode::Create => panic!("expected update mode"),
        }
    }

    #[test]
    fn test_mode_defaults_to_create() {
        let parsed = RoutineSummaryData::from_value("card-7", &draft()).unwrap();
        assert_eq!(parsed.mode, RoutineMode::Create);
    }

    #[test]
    fn test_draft_id_spellings_and_canonical_encode() {
        // The fixture's snake spelling decodes
        let parsed = RoutineSummaryData::from_value("card-7", &draft()).unwrap();
        assert_eq!(parsed.draft_id.as_deref(), Some("draft-9"));

        // As does the camelCase spelling
        let mut value = draft();
        value.as_object_mut().unwrap().remove("draft_id");
        value["draftId"] = json!("draft-10");
        let parsed = RoutineSummaryData::from_value("card-7", &value).unwrap();
        assert_eq!(parsed.draft_id.as_deref(), Some("draft-10"));

        // Canonical encode emits camelCase only
        let encoded = serde_json::to_value(&parsed).unwrap();
        assert_eq!(encoded["draftId"], "draft-10");
        assert!(encoded.get("draft_id").is_none());
    }

    #[test]
    fn test_inline_blocks_decode() {
        let parsed = RoutineSummaryData::from_value("card-7", &draft()).unwrap();
        assert_eq!(parsed.workouts[1].blocks.len(), 1);
        assert_eq!(parsed.workouts[1].blocks[0].sets.len(), 3);
    }
}
