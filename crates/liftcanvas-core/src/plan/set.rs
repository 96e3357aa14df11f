//! Prescribed set model and tolerant wire decoding
//!
//! Sets have shipped in at least three wire shapes over time: flat fields,
//! fields nested under a `target` wrapper, and a `weight_kg` alternate key.
//! Decoding normalizes all of them into the one canonical shape; encoding
//! only ever emits the canonical shape.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::constants::prescription::DEFAULT_REPS;

/// Kind of prescribed set. The canonical spelling is kebab-case for the
/// two-word kinds; snake_case is accepted as a decode alias.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetType {
    Warmup,
    #[default]
    Working,
    #[serde(rename = "drop-set", alias = "drop_set")]
    DropSet,
    #[serde(rename = "failure-set", alias = "failure_set")]
    FailureSet,
}

impl SetType {
    /// Warmup sets never carry RIR and never follow the base prescription
    pub fn is_warmup(&self) -> bool {
        matches!(self, SetType::Warmup)
    }
}

/// One prescribed set within an exercise
///
/// The `actual_*` fields exist only once the plan has become an active
/// workout; until then they stay `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSet {
    pub id: String,
    #[serde(rename = "type")]
    pub set_type: SetType,
    pub reps: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rir: Option<u32>,
    /// Whether this set still follows the exercise's base prescription.
    /// Always false for warmup sets.
    pub is_linked_to_base: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_reps: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_rir: Option<u32>,
}

impl PlanSet {
    /// Create a set with default prescription values
    pub fn new(set_type: SetType) -> Self {
        PlanSet {
            id: Uuid::new_v4().to_string(),
            set_type,
            reps: DEFAULT_REPS,
            weight: None,
            rir: None,
            is_linked_to_base: !set_type.is_warmup(),
            is_completed: None,
            actual_reps: None,
            actual_weight: None,
            actual_rir: None,
        }
        .normalized()
    }

    /// Decode a set from any previously-accepted wire shape. Never fails:
    /// missing or malformed fields resolve to defaults, a missing id is
    /// generated fresh.
    pub fn from_value(value: &Value) -> Self {
        let set_type = lookup(value, &["type"])
            .and_then(|v| serde_json::from_value::<SetType>(v.clone()).ok())
            .unwrap_or_default();

        let id = lookup(value, &["id"])
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let reps = lookup(value, &["reps"])
            .and_then(as_u32)
            .unwrap_or(DEFAULT_REPS);

        // Weight falls through one extra alternate key used by older payloads
        let weight = lookup(value, &["weight"])
            .or_else(|| lookup(value, &["weight_kg"]))
            .and_then(as_f64);

        let rir = lookup(value, &["rir"]).and_then(as_u32);

        let is_linked_to_base = lookup(value, &["isLinkedToBase", "is_linked_to_base"])
            .and_then(Value::as_bool)
            .unwrap_or(!set_type.is_warmup());

        if !value.is_object() {
            debug!("set payload is not an object, decoding to defaults");
        }

        PlanSet {
            id,
            set_type,
            reps,
            weight,
            rir,
            is_linked_to_base,
            is_completed: lookup(value, &["isCompleted", "is_completed"])
                .and_then(Value::as_bool),
            actual_reps: lookup(value, &["actualReps", "actual_reps"]).and_then(as_u32),
            actual_weight: lookup(value, &["actualWeight", "actual_weight"]).and_then(as_f64),
            actual_rir: lookup(value, &["actualRir", "actual_rir"]).and_then(as_u32),
        }
        .normalized()
    }

    /// Enforce structural invariants: warmup sets never carry RIR and are
    /// never linked to the base prescription, regardless of wire input.
    fn normalized(mut self) -> Self {
        if self.set_type.is_warmup() {
            self.rir = None;
            self.is_linked_to_base = false;
        }
        self
    }
}

impl<'de> Deserialize<'de> for PlanSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(PlanSet::from_value(&value))
    }
}

/// Field lookup chain: each accepted spelling as a direct key first, then
/// the same spellings under the legacy `target` wrapper
pub(crate) fn lookup<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    let obj = value.as_object()?;
    keys.iter()
        .find_map(|key| obj.get(*key).filter(|v| !v.is_null()))
        .or_else(|| {
            let target = obj.get("target")?;
            keys.iter()
                .find_map(|key| target.get(*key).filter(|v| !v.is_null()))
        })
}

/// Tolerant numeric read: JSON number, or a string that parses as one
pub(crate) fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Tolerant unsigned read, rejecting negatives and non-finite values
pub(crate) fn as_u32(value: &Value) -> Option<u32> {
    let n = as_f64(value)?;
    if n.is_finite() && n >= 0.0 && n <= u32::MAX as f64 {
        Some(n.round() as u32)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_direct_fields() {
        let set = PlanSet::from_value(&json!({
            "id": "s1",
            "type": "working",
            "reps": 10,
            "weight": 62.5,
            "rir": 2,
        }));
        assert_eq!(set.id, "s1");
        assert_eq!(set.set_type, SetType::Working);
        assert_eq!(set.reps, 10);
        assert_eq!(set.weight, Some(62.5));
        assert_eq!(set.rir, Some(2));
        assert!(set.is_linked_to_base);
    }

    #[test]
    fn test_decode_target_wrapper() {
        let set = PlanSet::from_value(&json!({
            "id": "s1",
            "target": { "reps": 12, "weight": 40.0, "rir": 1 },
        }));
        assert_eq!(set.reps, 12);
        assert_eq!(set.weight, Some(40.0));
        assert_eq!(set.rir, Some(1));
    }

    #[test]
    fn test_decode_weight_kg_alternate_key() {
        let flat = PlanSet::from_value(&json!({ "id": "s1", "weight_kg": 80 }));
        assert_eq!(flat.weight, Some(80.0));

        let nested = PlanSet::from_value(&json!({ "id": "s1", "target": { "weight_kg": 77.5 } }));
        assert_eq!(nested.weight, Some(77.5));

        // Direct key always wins over the alternate
        let both = PlanSet::from_value(&json!({ "id": "s1", "weight": 60, "weight_kg": 80 }));
        assert_eq!(both.weight, Some(60.0));
    }

    #[test]
    fn test_decode_defaults() {
        let set = PlanSet::from_value(&json!({}));
        assert_eq!(set.reps, DEFAULT_REPS);
        assert_eq!(set.set_type, SetType::Working);
        assert_eq!(set.weight, None);
        assert_eq!(set.rir, None);
        assert!(set.is_linked_to_base);
        assert!(!set.id.is_empty());
    }

    #[test]
    fn test_missing_id_is_fresh_per_decode() {
        let payload = json!({ "reps": 5 });
        let a = PlanSet::from_value(&payload);
        let b = PlanSet::from_value(&payload);
        assert!(!a.id.is_empty());
        assert!(!b.id.is_empty());
        assert_ne!(a.id, b.id, "ids must never be reused across decodes");
    }

    #[test]
    fn test_warmup_invariants() {
        // Even a payload that claims otherwise gets normalized
        let set = PlanSet::from_value(&json!({
            "id": "w1",
            "type": "warmup",
            "rir": 3,
            "is_linked_to_base": true,
        }));
        assert!(set.set_type.is_warmup());
        assert_eq!(set.rir, None);
        assert!(!set.is_linked_to_base);
    }

    #[test]
    fn test_malformed_numerics_fall_back() {
        let set = PlanSet::from_value(&json!({
            "id": "s1",
            "reps": "lots",
            "weight": { "unexpected": true },
            "rir": -2,
        }));
        assert_eq!(set.reps, DEFAULT_REPS);
        assert_eq!(set.weight, None);
        assert_eq!(set.rir, None);
    }

    #[test]
    fn test_numeric_strings_accepted() {
        let set = PlanSet::from_value(&json!({ "id": "s1", "reps": "12", "weight": "52.5" }));
        assert_eq!(set.reps, 12);
        assert_eq!(set.weight, Some(52.5));
    }

    #[test]
    fn test_kebab_case_is_canonical_for_two_word_set_types() {
        let set = PlanSet::from_value(&json!({ "id": "s1", "type": "drop-set" }));
        assert_eq!(set.set_type, SetType::DropSet);
        let set = PlanSet::from_value(&json!({ "id": "s1", "type": "failure-set" }));
        assert_eq!(set.set_type, SetType::FailureSet);

        // Snake spellings are decode-only aliases
        let set = PlanSet::from_value(&json!({ "id": "s1", "type": "drop_set" }));
        assert_eq!(set.set_type, SetType::DropSet);

        assert_eq!(
            serde_json::to_value(SetType::DropSet).unwrap(),
            json!("drop-set")
        );
        assert_eq!(
            serde_json::to_value(SetType::FailureSet).unwrap(),
            json!("failure-set")
        );
    }

    #[test]
    fn test_camel_case_wire_keys() {
        let set = PlanSet::from_value(&json!({
            "id": "s1",
            "reps": 8,
            "isLinkedToBase": false,
            "isCompleted": true,
            "actualReps": 7,
            "actualWeight": 61.5,
            "actualRir": 1,
        }));
        assert!(!set.is_linked_to_base);
        assert_eq!(set.is_completed, Some(true));
        assert_eq!(set.actual_reps, Some(7));
        assert_eq!(set.actual_weight, Some(61.5));
        assert_eq!(set.actual_rir, Some(1));

        // Canonical encode spells the keys the same way
        let encoded = serde_json::to_value(&set).unwrap();
        assert_eq!(encoded["isLinkedToBase"], false);
        assert!(encoded.get("is_linked_to_base").is_none());
    }

    #[test]
    fn test_canonical_round_trip() {
        let mut set = PlanSet::new(SetType::Working);
        set.reps = 6;
        set.weight = Some(102.5);
        set.rir = Some(1);
        set.is_linked_to_base = false;

        let encoded = serde_json::to_value(&set).unwrap();
        let decoded: PlanSet = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, set);
    }
}
