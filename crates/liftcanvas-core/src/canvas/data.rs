//! Card content variants
//!
//! `CanvasCardData` is a closed sum type; exactly one variant is populated
//! per card. The variant tag (`kind`) is independent of the card's `type`:
//! rendering uses both together and callers must not assume they agree.
//!
//! Decoding is tolerant: a payload without a `kind` tag falls back to a
//! historical mapping from the card type, and a payload that decodes under
//! no variant becomes `DecodeFailed` carrying the raw value, so the card
//! keeps its id and list position instead of being dropped.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use super::card::CardType;
use super::routine::RoutineSummaryData;
use crate::plan::PlanExercise;

/// Kind of agent stream step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Thinking,
    #[default]
    Info,
    Lookup,
    Result,
}

/// One step of a streamed agent narration, revealed progressively
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentStreamStep {
    #[serde(default = "fresh_id")]
    pub id: String,
    #[serde(default)]
    pub kind: StepKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Reveal pacing hint; the scheduler assumes 800ms when absent
    #[serde(default, alias = "duration_ms", skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

fn fresh_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextData {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizationData {
    /// Opaque rendering spec, owned by the visualization layer
    pub spec: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptMessage {
    pub role: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTranscriptData {
    pub messages: Vec<TranscriptMessage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionData {
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPlanData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus: Option<String>,
    pub exercises: Vec<PlanExercise>,
    #[serde(default, alias = "duration_minutes", skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentStreamData {
    pub steps: Vec<AgentStreamStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramDayData {
    pub day: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub exercises: Vec<PlanExercise>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionItem {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionListData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    pub options: Vec<OptionItem>,
    #[serde(default, alias = "multi_select")]
    pub multi_select: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InlineInfoData {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupHeaderData {
    pub title: String,
    #[serde(default, alias = "group_id", skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClarifyQuestion {
    pub id: String,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, alias = "allow_free_text")]
    pub allow_free_text: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClarifyQuestionsData {
    pub questions: Vec<ClarifyQuestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutineOverviewData {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentMessageData {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummaryData {
    pub headline: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub findings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Value>,
}

/// Placeholder for a payload that decoded under no variant. The raw value
/// is kept for diagnostics and the card stays in the list at its position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodeFailedData {
    /// Tag the payload claimed, when it had one
    #[serde(default, alias = "original_kind", skip_serializing_if = "Option::is_none")]
    pub original_kind: Option<String>,
    pub reason: String,
    #[serde(default)]
    pub raw: Value,
}

/// Canonical card content, one populated variant per card
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CanvasCardData {
    Text(TextData),
    Visualization(VisualizationData),
    ChatTranscript(ChatTranscriptData),
    Suggestion(SuggestionData),
    SessionPlan(SessionPlanData),
    AgentStream(AgentStreamData),
    ProgramDay(ProgramDayData),
    OptionList(OptionListData),
    InlineInfo(InlineInfoData),
    GroupHeader(GroupHeaderData),
    ClarifyQuestions(ClarifyQuestionsData),
    RoutineOverview(RoutineOverviewData),
    AgentMessage(AgentMessageData),
    RoutineSummary(RoutineSummaryData),
    AnalysisSummary(AnalysisSummaryData),
    DecodeFailed(DecodeFailedData),
}

impl CanvasCardData {
    /// Decode a card's data payload. Never fails: unknown tags, missing
    /// payloads, and malformed variants all resolve to `DecodeFailed`.
    ///
    /// `card_id` seeds stable ids for routine workout summaries.
    pub fn decode(card_id: &str, card_type: CardType, raw: Option<Value>) -> CanvasCardData {
        let Some(value) = raw else {
            return CanvasCardData::DecodeFailed(DecodeFailedData {
                original_kind: None,
                reason: "missing data payload".to_string(),
                raw: Value::Null,
            });
        };

        let tag = match value.get("kind").and_then(Value::as_str) {
            Some(tag) => tag.to_string(),
            None => {
                let inferred = legacy_tag(card_type);
                debug!(card = card_id, tag = inferred, "data payload has no kind tag, inferring from card type");
                inferred.to_string()
            }
        };

        match Self::decode_tagged(card_id, &tag, &value) {
            Ok(data) => data,
            Err(reason) => {
                warn!(card = card_id, tag = %tag, %reason, "card data failed to decode, keeping placeholder");
                CanvasCardData::DecodeFailed(DecodeFailedData {
                    original_kind: Some(tag),
                    reason,
                    raw: value,
                })
            }
        }
    }

    fn decode_tagged(card_id: &str, tag: &str, value: &Value) -> Result<CanvasCardData, String> {
        fn payload<T: DeserializeOwned>(value: &Value) -> Result<T, String> {
            serde_json::from_value(value.clone()).map_err(|e| e.to_string())
        }

        Ok(match tag {
            "text" => CanvasCardData::Text(payload(value)?),
            "visualization" => CanvasCardData::Visualization(payload(value)?),
            "chat_transcript" => CanvasCardData::ChatTranscript(payload(value)?),
            "suggestion" => CanvasCardData::Suggestion(payload(value)?),
            "session_plan" => CanvasCardData::SessionPlan(payload(value)?),
            "agent_stream" => CanvasCardData::AgentStream(payload(value)?),
            "program_day" => CanvasCardData::ProgramDay(payload(value)?),
            "option_list" => CanvasCardData::OptionList(payload(value)?),
            "inline_info" => CanvasCardData::InlineInfo(payload(value)?),
            "group_header" => CanvasCardData::GroupHeader(payload(value)?),
            "clarify_questions" => CanvasCardData::ClarifyQuestions(payload(value)?),
            "routine_overview" => CanvasCardData::RoutineOverview(payload(value)?),
            "agent_message" => CanvasCardData::AgentMessage(payload(value)?),
            "routine_summary" => {
                CanvasCardData::RoutineSummary(RoutineSummaryData::from_value(card_id, value)?)
            }
            "analysis_summary" => CanvasCardData::AnalysisSummary(payload(value)?),
            other => return Err(format!("unknown data kind: {}", other)),
        })
    }

    /// Whether this payload is the decode-failure placeholder
    pub fn is_decode_failed(&self) -> bool {
        matches!(self, CanvasCardData::DecodeFailed(_))
    }
}

/// Historical payloads predating the `kind` tag carried only the card type;
/// this mapping reconstructs the variant they meant. Consulted only when
/// the tag is absent.
fn legacy_tag(card_type: CardType) -> &'static str {
    match card_type {
        CardType::Instruction | CardType::Note | CardType::Summary => "text",
        CardType::AnalysisTask => "agent_stream",
        CardType::Visualization | CardType::Table => "visualization",
        CardType::FollowUpPrompt => "suggestion",
        CardType::SessionPlan | CardType::CoachProposal => "session_plan",
        CardType::CurrentExercise => "program_day",
        CardType::SetTarget | CardType::SetResult => "inline_info",
        CardType::RoutineSummary => "routine_summary",
        CardType::AnalysisSummary => "analysis_summary",
    }
}
