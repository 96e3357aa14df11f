//! Canvas card model
//!
//! A card is the atomic unit of canvas content. The envelope decodes
//! tolerantly (missing optionals default, unknown widths fall back with a
//! warning) while the `data` payload goes through the variant decoder in
//! `canvas::data`, which resolves undecodable payloads to a placeholder
//! rather than dropping the card.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use tracing::warn;

use super::data::CanvasCardData;
use crate::constants::layout::{SPAN_FULL, SPAN_ONE_HALF, SPAN_ONE_THIRD};

/// Closed set of card content kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardType {
    Instruction,
    AnalysisTask,
    Visualization,
    Table,
    Summary,
    FollowUpPrompt,
    SessionPlan,
    CurrentExercise,
    SetTarget,
    SetResult,
    Note,
    CoachProposal,
    RoutineSummary,
    AnalysisSummary,
}

/// Card lifecycle status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardStatus {
    #[default]
    Proposed,
    Active,
    Accepted,
    Rejected,
    Expired,
    Completed,
}

impl CardStatus {
    /// Terminal statuses are immutable once reached, except via UNDO at the
    /// authority
    pub fn is_terminal(&self) -> bool {
        !matches!(self, CardStatus::Proposed | CardStatus::Active)
    }
}

/// Logical grouping of cards, independent of visual layout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lane {
    #[default]
    Workout,
    Analysis,
    System,
}

/// Server-assigned relative sizing hint, mapped to a fixed column span
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CardWidth {
    OneThird,
    OneHalf,
    #[default]
    Full,
}

impl CardWidth {
    /// Column span on the 12-unit grid
    pub fn span(&self) -> u8 {
        match self {
            CardWidth::OneThird => SPAN_ONE_THIRD,
            CardWidth::OneHalf => SPAN_ONE_HALF,
            CardWidth::Full => SPAN_FULL,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            CardWidth::OneThird => "one_third",
            CardWidth::OneHalf => "one_half",
            CardWidth::Full => "full",
        }
    }

    /// Tolerant decode from the named form or the numeric span
    fn from_value(value: &Value) -> CardWidth {
        match value {
            Value::String(s) => match s.as_str() {
                "one_third" | "one-third" | "third" => CardWidth::OneThird,
                "one_half" | "one-half" | "half" => CardWidth::OneHalf,
                "full" => CardWidth::Full,
                other => {
                    warn!(width = other, "unknown card width, falling back to full");
                    CardWidth::Full
                }
            },
            Value::Number(n) => match n.as_u64() {
                Some(4) => CardWidth::OneThird,
                Some(6) => CardWidth::OneHalf,
                Some(12) => CardWidth::Full,
                _ => {
                    warn!(width = %n, "unknown column span, falling back to full");
                    CardWidth::Full
                }
            },
            _ => CardWidth::Full,
        }
    }
}

impl Serialize for CardWidth {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CardWidth {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(CardWidth::from_value(&value))
    }
}

/// Visual weight of a card action control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStyle {
    Primary,
    Secondary,
    Ghost,
    Destructive,
}

/// A user-facing control on a card (primary/secondary row or overflow menu)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardAction {
    pub id: String,
    /// Open string tag: `accept`, `reject`, `explain`, `pin`,
    /// `submit_answers`, `accept_all`, ...
    pub kind: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<ActionStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Passed back verbatim when the action fires
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<HashMap<String, String>>,
}

/// Card metadata envelope. The wire spells keys in camelCase; the
/// snake_case spellings are accepted as aliases for older payloads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardMeta {
    /// Links sibling cards for batch accept/reject
    #[serde(default, alias = "group_id", skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default = "default_true")]
    pub dismissible: bool,
    /// Coach narrative attached to the card
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Back-reference to the authoritative source record
    #[serde(default, alias = "artifact_id", skip_serializing_if = "Option::is_none")]
    pub artifact_id: Option<String>,
    #[serde(default, alias = "conversation_id", skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

fn default_true() -> bool {
    true
}

impl CardMeta {
    /// Whether this card references the given stream correlation token
    pub fn references(&self, correlation_id: &str) -> bool {
        self.artifact_id.as_deref() == Some(correlation_id)
            || self.conversation_id.as_deref() == Some(correlation_id)
    }
}

/// One unit of canvas content
///
/// Full structural equality (including the nested variant payload) decides
/// whether a re-render/re-animation is needed after a snapshot refresh.
/// Status and field updates produce a new card value; the chosen `data`
/// variant is immutable for a card instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    #[serde(rename = "type")]
    pub card_type: CardType,
    pub status: CardStatus,
    pub lane: Lane,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub width: CardWidth,
    pub data: CanvasCardData,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<CardAction>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub menu_items: Vec<CardAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<CardMeta>,
    /// Server timestamp; absent for client-synthesized cards
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
}

impl Card {
    /// Return a copy with a new status (cards are value types; the list
    /// holder swaps the old value out)
    pub fn with_status(&self, status: CardStatus) -> Card {
        let mut card = self.clone();
        card.status = status;
        card
    }

    /// Group id from meta, if any
    pub fn group_id(&self) -> Option<&str> {
        self.meta.as_ref()?.group_id.as_deref()
    }
}

/// Envelope fields as they arrive; `data` stays raw until the variant
/// decoder normalizes it.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCard {
    id: String,
    #[serde(rename = "type")]
    card_type: CardType,
    #[serde(default)]
    status: CardStatus,
    #[serde(default)]
    lane: Lane,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    subtitle: Option<String>,
    #[serde(default)]
    width: CardWidth,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    actions: Vec<CardAction>,
    #[serde(default, alias = "menu_items")]
    menu_items: Vec<CardAction>,
    #[serde(default)]
    meta: Option<CardMeta>,
    #[serde(default, alias = "published_at")]
    published_at: Option<DateTime<Utc>>,
}

impl<'de> Deserialize<'de> for Card {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawCard::deserialize(deserializer)?;
        let data = CanvasCardData::decode(&raw.id, raw.card_type, raw.data);
        Ok(Card {
            id: raw.id,
            card_type: raw.card_type,
            status: raw.status,
            lane: raw.lane,
            title: raw.title,
            subtitle: raw.subtitle,
            width: raw.width,
            data,
            actions: raw.actions,
            menu_items: raw.menu_items,
            meta: raw.meta,
            published_at: raw.published_at,
        })
    }
}
