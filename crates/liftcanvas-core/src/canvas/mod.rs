//! Canvas card model and session store
//!
//! - `card`: the card envelope (type, status, lane, width, actions, meta)
//! - `data`: the closed sum type of card content variants with tolerant
//!   decoding and the decode-failure placeholder
//! - `routine`: multi-day routine draft summaries with stable workout ids
//! - `store`: the session-scoped store all card mutations go through

mod card;
mod data;
mod routine;
mod store;

pub use card::{ActionStyle, Card, CardAction, CardMeta, CardStatus, CardType, CardWidth, Lane};
pub use data::{
    AgentMessageData, AgentStreamData, AgentStreamStep, AnalysisSummaryData, CanvasCardData,
    ChatTranscriptData, ClarifyQuestion, ClarifyQuestionsData, DecodeFailedData, GroupHeaderData,
    InlineInfoData, OptionItem, OptionListData, ProgramDayData, RoutineOverviewData,
    SessionPlanData, StepKind, SuggestionData, TextData, TranscriptMessage, VisualizationData,
};
pub use routine::{RoutineMode, RoutineSummaryData, RoutineWorkoutSummary};
pub use store::{CanvasStore, SnapshotDiff, WorkingPhase};
