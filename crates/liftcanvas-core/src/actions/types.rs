//! Action protocol types
//!
//! Every user gesture becomes a named action addressed at a canvas and
//! optionally a card or a group. The wire spelling is the authority's
//! vocabulary (`ACCEPT_PROPOSAL`, ...); anything outside the closed set is
//! routed to "respond to agent" (clarify-question submit/skip).

use std::collections::HashMap;
use std::fmt;

/// Payload key carrying the group id for batch actions
pub const GROUP_ID_KEY: &str = "group_id";

/// Named user action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
    AcceptProposal,
    RejectProposal,
    AcceptAll,
    RejectAll,
    Undo,
    /// Free-form kind routed to "respond to agent" (e.g. `submit`, `skip`)
    Respond(String),
}

impl ActionKind {
    /// Wire spelling sent to the authority
    pub fn as_wire(&self) -> &str {
        match self {
            ActionKind::AcceptProposal => "ACCEPT_PROPOSAL",
            ActionKind::RejectProposal => "REJECT_PROPOSAL",
            ActionKind::AcceptAll => "ACCEPT_ALL",
            ActionKind::RejectAll => "REJECT_ALL",
            ActionKind::Undo => "UNDO",
            ActionKind::Respond(kind) => kind,
        }
    }

    /// Parse the authority's vocabulary; unknown values route to respond
    pub fn from_wire(value: &str) -> ActionKind {
        match value {
            "ACCEPT_PROPOSAL" => ActionKind::AcceptProposal,
            "REJECT_PROPOSAL" => ActionKind::RejectProposal,
            "ACCEPT_ALL" => ActionKind::AcceptAll,
            "REJECT_ALL" => ActionKind::RejectAll,
            "UNDO" => ActionKind::Undo,
            other => ActionKind::Respond(other.to_string()),
        }
    }

    /// Mutating actions arm the undo affordance after success
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            ActionKind::AcceptProposal
                | ActionKind::RejectProposal
                | ActionKind::AcceptAll
                | ActionKind::RejectAll
        )
    }

    /// Group actions target a `group_id` payload, never a card id
    pub fn is_group(&self) -> bool {
        matches!(self, ActionKind::AcceptAll | ActionKind::RejectAll)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

/// One action call: `(canvasId, type, cardId?, payload?)`
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRequest {
    pub kind: ActionKind,
    pub card_id: Option<String>,
    pub payload: HashMap<String, String>,
}

impl ActionRequest {
    pub fn new(kind: ActionKind) -> Self {
        ActionRequest {
            kind,
            card_id: None,
            payload: HashMap::new(),
        }
    }

    pub fn with_card(mut self, card_id: impl Into<String>) -> Self {
        self.card_id = Some(card_id.into());
        self
    }

    pub fn with_payload_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }
}

/// Authority response to an applied action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Fully applied; the next snapshot reflects it
    Applied,
    /// Partially applied; detail for the user-facing surface
    Partial(String),
}
