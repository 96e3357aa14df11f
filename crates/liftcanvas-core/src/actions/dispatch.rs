//! Action dispatch and reconciliation against the remote authority
//!
//! Every dispatch performs an optimistic local transition, sends the RPC,
//! and either keeps the transition (success, authoritative state arrives
//! with the next snapshot) or rolls it back (failure, surfaced to the
//! user). There is no client-side undo stack: `UNDO` is just another
//! action; the authority reverses its own last mutation and the next
//! snapshot is the truth.
//!
//! Per-card serialization: a second action against the same card waits for
//! the first to settle; actions against different cards run concurrently.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::{debug, warn};

use super::types::{ActionKind, ActionOutcome, ActionRequest, GROUP_ID_KEY};
use crate::canvas::{CanvasStore, CardStatus};
use crate::config::UndoConfig;
use crate::constants::dispatch::UNDO_WINDOW;
use crate::error::CanvasError;

/// Undo serializes on a canvas-level key since it targets no card
const CANVAS_KEY: &str = "\u{0}canvas";

/// Remote authority for canvas actions. Transport timeouts and retries are
/// its responsibility; the engine only consumes the settled outcome.
#[async_trait]
pub trait CanvasAuthority: Send + Sync {
    async fn apply_action(
        &self,
        canvas_id: &str,
        request: &ActionRequest,
    ) -> Result<ActionOutcome, CanvasError>;
}

/// Timed window during which an "Undo" control is offered after a
/// successful mutating action
#[derive(Debug, Clone)]
pub struct UndoAffordance {
    /// Wire spelling of the action being undone, for the control label
    pub undone_action: String,
    armed_at: Instant,
    window: Duration,
}

impl UndoAffordance {
    fn new(undone_action: String, window: Duration) -> Self {
        UndoAffordance {
            undone_action,
            armed_at: Instant::now(),
            window,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.armed_at.elapsed() >= self.window
    }
}

/// Translates user gestures into authority RPCs with optimistic local
/// effects
pub struct ActionDispatcher {
    store: Arc<CanvasStore>,
    authority: Arc<dyn CanvasAuthority>,
    /// Per-key async locks serializing in-flight actions
    in_flight: DashMap<String, Arc<tokio::sync::Mutex<()>>>,
    undo: Mutex<Option<UndoAffordance>>,
    undo_window: Duration,
}

impl ActionDispatcher {
    pub fn new(store: Arc<CanvasStore>, authority: Arc<dyn CanvasAuthority>) -> Self {
        ActionDispatcher {
            store,
            authority,
            in_flight: DashMap::new(),
            undo: Mutex::new(None),
            undo_window: UNDO_WINDOW,
        }
    }

    /// Override the undo window (tests, product experiments)
    pub fn with_undo_window(mut self, window: Duration) -> Self {
        self.undo_window = window;
        self
    }

    /// Undo window from the `[undo]` config section
    pub fn with_undo_config(self, config: &UndoConfig) -> Self {
        self.with_undo_window(Duration::from_secs(config.window_secs))
    }

    /// Accept a single proposal card
    pub async fn accept(&self, card_id: &str) -> Result<ActionOutcome, CanvasError> {
        self.single(card_id, ActionKind::AcceptProposal, CardStatus::Accepted)
            .await
    }

    /// Reject a single proposal card
    pub async fn reject(&self, card_id: &str) -> Result<ActionOutcome, CanvasError> {
        self.single(card_id, ActionKind::RejectProposal, CardStatus::Rejected)
            .await
    }

    /// Accept every card sharing the triggering card's group
    pub async fn accept_all(&self, card_id: &str) -> Result<ActionOutcome, CanvasError> {
        self.group(card_id, ActionKind::AcceptAll, CardStatus::Accepted)
            .await
    }

    /// Reject every card sharing the triggering card's group
    pub async fn reject_all(&self, card_id: &str) -> Result<ActionOutcome, CanvasError> {
        self.group(card_id, ActionKind::RejectAll, CardStatus::Rejected)
            .await
    }

    /// Free-form respond-to-agent action (clarify-question submit/skip).
    /// The payload carries the question id and answers verbatim.
    pub async fn respond(
        &self,
        kind: impl Into<String>,
        card_id: &str,
        payload: HashMap<String, String>,
    ) -> Result<ActionOutcome, CanvasError> {
        let lock = self.lock_for(card_id);
        let _guard = lock.lock().await;

        let mut request =
            ActionRequest::new(ActionKind::Respond(kind.into())).with_card(card_id);
        request.payload = payload;

        let outcome = self
            .authority
            .apply_action(self.store.canvas_id(), &request)
            .await?;

        // The answered card is done; the next snapshot is authoritative
        if let Err(err) = self.store.set_status(card_id, CardStatus::Completed) {
            debug!(card = card_id, error = %err, "respond target gone before completion mark");
        }
        Ok(outcome)
    }

    /// Fire `UNDO` with no target. Only valid while the affordance from the
    /// last successful mutating action is live; the authority reverses its
    /// own last recorded mutation and the next snapshot restores state.
    pub async fn undo(&self) -> Result<ActionOutcome, CanvasError> {
        match self.undo.lock().take() {
            Some(affordance) if !affordance.is_expired() => {}
            _ => {
                return Err(CanvasError::InvalidAction(
                    "nothing to undo".to_string(),
                ))
            }
        }

        let lock = self.lock_for(CANVAS_KEY);
        let _guard = lock.lock().await;

        let request = ActionRequest::new(ActionKind::Undo);
        self.authority
            .apply_action(self.store.canvas_id(), &request)
            .await
    }

    /// Whether an undo control should currently be offered
    pub fn undo_available(&self) -> bool {
        self.undo
            .lock()
            .as_ref()
            .is_some_and(|a| !a.is_expired())
    }

    async fn single(
        &self,
        card_id: &str,
        kind: ActionKind,
        optimistic: CardStatus,
    ) -> Result<ActionOutcome, CanvasError> {
        let lock = self.lock_for(card_id);
        let _guard = lock.lock().await;

        let prior = self.store.set_status(card_id, optimistic)?;
        let request = ActionRequest::new(kind.clone()).with_card(card_id);

        match self
            .authority
            .apply_action(self.store.canvas_id(), &request)
            .await
        {
            Ok(outcome) => {
                self.arm_undo(&kind);
                Ok(outcome)
            }
            Err(err) => {
                warn!(card = card_id, action = %kind, error = %err, "dispatch failed, rolling back");
                self.store
                    .restore_statuses(&[(card_id.to_string(), prior)]);
                Err(err)
            }
        }
    }

    async fn group(
        &self,
        card_id: &str,
        kind: ActionKind,
        optimistic: CardStatus,
    ) -> Result<ActionOutcome, CanvasError> {
        // Resolve the group from the triggering card's meta before dispatch
        let card = self
            .store
            .card(card_id)
            .ok_or_else(|| CanvasError::CardNotFound(card_id.to_string()))?;
        let group_id = card
            .group_id()
            .ok_or_else(|| CanvasError::NoGroup(card_id.to_string()))?
            .to_string();

        let lock = self.lock_for(&format!("group:{}", group_id));
        let _guard = lock.lock().await;

        let members = self.store.group_members(&group_id);
        let mut priors = Vec::with_capacity(members.len());
        for member in &members {
            match self.store.set_status(member, optimistic) {
                Ok(prior) => priors.push((member.clone(), prior)),
                Err(err) => {
                    // A member vanished mid-resolution; undo what we did
                    self.store.restore_statuses(&priors);
                    return Err(err);
                }
            }
        }

        // Group actions address the group id, never a card id
        let request =
            ActionRequest::new(kind.clone()).with_payload_entry(GROUP_ID_KEY, &group_id);

        match self
            .authority
            .apply_action(self.store.canvas_id(), &request)
            .await
        {
            Ok(outcome) => {
                self.arm_undo(&kind);
                Ok(outcome)
            }
            Err(err) => {
                warn!(group = %group_id, action = %kind, error = %err, "group dispatch failed, rolling back");
                self.store.restore_statuses(&priors);
                Err(err)
            }
        }
    }

    fn arm_undo(&self, kind: &ActionKind) {
        if kind.is_mutating() {
            *self.undo.lock() = Some(UndoAffordance::new(
                kind.as_wire().to_string(),
                self.undo_window,
            ));
        }
    }

    fn lock_for(&self, key: &str) -> Arc<tokio::sync::Mutex<()>> {
        self.in_flight
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }
}
