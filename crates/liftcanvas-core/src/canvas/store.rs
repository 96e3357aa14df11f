//! Canvas card store
//!
//! One explicit store per canvas session with a defined lifecycle
//! (`new` / `dispose`), passed by reference to consumers. All card-list
//! mutations serialize through the store's single mutex; the authoritative
//! state is always the next snapshot from the agent pipeline, which
//! overwrites any optimistic local transitions.
//!
//! The store also tracks the "working…" indicator per stream correlation
//! id. A stream's complete signal only means the agent finished talking:
//! the indicator stays up until a card referencing the correlation arrives
//! or an explicit terminal/error signal is received.

use std::collections::HashMap;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::card::{Card, CardStatus};
use crate::error::CanvasError;

/// Where a stream run currently stands, for indicator purposes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkingPhase {
    /// Transport still delivering progress
    Streaming,
    /// Agent finished talking; cards not seen yet
    AwaitingCards,
}

/// What changed when a snapshot was applied, keyed for re-render decisions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    /// Cards present before and after whose value compares unequal
    pub changed: Vec<String>,
}

#[derive(Default)]
struct Inner {
    cards: Vec<Card>,
    working: HashMap<String, WorkingPhase>,
    disposed: bool,
}

/// Session-scoped canvas state
pub struct CanvasStore {
    canvas_id: String,
    inner: Mutex<Inner>,
    cancel: CancellationToken,
}

impl CanvasStore {
    /// Create a store for one canvas session
    pub fn new(canvas_id: impl Into<String>) -> Self {
        let canvas_id = canvas_id.into();
        debug!(canvas = %canvas_id, "creating canvas store");
        CanvasStore {
            canvas_id,
            inner: Mutex::new(Inner::default()),
            cancel: CancellationToken::new(),
        }
    }

    pub fn canvas_id(&self) -> &str {
        &self.canvas_id
    }

    /// Child token for cooperative cancellation of timers tied to this
    /// store's lifetime (reveal schedulers)
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.child_token()
    }

    /// Tear the store down: further mutations are rejected and all child
    /// timers are cancelled
    pub fn dispose(&self) {
        info!(canvas = %self.canvas_id, "disposing canvas store");
        let mut inner = self.inner.lock();
        inner.disposed = true;
        inner.working.clear();
        self.cancel.cancel();
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.lock().disposed
    }

    /// Current card list, in canvas order
    pub fn cards(&self) -> Vec<Card> {
        self.inner.lock().cards.clone()
    }

    pub fn card(&self, card_id: &str) -> Option<Card> {
        self.inner
            .lock()
            .cards
            .iter()
            .find(|c| c.id == card_id)
            .cloned()
    }

    /// Ids of every card sharing the given group
    pub fn group_members(&self, group_id: &str) -> Vec<String> {
        self.inner
            .lock()
            .cards
            .iter()
            .filter(|c| c.group_id() == Some(group_id))
            .map(|c| c.id.clone())
            .collect()
    }

    /// Apply an authoritative snapshot. Always wins over any optimistic
    /// local state. Returns the diff so the UI can decide what to
    /// re-render or re-animate.
    pub fn apply_snapshot(&self, cards: Vec<Card>) -> Result<SnapshotDiff, CanvasError> {
        let mut inner = self.inner.lock();
        if inner.disposed {
            return Err(CanvasError::CanvasDisposed);
        }

        let mut diff = SnapshotDiff::default();
        for card in &cards {
            match inner.cards.iter().find(|c| c.id == card.id) {
                None => diff.added.push(card.id.clone()),
                Some(prev) if prev != card => diff.changed.push(card.id.clone()),
                Some(_) => {}
            }
        }
        for prev in &inner.cards {
            if !cards.iter().any(|c| c.id == prev.id) {
                diff.removed.push(prev.id.clone());
            }
        }

        Self::settle_working(&mut inner, &cards);
        inner.cards = cards;

        debug!(
            canvas = %self.canvas_id,
            added = diff.added.len(),
            removed = diff.removed.len(),
            changed = diff.changed.len(),
            "applied snapshot"
        );
        Ok(diff)
    }

    /// Apply one incremental card event: replace in place (position kept)
    /// or append
    pub fn upsert_card(&self, card: Card) -> Result<(), CanvasError> {
        let mut inner = self.inner.lock();
        if inner.disposed {
            return Err(CanvasError::CanvasDisposed);
        }
        Self::settle_working(&mut inner, std::slice::from_ref(&card));
        match inner.cards.iter_mut().find(|c| c.id == card.id) {
            Some(slot) => *slot = card,
            None => inner.cards.push(card),
        }
        Ok(())
    }

    /// Remove a card (superseded or expired server-side)
    pub fn remove_card(&self, card_id: &str) -> Result<bool, CanvasError> {
        let mut inner = self.inner.lock();
        if inner.disposed {
            return Err(CanvasError::CanvasDisposed);
        }
        let before = inner.cards.len();
        inner.cards.retain(|c| c.id != card_id);
        Ok(inner.cards.len() != before)
    }

    /// Optimistic status transition; returns the prior status so a failed
    /// dispatch can roll back
    pub fn set_status(&self, card_id: &str, status: CardStatus) -> Result<CardStatus, CanvasError> {
        let mut inner = self.inner.lock();
        if inner.disposed {
            return Err(CanvasError::CanvasDisposed);
        }
        let card = inner
            .cards
            .iter_mut()
            .find(|c| c.id == card_id)
            .ok_or_else(|| CanvasError::CardNotFound(card_id.to_string()))?;
        let prior = card.status;
        card.status = status;
        Ok(prior)
    }

    /// Roll a set of optimistic transitions back after a failed dispatch
    pub fn restore_statuses(&self, prior: &[(String, CardStatus)]) {
        let mut inner = self.inner.lock();
        for (card_id, status) in prior {
            if let Some(card) = inner.cards.iter_mut().find(|c| &c.id == card_id) {
                card.status = *status;
            } else {
                warn!(canvas = %self.canvas_id, card = %card_id, "rollback target no longer present");
            }
        }
    }

    // ------------------------------------------------------------------
    // Working indicator
    // ------------------------------------------------------------------

    /// A stream run started for this correlation token
    pub fn begin_working(&self, correlation_id: impl Into<String>) {
        let mut inner = self.inner.lock();
        if inner.disposed {
            return;
        }
        inner
            .working
            .insert(correlation_id.into(), WorkingPhase::Streaming);
    }

    /// The agent finished talking. NOT the same as cards being ready: the
    /// indicator stays up until cards arrive or an error is signalled.
    pub fn note_stream_complete(&self, correlation_id: &str) {
        let mut inner = self.inner.lock();
        if let Some(phase) = inner.working.get_mut(correlation_id) {
            *phase = WorkingPhase::AwaitingCards;
        }
    }

    /// Terminal failure: clear the indicator so the user is not left with
    /// a stuck "working…" state
    pub fn note_stream_error(&self, correlation_id: &str) {
        let mut inner = self.inner.lock();
        if inner.working.remove(correlation_id).is_some() {
            warn!(canvas = %self.canvas_id, correlation = %correlation_id, "stream run failed");
        }
    }

    /// Current phase for a correlation token, if still pending
    pub fn working_phase(&self, correlation_id: &str) -> Option<WorkingPhase> {
        self.inner.lock().working.get(correlation_id).copied()
    }

    /// Whether any stream run is still pending cards
    pub fn is_working(&self) -> bool {
        !self.inner.lock().working.is_empty()
    }

    /// Arriving cards settle the pending runs they reference via
    /// `meta.artifact_id` / `meta.conversation_id`
    fn settle_working(inner: &mut Inner, cards: &[Card]) {
        if inner.working.is_empty() {
            return;
        }
        inner.working.retain(|correlation, _| {
            let referenced = cards
                .iter()
                .any(|c| c.meta.as_ref().is_some_and(|m| m.references(correlation)));
            if referenced {
                debug!(correlation = %correlation, "cards arrived, clearing working indicator");
            }
            !referenced
        });
    }
}
