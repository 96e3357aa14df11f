//! Core engine for the workout canvas
//!
//! The canvas is a grid of typed cards streamed from a remote agent. This
//! crate owns the client-side model and its invariants:
//!
//! - tolerant decoding of cards and workout plan entities from loosely
//!   shaped JSON (`canvas`, `plan`)
//! - progressive reveal pacing for streamed agent steps (`stream`)
//! - optimistic action dispatch with rollback, per-card serialization, and
//!   a timed undo affordance (`actions`)
//! - scoped batch edits over prescription sets (`plan::edit`)
//!
//! The remote authority owns truth; snapshots win every reconciliation.

pub mod actions;
pub mod canvas;
pub mod config;
pub mod constants;
pub mod error;
pub mod plan;
pub mod stream;

pub use actions::{ActionDispatcher, ActionKind, ActionRequest, CanvasAuthority};
pub use canvas::{Card, CardStatus, CardType, CanvasCardData, CanvasStore};
pub use config::{CanvasConfig, EditConfig, RevealConfig, UndoConfig};
pub use error::CanvasError;
pub use plan::{EditScope, EditValue, PlanExercise, PlanSet, SetType};
pub use stream::{RevealScheduler, StreamRunner, StreamTransport};
