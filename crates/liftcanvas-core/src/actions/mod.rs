//! User action dispatch and reconciliation
//!
//! - `types`: the action vocabulary shared with the remote authority
//! - `dispatch`: optimistic local transitions, the authority RPC, rollback
//!   on failure, and the timed undo affordance

mod dispatch;
mod types;

pub use dispatch::{ActionDispatcher, CanvasAuthority, UndoAffordance};
pub use types::{ActionKind, ActionOutcome, ActionRequest, GROUP_ID_KEY};
