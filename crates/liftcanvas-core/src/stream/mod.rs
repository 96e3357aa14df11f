//! Streaming ingestion and progressive reveal
//!
//! - `ingest`: the transport contract and the wiring of a run's terminal
//!   outcome into the store's working indicator
//! - `reveal`: deterministic pacing of streamed agent steps into a growing
//!   visible prefix

mod ingest;
mod reveal;

pub use ingest::{StreamProgress, StreamRequest, StreamRunner, StreamStatus, StreamTransport};
pub use reveal::{reveal_offsets, Clock, RevealEvent, RevealScheduler, TokioClock, VisiblePrefix};
