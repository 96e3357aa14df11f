//! Streaming transport contract and run wiring
//!
//! The transport that actually moves HTTP/SSE bytes is an external
//! collaborator; this module only defines the contract the engine consumes
//! and wires a run's terminal outcome into the store's working indicator.
//! Timeouts and retries are the transport's responsibility.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::canvas::CanvasStore;
use crate::error::CanvasError;

/// One streaming query to the agent pipeline. The correlation id is an
/// opaque token linking this run to the cards it eventually produces (via
/// `meta.artifact_id` / `meta.conversation_id`).
#[derive(Debug, Clone, PartialEq)]
pub struct StreamRequest {
    pub message: String,
    pub user_id: String,
    pub session_id: Option<String>,
    pub canvas_id: String,
    pub correlation_id: String,
}

/// Incremental progress from the agent while a run is live
#[derive(Debug, Clone, PartialEq)]
pub struct StreamProgress {
    pub text: String,
    pub action_label: Option<String>,
}

/// Terminal status of a stream run. `Completed` only means the agent
/// finished talking, not that cards were produced.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamStatus {
    Completed,
    Error(String),
}

/// External streaming transport
#[async_trait]
pub trait StreamTransport: Send + Sync {
    /// Run one query, delivering progress items as they arrive and
    /// returning the terminal status
    async fn stream_query(
        &self,
        request: StreamRequest,
        progress: mpsc::UnboundedSender<StreamProgress>,
    ) -> Result<StreamStatus, CanvasError>;
}

/// Wires a stream run's lifecycle into the store's working indicator
pub struct StreamRunner {
    store: Arc<CanvasStore>,
    transport: Arc<dyn StreamTransport>,
}

impl StreamRunner {
    pub fn new(store: Arc<CanvasStore>, transport: Arc<dyn StreamTransport>) -> Self {
        StreamRunner { store, transport }
    }

    /// Run one query. The working indicator goes up before the transport
    /// call; a completed run leaves it up (awaiting cards), a failed run
    /// clears it and surfaces the error. Partially revealed steps are
    /// never rolled back here.
    pub async fn run(
        &self,
        request: StreamRequest,
        progress: mpsc::UnboundedSender<StreamProgress>,
    ) -> Result<StreamStatus, CanvasError> {
        let correlation_id = request.correlation_id.clone();
        debug!(canvas = %request.canvas_id, correlation = %correlation_id, "starting stream run");
        self.store.begin_working(&correlation_id);

        match self.transport.stream_query(request, progress).await {
            Ok(StreamStatus::Completed) => {
                self.store.note_stream_complete(&correlation_id);
                Ok(StreamStatus::Completed)
            }
            Ok(StreamStatus::Error(message)) => {
                self.store.note_stream_error(&correlation_id);
                Ok(StreamStatus::Error(message))
            }
            Err(err) => {
                warn!(correlation = %correlation_id, error = %err, "stream transport failed");
                self.store.note_stream_error(&correlation_id);
                Err(err)
            }
        }
    }
}
