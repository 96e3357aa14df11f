//! Progressive reveal scheduling for streamed agent steps
//!
//! An ordered list of steps becomes a timed sequence of reveal events, one
//! per step, each at the cumulative sum of all prior steps' duration hints.
//! Deliberately linear: no backpressure, no reordering. The clock is
//! injected so pacing is unit-testable without real delays.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::canvas::AgentStreamStep;
use crate::config::RevealConfig;
use crate::constants::reveal::DEFAULT_STEP;

/// Injectable sleep source for the scheduler
#[async_trait]
pub trait Clock: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Default clock backed by the tokio timer (respects paused time in tests)
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// "Now show index i" — idempotent for any consumer already showing ≥ i
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealEvent {
    pub index: usize,
    pub step_id: String,
}

/// Pacing delay of one step, defaulting when no hint is present
fn step_duration(step: &AgentStreamStep, default_step: Duration) -> Duration {
    step.duration_ms
        .map(Duration::from_millis)
        .unwrap_or(default_step)
}

/// Offset of each step's reveal from the start of the sequence:
/// the cumulative sum of all prior steps' durations (step 0 at zero)
pub fn reveal_offsets(steps: &[AgentStreamStep], default_step: Duration) -> Vec<Duration> {
    let mut offsets = Vec::with_capacity(steps.len());
    let mut cumulative = Duration::ZERO;
    for step in steps {
        offsets.push(cumulative);
        cumulative += step_duration(step, default_step);
    }
    offsets
}

/// Timed reveal sequence over a step list
pub struct RevealScheduler {
    default_step: Duration,
}

impl Default for RevealScheduler {
    fn default() -> Self {
        RevealScheduler {
            default_step: DEFAULT_STEP,
        }
    }
}

impl RevealScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pacing configured via the `[reveal]` config section
    pub fn from_config(config: &RevealConfig) -> Self {
        RevealScheduler {
            default_step: Duration::from_millis(config.default_step_ms),
        }
    }

    /// Start revealing: one event per step, strictly in list order, each at
    /// its cumulative offset. Cancelling the token discards
    /// scheduled-but-unfired events without error (the channel just
    /// closes); cancellation is checked before firing, never mid-fire.
    pub fn spawn(
        &self,
        steps: Vec<AgentStreamStep>,
        clock: Arc<dyn Clock>,
        cancel: CancellationToken,
    ) -> mpsc::UnboundedReceiver<RevealEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        let default_step = self.default_step;

        tokio::spawn(async move {
            for (index, step) in steps.iter().enumerate() {
                // Delay between the previous step and this one
                if index > 0 {
                    let delay = step_duration(&steps[index - 1], default_step);
                    tokio::select! {
                        _ = clock.sleep(delay) => {}
                        _ = cancel.cancelled() => {
                            debug!(index, "reveal cancelled while waiting");
                            return;
                        }
                    }
                }

                if cancel.is_cancelled() {
                    debug!(index, "reveal cancelled before firing");
                    return;
                }

                let event = RevealEvent {
                    index,
                    step_id: step.id.clone(),
                };
                if tx.send(event).is_err() {
                    // Consumer went away; remaining reveals are moot
                    return;
                }
            }
            debug!(steps = steps.len(), "reveal sequence complete");
        });

        rx
    }
}

/// Growing visible prefix of the step list. Applying an event the prefix
/// already covers is a no-op, so irregular polling can never skip or
/// reorder what the consumer shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisiblePrefix {
    visible: usize,
}

impl VisiblePrefix {
    pub fn new() -> Self {
        VisiblePrefix::default()
    }

    /// Extend the prefix to cover `index`; returns whether anything changed
    pub fn apply(&mut self, index: usize) -> bool {
        if index + 1 > self.visible {
            self.visible = index + 1;
            true
        } else {
            false
        }
    }

    /// Number of steps currently visible
    pub fn len(&self) -> usize {
        self.visible
    }

    pub fn is_empty(&self) -> bool {
        self.visible == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    fn steps(durations: &[Option<u64>]) -> Vec<AgentStreamStep> {
        durations
            .iter()
            .enumerate()
            .map(|(i, d)| AgentStreamStep {
                id: format!("step-{}", i),
                kind: Default::default(),
                text: Some(format!("step {}", i)),
                duration_ms: *d,
            })
            .collect()
    }

    #[test]
    fn test_offsets_are_cumulative_prior_durations() {
        let offsets = reveal_offsets(&steps(&[Some(500), Some(900), Some(800)]), DEFAULT_STEP);
        assert_eq!(
            offsets,
            vec![
                Duration::ZERO,
                Duration::from_millis(500),
                Duration::from_millis(1400),
            ]
        );
    }

    #[test]
    fn test_offsets_default_missing_durations() {
        let offsets = reveal_offsets(&steps(&[None, Some(200), None]), DEFAULT_STEP);
        assert_eq!(
            offsets,
            vec![
                Duration::ZERO,
                Duration::from_millis(800),
                Duration::from_millis(1000),
            ]
        );
    }

    #[test]
    fn test_configured_default_step_changes_pacing() {
        let config = RevealConfig {
            default_step_ms: 100,
        };
        let scheduler = RevealScheduler::from_config(&config);
        assert_eq!(scheduler.default_step, Duration::from_millis(100));

        let offsets = reveal_offsets(&steps(&[None, None]), scheduler.default_step);
        assert_eq!(offsets, vec![Duration::ZERO, Duration::from_millis(100)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawn_uses_configured_default_step() {
        let start = Instant::now();
        let scheduler = RevealScheduler::from_config(&RevealConfig {
            default_step_ms: 100,
        });
        let mut rx = scheduler.spawn(
            steps(&[None, None]),
            Arc::new(TokioClock),
            CancellationToken::new(),
        );

        let mut observed = Vec::new();
        while let Some(event) = rx.recv().await {
            observed.push((event.index, start.elapsed()));
        }
        assert_eq!(
            observed,
            vec![(0, Duration::ZERO), (1, Duration::from_millis(100))]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_reveal_timing_and_order() {
        let start = Instant::now();
        let mut rx = RevealScheduler::new().spawn(
            steps(&[Some(500), Some(900), Some(800)]),
            Arc::new(TokioClock),
            CancellationToken::new(),
        );

        let mut observed = Vec::new();
        while let Some(event) = rx.recv().await {
            observed.push((event.index, start.elapsed()));
        }

        assert_eq!(
            observed,
            vec![
                (0, Duration::ZERO),
                (1, Duration::from_millis(500)),
                (2, Duration::from_millis(1400)),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_discards_unfired_events() {
        let cancel = CancellationToken::new();
        let mut rx = RevealScheduler::new().spawn(
            steps(&[Some(100), Some(10_000), Some(10_000)]),
            Arc::new(TokioClock),
            cancel.clone(),
        );

        let first = rx.recv().await.unwrap();
        assert_eq!(first.index, 0);

        cancel.cancel();

        // Remaining events are discarded without error: channel closes
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_start_reveals_nothing() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut rx = RevealScheduler::new().spawn(
            steps(&[Some(100)]),
            Arc::new(TokioClock),
            cancel,
        );
        assert!(rx.recv().await.is_none());
    }

    #[test]
    fn test_visible_prefix_is_idempotent_and_monotonic() {
        let mut prefix = VisiblePrefix::new();
        assert!(prefix.apply(0));
        assert!(prefix.apply(1));
        assert_eq!(prefix.len(), 2);

        // Re-applying an already-covered index is a no-op
        assert!(!prefix.apply(0));
        assert!(!prefix.apply(1));
        assert_eq!(prefix.len(), 2);

        // A late consumer catching up straight to index 4 shows 5 steps
        assert!(prefix.apply(4));
        assert_eq!(prefix.len(), 5);
    }
}
