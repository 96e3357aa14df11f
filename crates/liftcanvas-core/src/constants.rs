//! Engine constants and configuration defaults
//!
//! Centralized location for magic numbers and default values

use std::time::Duration;

/// Card layout contract
pub mod layout {
    /// Grid width the server-assigned card widths map onto
    pub const GRID_UNITS: u8 = 12;

    /// Column span for a one-third width card
    pub const SPAN_ONE_THIRD: u8 = 4;

    /// Column span for a one-half width card
    pub const SPAN_ONE_HALF: u8 = 6;

    /// Column span for a full width card
    pub const SPAN_FULL: u8 = 12;
}

/// Set prescription limits and defaults
pub mod prescription {
    /// Reps assumed when a set arrives without any reps field
    pub const DEFAULT_REPS: u32 = 8;

    /// Lowest reps value an edit may produce
    pub const REPS_MIN: u32 = 1;

    /// Highest reps value an edit may produce
    pub const REPS_MAX: u32 = 30;

    /// Highest reps-in-reserve value an edit may produce
    pub const RIR_MAX: u32 = 5;

    /// Weight edits quantize to this step (kg displays)
    pub const WEIGHT_QUANTUM_KG: f64 = 0.5;
}

/// Stream reveal pacing
pub mod reveal {
    use super::*;

    /// Reveal delay assumed for a step without a duration hint
    pub const DEFAULT_STEP: Duration = Duration::from_millis(800);
}

/// Action dispatch configuration
pub mod dispatch {
    use super::*;

    /// How long the undo affordance stays live after a mutating action
    pub const UNDO_WINDOW: Duration = Duration::from_secs(5);
}
