//! Centralized tuning constants for the Fortune Hut event.
//!
//! Board size and cost progression are fixed by the event rules; only the
//! refresh price may be overridden from the catalog document.

/// Number of reward slots dealt into every round.
pub const ROUND_SLOTS: usize = 10;

/// Slots filled from the sampling universe; the remaining slot holds the target.
pub const SAMPLED_SLOTS: usize = ROUND_SLOTS - 1;

/// Cost of the first reveal in a freshly dealt round.
pub const INITIAL_REVEAL_COST: u32 = 1;

/// Amount the reveal cost rises after every successful reveal.
pub const REVEAL_COST_STEP: u32 = 1;

/// Refresh price used when the catalog does not specify one.
pub const DEFAULT_REFRESH_COST: u32 = 15;

/// Length of the progress track shown on the event board.
pub const PROGRESS_TRACK_LENGTH: u64 = 750;

// Seed derivation tags -----------------------------------------------------
pub(crate) const SEED_TAG_STRATEGY: &str = "strategy";
pub(crate) const SEED_TAG_PLAYTHROUGH: &str = "playthrough";
