//! Fortune Hut Event Engine
//!
//! Core logic for the Fortune Hut reward event: weighted reward sampling,
//! ten-slot boards with rising reveal costs, pluggable decision strategies,
//! and a Monte Carlo driver that averages the haul across many playthroughs.
//! Presentation lives in the `fortune-sim` binary.

pub mod catalog;
pub mod constants;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod numbers;
pub mod round;
pub mod sampler;
pub mod seed;
pub mod simulation;
pub mod strategy;
pub mod verify;

// Re-export commonly used types
pub use catalog::{CatalogData, Milestone, PrizePool, RewardCatalog, RewardItem, RewardKey};
pub use engine::{EventState, RevealOutcome, initialize_round};
pub use error::FortuneError;
pub use ledger::{CollectedTotals, ResourceBudget};
pub use round::{RoundState, SlotIndices};
pub use sampler::{Weighted, weighted_choice};
pub use seed::{derive_stream_seed, entropy_seed, playthrough_seed, rng_from_seed};
pub use simulation::{
    AverageRow, BatchReport, PlaythroughSession, PlaythroughSummary, StepEvent, StepOutcome,
    StopReason, StrategyAverages, run_batch, run_playthrough, run_playthrough_seeded,
};
pub use strategy::{
    Action, DecisionRule, FnStrategy, RuleStrategy, Strategy, builtin_strategies,
    builtin_strategy,
};
pub use verify::{FrequencyRow, verify_sampler};
