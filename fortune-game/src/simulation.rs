//! Playthrough driver and Monte Carlo batch runner.
use rand::Rng;
use serde::Serialize;

use crate::catalog::{RewardCatalog, RewardKey};
use crate::engine::{EventState, RevealOutcome, initialize_round};
use crate::error::FortuneError;
use crate::ledger::CollectedTotals;
use crate::numbers::mean;
use crate::seed::{playthrough_seed, rng_from_seed};
use crate::strategy::{Action, Strategy};

/// Why a playthrough stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum StopReason {
    /// The strategy chose to end.
    StrategyEnded,
    /// Neither a reveal nor a refresh could be paid for.
    OutOfTokens,
    /// The strategy picked an action the budget could not cover.
    Unaffordable { action: Action },
    /// The engine rejected the command; treated as an implicit end.
    Engine { message: String },
}

impl StopReason {
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::StrategyEnded => "strategy ended".to_string(),
            Self::OutOfTokens => "out of tokens".to_string(),
            Self::Unaffordable { action } => format!("could not afford {action}"),
            Self::Engine { message } => format!("engine error: {message}"),
        }
    }
}

/// What a single step did.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StepEvent {
    Revealed(RevealOutcome),
    Refreshed { cost: u32 },
    Stopped(StopReason),
}

/// Result of advancing a playthrough by one decision.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepOutcome {
    pub step: usize,
    pub action: Action,
    pub event: StepEvent,
    pub tokens_left: u32,
    pub finished: bool,
}

/// Terminal record of one playthrough.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaythroughSummary {
    pub collected: CollectedTotals,
    pub steps: usize,
    pub reveals: usize,
    pub refreshes: usize,
    pub rounds_dealt: usize,
    pub tokens_left: u32,
    pub progress: u64,
    pub stop_reason: StopReason,
}

/// Step-wise playthrough: one strategy decision and engine command per `advance`.
pub struct PlaythroughSession<'a, R> {
    catalog: &'a RewardCatalog,
    strategy: &'a dyn Strategy,
    state: EventState,
    rng: R,
    steps: usize,
    reveals: usize,
    refreshes: usize,
    stop_reason: Option<StopReason>,
}

impl<'a, R: Rng> PlaythroughSession<'a, R> {
    /// Deal the opening board and prepare to play.
    ///
    /// # Errors
    ///
    /// Returns [`FortuneError::InvalidWeights`] when the opening board cannot be dealt.
    pub fn new(
        catalog: &'a RewardCatalog,
        tokens: u32,
        strategy: &'a dyn Strategy,
        mut rng: R,
    ) -> Result<Self, FortuneError> {
        let state = initialize_round(catalog, tokens, &mut rng)?;
        Ok(Self {
            catalog,
            strategy,
            state,
            rng,
            steps: 0,
            reveals: 0,
            refreshes: 0,
            stop_reason: None,
        })
    }

    #[must_use]
    pub const fn state(&self) -> &EventState {
        &self.state
    }

    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.stop_reason.is_some()
    }

    pub fn advance(&mut self) -> StepOutcome {
        if let Some(reason) = self.stop_reason.clone() {
            return self.outcome(Action::End, StepEvent::Stopped(reason));
        }
        self.steps += 1;

        if !self.state.can_reveal() && !self.state.can_refresh() {
            return self.stop(Action::End, StopReason::OutOfTokens);
        }

        let action = self.strategy.decide(self.state.budget(), self.state.round());
        match action {
            Action::End => self.stop(action, StopReason::StrategyEnded),
            Action::Reveal => match self.state.reveal(&mut self.rng) {
                Ok(outcome) => {
                    self.reveals += 1;
                    self.outcome(action, StepEvent::Revealed(outcome))
                }
                Err(err) => self.fail(action, &err),
            },
            Action::Refresh => {
                let cost = self.state.round().refresh_cost();
                let refreshed = self.state.refresh(self.catalog, &mut self.rng).map(|_| ());
                match refreshed {
                    Ok(()) => {
                        self.refreshes += 1;
                        self.outcome(action, StepEvent::Refreshed { cost })
                    }
                    Err(err) => self.fail(action, &err),
                }
            }
        }
    }

    /// Advance until the playthrough stops.
    #[must_use]
    pub fn run_to_end(mut self) -> PlaythroughSummary {
        while !self.is_finished() {
            self.advance();
        }
        self.into_summary()
    }

    #[must_use]
    pub fn into_summary(self) -> PlaythroughSummary {
        let tokens_left = self.state.budget().tokens();
        let progress = self.state.round().progress();
        PlaythroughSummary {
            steps: self.steps,
            reveals: self.reveals,
            refreshes: self.refreshes,
            rounds_dealt: self.refreshes + 1,
            tokens_left,
            progress,
            stop_reason: self.stop_reason.unwrap_or(StopReason::StrategyEnded),
            collected: self.state.into_collected(),
        }
    }

    fn fail(&mut self, action: Action, err: &FortuneError) -> StepOutcome {
        let reason = if err.is_affordability() {
            StopReason::Unaffordable { action }
        } else {
            log::warn!(
                "strategy '{}' ended by engine error on {action}: {err}",
                self.strategy.name()
            );
            StopReason::Engine {
                message: err.to_string(),
            }
        };
        self.stop(action, reason)
    }

    fn stop(&mut self, action: Action, reason: StopReason) -> StepOutcome {
        self.stop_reason = Some(reason.clone());
        self.outcome(action, StepEvent::Stopped(reason))
    }

    fn outcome(&self, action: Action, event: StepEvent) -> StepOutcome {
        StepOutcome {
            step: self.steps,
            action,
            event,
            tokens_left: self.state.budget().tokens(),
            finished: self.is_finished(),
        }
    }
}

/// Play one playthrough to completion.
///
/// # Errors
///
/// Returns [`FortuneError::InvalidWeights`] when the opening board cannot be dealt.
pub fn run_playthrough<R: Rng>(
    catalog: &RewardCatalog,
    tokens: u32,
    strategy: &dyn Strategy,
    rng: R,
) -> Result<PlaythroughSummary, FortuneError> {
    Ok(PlaythroughSession::new(catalog, tokens, strategy, rng)?.run_to_end())
}

/// Play one playthrough on a generator seeded from `seed`.
///
/// # Errors
///
/// Same as [`run_playthrough`].
pub fn run_playthrough_seeded(
    catalog: &RewardCatalog,
    tokens: u32,
    strategy: &dyn Strategy,
    seed: u64,
) -> Result<PlaythroughSummary, FortuneError> {
    run_playthrough(catalog, tokens, strategy, rng_from_seed(seed))
}

/// Average collected quantity of one reward identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AverageRow {
    pub reward: RewardKey,
    pub total: u64,
    pub average: f64,
}

/// Averaged results for one strategy across a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyAverages {
    pub id: String,
    pub name: String,
    pub playthroughs: usize,
    /// Sorted by average, highest first.
    pub averages: Vec<AverageRow>,
    pub mean_reveals: f64,
    pub mean_refreshes: f64,
    pub mean_tokens_left: f64,
}

impl StrategyAverages {
    /// Average for one reward identity, 0.0 when it never appeared.
    #[must_use]
    pub fn average_for(&self, key: &RewardKey) -> f64 {
        self.averages
            .iter()
            .find(|row| &row.reward == key)
            .map_or(0.0, |row| row.average)
    }

    /// Average summed over every identity sharing `name`.
    #[must_use]
    pub fn average_for_name(&self, name: &str) -> f64 {
        self.averages
            .iter()
            .filter(|row| row.reward.name == name)
            .map(|row| row.average)
            .sum()
    }
}

#[derive(Debug, Default)]
struct Accumulator {
    collected: CollectedTotals,
    reveals: u64,
    refreshes: u64,
    tokens_left: u64,
}

impl Accumulator {
    fn absorb(&mut self, summary: &PlaythroughSummary) {
        for (key, qty) in summary.collected.iter() {
            self.collected.add(key, qty);
        }
        self.reveals += u64::try_from(summary.reveals).unwrap_or(u64::MAX);
        self.refreshes += u64::try_from(summary.refreshes).unwrap_or(u64::MAX);
        self.tokens_left += u64::from(summary.tokens_left);
    }

    fn finish(self, strategy: &dyn Strategy, playthroughs: usize) -> StrategyAverages {
        let mut averages: Vec<AverageRow> = self
            .collected
            .iter()
            .map(|(key, total)| AverageRow {
                reward: key.clone(),
                total,
                average: mean(total, playthroughs),
            })
            .collect();
        averages.sort_by(|a, b| {
            b.average
                .total_cmp(&a.average)
                .then_with(|| a.reward.cmp(&b.reward))
        });
        StrategyAverages {
            id: strategy.id().to_string(),
            name: strategy.name().to_string(),
            playthroughs,
            averages,
            mean_reveals: mean(self.reveals, playthroughs),
            mean_refreshes: mean(self.refreshes, playthroughs),
            mean_tokens_left: mean(self.tokens_left, playthroughs),
        }
    }
}

/// Averaged results for every strategy in a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub seed: u64,
    pub tokens: u32,
    pub rounds: usize,
    pub target: String,
    pub strategies: Vec<StrategyAverages>,
}

impl BatchReport {
    #[must_use]
    pub fn get(&self, strategy_id: &str) -> Option<&StrategyAverages> {
        self.strategies.iter().find(|s| s.id == strategy_id)
    }
}

/// Run `rounds` independent playthroughs for each strategy and average the haul.
///
/// Playthrough `n` of strategy `id` draws from its own generator derived from
/// `seed`, so a batch replays exactly for the same seed.
///
/// # Errors
///
/// Returns [`FortuneError::InvalidWeights`] when an opening board cannot be dealt.
pub fn run_batch(
    catalog: &RewardCatalog,
    tokens: u32,
    strategies: &[&dyn Strategy],
    rounds: usize,
    seed: u64,
) -> Result<BatchReport, FortuneError> {
    let mut results = Vec::with_capacity(strategies.len());
    for &strategy in strategies {
        let mut acc = Accumulator {
            collected: CollectedTotals::with_keys(catalog.reward_keys()),
            ..Accumulator::default()
        };
        for index in 0..rounds {
            let stream = playthrough_seed(seed, strategy.id(), index);
            let summary = run_playthrough_seeded(catalog, tokens, strategy, stream)?;
            acc.absorb(&summary);
        }
        let averages = acc.finish(strategy, rounds);
        log::info!(
            "strategy {} ({}): {} playthroughs, {:.1} reveals and {:.1} refreshes on average",
            averages.id,
            averages.name,
            rounds,
            averages.mean_reveals,
            averages.mean_refreshes
        );
        results.push(averages);
    }

    Ok(BatchReport {
        seed,
        tokens,
        rounds,
        target: catalog.target().name.clone(),
        strategies: results,
    })
}
