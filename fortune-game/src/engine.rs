//! Round engine: applies reveal and refresh commands to an event state.
use rand::Rng;
use serde::Serialize;

use crate::catalog::{RewardCatalog, RewardItem};
use crate::error::FortuneError;
use crate::ledger::{CollectedTotals, ResourceBudget};
use crate::round::RoundState;

/// Everything a playthrough mutates: the current board, tokens, and haul.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventState {
    round: RoundState,
    budget: ResourceBudget,
    collected: CollectedTotals,
}

/// Result of a successful reveal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevealOutcome {
    pub slot: usize,
    pub reward: RewardItem,
    pub cost: u32,
    pub target: bool,
    pub tokens_left: u32,
}

/// Deal the opening board for a playthrough with `tokens` to spend.
///
/// # Errors
///
/// Returns [`FortuneError::InvalidWeights`] when the catalog universe cannot be sampled.
pub fn initialize_round<R>(
    catalog: &RewardCatalog,
    tokens: u32,
    rng: &mut R,
) -> Result<EventState, FortuneError>
where
    R: Rng + ?Sized,
{
    let round = RoundState::deal(catalog, 0, rng)?;
    Ok(EventState {
        round,
        budget: ResourceBudget::new(tokens),
        collected: CollectedTotals::with_keys(catalog.reward_keys()),
    })
}

impl EventState {
    /// Assemble a state from parts, e.g. a fixture board.
    #[must_use]
    pub const fn from_parts(
        round: RoundState,
        budget: ResourceBudget,
        collected: CollectedTotals,
    ) -> Self {
        Self {
            round,
            budget,
            collected,
        }
    }

    #[must_use]
    pub const fn round(&self) -> &RoundState {
        &self.round
    }

    #[must_use]
    pub const fn budget(&self) -> ResourceBudget {
        self.budget
    }

    #[must_use]
    pub const fn collected(&self) -> &CollectedTotals {
        &self.collected
    }

    #[must_use]
    pub fn into_collected(self) -> CollectedTotals {
        self.collected
    }

    #[must_use]
    pub const fn can_reveal(&self) -> bool {
        self.budget.can_afford(self.round.reveal_cost())
    }

    #[must_use]
    pub const fn can_refresh(&self) -> bool {
        self.budget.can_afford(self.round.refresh_cost())
    }

    /// Reveal one face-down slot chosen uniformly among the face-down slots.
    ///
    /// # Errors
    ///
    /// Returns [`FortuneError::RoundExhausted`] when every slot is revealed and
    /// [`FortuneError::InsufficientTokens`] when the reveal cost exceeds the budget.
    /// The state is unchanged on error.
    pub fn reveal<R>(&mut self, rng: &mut R) -> Result<RevealOutcome, FortuneError>
    where
        R: Rng + ?Sized,
    {
        let face_down = self.round.unrevealed_indices();
        if face_down.is_empty() {
            return Err(FortuneError::RoundExhausted);
        }
        let cost = self.round.reveal_cost();
        self.budget.spend(cost)?;

        let slot = face_down[rng.gen_range(0..face_down.len())];
        let reward = self.round.reveal_slot(slot)?.clone();
        self.collected.record(&reward);
        let target = reward.name == self.round.target_name();

        log::debug!(
            "revealed slot {slot}: {} x{} for {cost} tokens ({} left)",
            reward.name,
            reward.quantity,
            self.budget.tokens()
        );

        Ok(RevealOutcome {
            slot,
            reward,
            cost,
            target,
            tokens_left: self.budget.tokens(),
        })
    }

    /// Pay the refresh cost and deal a brand-new board.
    ///
    /// Progress and collected totals carry over; everything else resets.
    ///
    /// # Errors
    ///
    /// Returns [`FortuneError::InsufficientTokens`] when the refresh cost exceeds
    /// the budget, or a sampling error from dealing. The state is unchanged on error.
    pub fn refresh<R>(
        &mut self,
        catalog: &RewardCatalog,
        rng: &mut R,
    ) -> Result<&RoundState, FortuneError>
    where
        R: Rng + ?Sized,
    {
        let cost = self.round.refresh_cost();
        if !self.budget.can_afford(cost) {
            return Err(FortuneError::InsufficientTokens {
                cost,
                available: self.budget.tokens(),
            });
        }
        let fresh = RoundState::deal(catalog, self.round.progress(), rng)?;
        self.budget.spend(cost)?;
        self.round = fresh;

        log::debug!(
            "refreshed board for {cost} tokens ({} left)",
            self.budget.tokens()
        );
        Ok(&self.round)
    }
}
