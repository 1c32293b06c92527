//! One dealt board of reward slots and its per-round cost rules.
use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;
use smallvec::SmallVec;

use crate::catalog::{RewardCatalog, RewardItem};
use crate::constants::{INITIAL_REVEAL_COST, REVEAL_COST_STEP, ROUND_SLOTS, SAMPLED_SLOTS};
use crate::error::FortuneError;
use crate::sampler::weighted_choice;

/// Indices of slots that are still face down.
pub type SlotIndices = SmallVec<[usize; ROUND_SLOTS]>;

/// A board of [`ROUND_SLOTS`] hidden rewards with exactly one target among them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundState {
    slots: Vec<RewardItem>,
    revealed: Vec<Option<RewardItem>>,
    target_name: String,
    reveal_cost: u32,
    refresh_cost: u32,
    base_refresh_cost: u32,
    target_found: bool,
    progress: u64,
}

impl RoundState {
    /// Deal a fresh board: nine weighted draws plus the target, shuffled.
    ///
    /// `progress` is carried over from the previous board of the playthrough.
    ///
    /// # Errors
    ///
    /// Returns [`FortuneError::InvalidWeights`] when the catalog universe cannot be sampled.
    pub fn deal<R>(catalog: &RewardCatalog, progress: u64, rng: &mut R) -> Result<Self, FortuneError>
    where
        R: Rng + ?Sized,
    {
        let mut slots = Vec::with_capacity(ROUND_SLOTS);
        for _ in 0..SAMPLED_SLOTS {
            slots.push(weighted_choice(catalog.universe(), rng)?.clone());
        }
        slots.push(catalog.target().clone());
        slots.shuffle(rng);

        Ok(Self::assemble(
            slots,
            catalog.target().name.clone(),
            catalog.refresh_cost(),
            progress,
        ))
    }

    /// Build a board from explicit slots, for fixtures and replays.
    ///
    /// # Errors
    ///
    /// Returns [`FortuneError::InvalidConfiguration`] unless there are exactly
    /// [`ROUND_SLOTS`] slots and exactly one of them is named `target_name`.
    pub fn from_slots(
        slots: Vec<RewardItem>,
        target_name: &str,
        refresh_cost: u32,
    ) -> Result<Self, FortuneError> {
        if slots.len() != ROUND_SLOTS {
            return Err(FortuneError::InvalidConfiguration(format!(
                "a round needs {ROUND_SLOTS} slots, got {}",
                slots.len()
            )));
        }
        let targets = slots.iter().filter(|s| s.name == target_name).count();
        if targets != 1 {
            return Err(FortuneError::InvalidConfiguration(format!(
                "a round needs exactly one '{target_name}', got {targets}"
            )));
        }
        Ok(Self::assemble(slots, target_name.to_string(), refresh_cost, 0))
    }

    fn assemble(
        slots: Vec<RewardItem>,
        target_name: String,
        refresh_cost: u32,
        progress: u64,
    ) -> Self {
        Self {
            revealed: vec![None; slots.len()],
            slots,
            target_name,
            reveal_cost: INITIAL_REVEAL_COST,
            refresh_cost,
            base_refresh_cost: refresh_cost,
            target_found: false,
            progress,
        }
    }

    /// Mark slot `index` revealed and apply the round's cost rules.
    ///
    /// Raises the reveal cost, bumps progress, and makes refreshing free once
    /// the target turns up. Budget handling belongs to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`FortuneError::RoundExhausted`] when no slot is face down, and
    /// [`FortuneError::InvalidSelection`] when `index` is out of range or
    /// already revealed.
    pub fn reveal_slot(&mut self, index: usize) -> Result<&RewardItem, FortuneError> {
        if self.is_exhausted() {
            return Err(FortuneError::RoundExhausted);
        }
        let Some(reward) = self.slots.get(index) else {
            return Err(FortuneError::InvalidSelection(format!(
                "slot {index} is outside the board"
            )));
        };
        if self.revealed[index].is_some() {
            return Err(FortuneError::InvalidSelection(format!(
                "slot {index} is already revealed"
            )));
        }

        if reward.name == self.target_name {
            self.target_found = true;
            self.refresh_cost = 0;
        }
        self.revealed[index] = Some(reward.clone());
        self.reveal_cost = self.reveal_cost.saturating_add(REVEAL_COST_STEP);
        self.progress = self.progress.saturating_add(1);
        Ok(reward)
    }

    #[must_use]
    pub fn slots(&self) -> &[RewardItem] {
        &self.slots
    }

    #[must_use]
    pub fn revealed(&self) -> &[Option<RewardItem>] {
        &self.revealed
    }

    #[must_use]
    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    #[must_use]
    pub const fn reveal_cost(&self) -> u32 {
        self.reveal_cost
    }

    #[must_use]
    pub const fn refresh_cost(&self) -> u32 {
        self.refresh_cost
    }

    /// Refresh price restored whenever a new board is dealt.
    #[must_use]
    pub const fn base_refresh_cost(&self) -> u32 {
        self.base_refresh_cost
    }

    #[must_use]
    pub const fn target_found(&self) -> bool {
        self.target_found
    }

    #[must_use]
    pub const fn progress(&self) -> u64 {
        self.progress
    }

    #[must_use]
    pub fn unrevealed_indices(&self) -> SlotIndices {
        self.revealed
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_none())
            .map(|(idx, _)| idx)
            .collect()
    }

    #[must_use]
    pub fn revealed_count(&self) -> usize {
        self.revealed.iter().filter(|slot| slot.is_some()).count()
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.revealed.iter().all(Option::is_some)
    }

    /// Rewards still face down on the board.
    pub fn remaining_rewards(&self) -> impl Iterator<Item = &RewardItem> {
        self.slots
            .iter()
            .zip(&self.revealed)
            .filter(|(_, revealed)| revealed.is_none())
            .map(|(slot, _)| slot)
    }

    /// True when any face-down slot holds a reward called `name`.
    #[must_use]
    pub fn has_remaining(&self, name: &str) -> bool {
        self.remaining_rewards().any(|item| item.name == name)
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::board;
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn catalog() -> RewardCatalog {
        RewardCatalog::from_items(
            vec![
                RewardItem::new("Wood", 1, 5.0),
                RewardItem::new("Gems", 5, 1.0),
                RewardItem::new("Wish", 1, 1.0),
            ],
            "Wish",
            15,
        )
        .unwrap()
    }

    #[test]
    fn dealt_board_holds_exactly_one_target() {
        let catalog = catalog();
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..200 {
            let round = RoundState::deal(&catalog, 0, &mut rng).unwrap();
            assert_eq!(round.slots().len(), ROUND_SLOTS);
            let targets = round.slots().iter().filter(|s| s.name == "Wish").count();
            assert_eq!(targets, 1);
            assert_eq!(round.reveal_cost(), INITIAL_REVEAL_COST);
            assert_eq!(round.refresh_cost(), 15);
            assert!(!round.target_found());
            assert_eq!(round.unrevealed_indices().len(), ROUND_SLOTS);
        }
    }

    #[test]
    fn deal_carries_progress() {
        let mut rng = SmallRng::seed_from_u64(9);
        let round = RoundState::deal(&catalog(), 42, &mut rng).unwrap();
        assert_eq!(round.progress(), 42);
    }

    #[test]
    fn reveal_slot_raises_cost_and_progress() {
        let mut round = board("Wish", &["Wood"]);
        round.reveal_slot(3).unwrap();
        assert_eq!(round.reveal_cost(), 2);
        assert_eq!(round.progress(), 1);
        assert_eq!(round.refresh_cost(), 15);
        assert!(matches!(
            round.reveal_slot(3),
            Err(FortuneError::InvalidSelection(_))
        ));
        assert!(matches!(
            round.reveal_slot(ROUND_SLOTS),
            Err(FortuneError::InvalidSelection(_))
        ));
    }

    #[test]
    fn finding_target_frees_refresh() {
        let mut round = board("Wish", &["Wood"]);
        let reward = round.reveal_slot(0).unwrap().clone();
        assert_eq!(reward.name, "Wish");
        assert!(round.target_found());
        assert_eq!(round.refresh_cost(), 0);
        assert_eq!(round.base_refresh_cost(), 15);
    }

    #[test]
    fn exhausted_board_rejects_reveals() {
        let mut round = board("Wish", &["Wood", "Gems"]);
        for idx in 0..ROUND_SLOTS {
            round.reveal_slot(idx).unwrap();
        }
        assert!(round.is_exhausted());
        assert_eq!(round.reveal_cost(), 11);
        assert_eq!(round.reveal_slot(0).unwrap_err(), FortuneError::RoundExhausted);
        assert_eq!(round.remaining_rewards().count(), 0);
    }

    #[test]
    fn remaining_rewards_track_face_down_slots() {
        let mut round = board("Wish", &["Wood", "Gems"]);
        assert!(round.has_remaining("Gems"));
        for idx in 0..ROUND_SLOTS {
            if round.slots()[idx].name == "Gems" {
                round.reveal_slot(idx).unwrap();
            }
        }
        assert!(!round.has_remaining("Gems"));
        assert!(round.has_remaining("Wood"));
    }

    #[test]
    fn from_slots_validates_shape() {
        let short = vec![RewardItem::new("Wish", 1, 1.0)];
        assert!(RoundState::from_slots(short, "Wish", 15).is_err());
        let no_target = vec![RewardItem::new("Wood", 1, 1.0); ROUND_SLOTS];
        assert!(RoundState::from_slots(no_target, "Wish", 15).is_err());
    }
}
