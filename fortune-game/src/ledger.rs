//! Token budget and collected-reward totals owned by a playthrough.
use serde::ser::{Serialize, Serializer};
use std::collections::BTreeMap;

use crate::catalog::{RewardItem, RewardKey};
use crate::error::FortuneError;

/// Remaining event tokens. Only ever decreases, never below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, serde::Serialize)]
#[serde(transparent)]
pub struct ResourceBudget(u32);

impl ResourceBudget {
    #[must_use]
    pub const fn new(tokens: u32) -> Self {
        Self(tokens)
    }

    #[must_use]
    pub const fn tokens(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn can_afford(self, cost: u32) -> bool {
        self.0 >= cost
    }

    /// Deduct `cost`, leaving the balance untouched when it cannot be covered.
    ///
    /// # Errors
    ///
    /// Returns [`FortuneError::InsufficientTokens`] when `cost` exceeds the balance.
    pub fn spend(&mut self, cost: u32) -> Result<(), FortuneError> {
        match self.0.checked_sub(cost) {
            Some(rest) => {
                self.0 = rest;
                Ok(())
            }
            None => Err(FortuneError::InsufficientTokens {
                cost,
                available: self.0,
            }),
        }
    }
}

/// Accumulated quantity per reward identity across a whole playthrough.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CollectedTotals {
    totals: BTreeMap<RewardKey, u64>,
}

impl CollectedTotals {
    /// Totals pre-seeded with a zero row for each known identity.
    #[must_use]
    pub fn with_keys(keys: &[RewardKey]) -> Self {
        Self {
            totals: keys.iter().cloned().map(|key| (key, 0)).collect(),
        }
    }

    /// Add one revealed reward's quantity.
    pub fn record(&mut self, item: &RewardItem) {
        self.add(&item.key(), u64::from(item.quantity));
    }

    /// Add `qty` to an identity directly, e.g. when merging playthroughs.
    pub fn add(&mut self, key: &RewardKey, qty: u64) {
        let entry = self.totals.entry(key.clone()).or_insert(0);
        *entry = entry.saturating_add(qty);
    }

    #[must_use]
    pub fn get(&self, key: &RewardKey) -> u64 {
        self.totals.get(key).copied().unwrap_or(0)
    }

    /// Sum of quantities collected for every identity sharing `name`.
    #[must_use]
    pub fn total_for_name(&self, name: &str) -> u64 {
        self.totals
            .iter()
            .filter(|(key, _)| key.name == name)
            .map(|(_, qty)| *qty)
            .sum()
    }

    #[must_use]
    pub fn grand_total(&self) -> u64 {
        self.totals.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RewardKey, u64)> {
        self.totals.iter().map(|(key, qty)| (key, *qty))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.totals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}

impl Serialize for CollectedTotals {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.totals.iter().map(|(key, qty)| (key.to_string(), qty)))
    }
}
