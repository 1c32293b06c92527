//! Reward catalog loading, validation, and target resolution.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::constants::DEFAULT_REFRESH_COST;
use crate::error::FortuneError;

const BUNDLED_CATALOG: &str = include_str!("../assets/data/fortune_hut.json");

/// A single reward entry: `quantity` units of `name`, drawn with `probability` weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardItem {
    pub name: String,
    pub quantity: u32,
    pub probability: f64,
}

impl RewardItem {
    #[must_use]
    pub fn new(name: impl Into<String>, quantity: u32, probability: f64) -> Self {
        Self {
            name: name.into(),
            quantity,
            probability,
        }
    }

    /// Identity used to aggregate collected rewards.
    #[must_use]
    pub fn key(&self) -> RewardKey {
        RewardKey {
            name: self.name.clone(),
            quantity: self.quantity,
        }
    }

    fn validate(&self, context: &str) -> Result<(), FortuneError> {
        if self.name.trim().is_empty() {
            return Err(FortuneError::InvalidConfiguration(format!(
                "{context}: reward name is empty"
            )));
        }
        if self.quantity == 0 {
            return Err(FortuneError::InvalidConfiguration(format!(
                "{context}: '{}' has quantity 0",
                self.name
            )));
        }
        if !self.probability.is_finite() || self.probability <= 0.0 {
            return Err(FortuneError::InvalidConfiguration(format!(
                "{context}: '{}' has non-positive probability {}",
                self.name, self.probability
            )));
        }
        Ok(())
    }
}

/// Distinct reward identity keyed by `name × quantity`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RewardKey {
    pub name: String,
    pub quantity: u32,
}

impl fmt::Display for RewardKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x{}", self.name, self.quantity)
    }
}

/// Named group of rewards that feed the sampling universe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrizePool {
    #[serde(default)]
    pub name: String,
    pub items: Vec<RewardItem>,
}

/// Progress milestone shown on the event board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub milestone: u64,
    pub rewards: String,
}

/// Raw catalog document as read from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogData {
    #[serde(default = "default_refresh_cost")]
    pub refresh_cost: u32,
    pub prize_pools: Vec<PrizePool>,
    #[serde(default)]
    pub wish_rewards: Vec<RewardItem>,
    #[serde(default)]
    pub progress_rewards: Vec<Milestone>,
}

const fn default_refresh_cost() -> u32 {
    DEFAULT_REFRESH_COST
}

impl CatalogData {
    /// Load and validate a catalog from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed or fails validation.
    pub fn from_json(json: &str) -> Result<Self, FortuneError> {
        let data: Self = serde_json::from_str(json)?;
        data.validate()?;
        Ok(data)
    }

    /// Load and validate a catalog file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn from_path(path: &Path) -> Result<Self, FortuneError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Catalog shipped with the crate.
    ///
    /// # Errors
    ///
    /// Returns an error only if the bundled asset is malformed.
    pub fn bundled() -> Result<Self, FortuneError> {
        Self::from_json(BUNDLED_CATALOG)
    }

    /// Check every record for the shape the engine relies on.
    ///
    /// # Errors
    ///
    /// Returns [`FortuneError::InvalidConfiguration`] describing the first violation.
    pub fn validate(&self) -> Result<(), FortuneError> {
        if self.refresh_cost == 0 {
            return Err(FortuneError::InvalidConfiguration(
                "refresh_cost must be at least 1".to_string(),
            ));
        }
        if self.pool_items().next().is_none() {
            return Err(FortuneError::InvalidConfiguration(
                "catalog has no prize pool items".to_string(),
            ));
        }
        for pool in &self.prize_pools {
            let context = if pool.name.is_empty() {
                "prize pool".to_string()
            } else {
                format!("prize pool '{}'", pool.name)
            };
            for item in &pool.items {
                item.validate(&context)?;
            }
        }
        for item in &self.wish_rewards {
            item.validate("wish rewards")?;
        }
        Ok(())
    }

    /// Every prize pool item in catalog order.
    pub fn pool_items(&self) -> impl Iterator<Item = &RewardItem> {
        self.prize_pools.iter().flat_map(|pool| pool.items.iter())
    }

    /// Look up a prize pool by name, case-insensitively.
    #[must_use]
    pub fn pool(&self, name: &str) -> Option<&PrizePool> {
        self.prize_pools
            .iter()
            .find(|pool| pool.name.eq_ignore_ascii_case(name))
    }

    /// First milestone strictly above `progress`.
    #[must_use]
    pub fn next_milestone(&self, progress: u64) -> Option<&Milestone> {
        self.progress_rewards
            .iter()
            .filter(|m| m.milestone > progress)
            .min_by_key(|m| m.milestone)
    }

    /// Resolve the sampling universe for a chosen target reward.
    ///
    /// The target comes from the wish list first, then from the prize pools.
    /// Every pool item sharing the target's name is removed from the universe
    /// so each dealt round holds exactly one target.
    ///
    /// # Errors
    ///
    /// Returns [`FortuneError::InvalidConfiguration`] when no reward carries
    /// `target_name`, and [`FortuneError::InvalidWeights`] when nothing is left
    /// to sample once the target is excluded.
    pub fn resolve(&self, target_name: &str) -> Result<RewardCatalog, FortuneError> {
        let target = self
            .wish_rewards
            .iter()
            .chain(self.pool_items())
            .find(|item| item.name == target_name)
            .cloned()
            .ok_or_else(|| {
                FortuneError::InvalidConfiguration(format!(
                    "target reward '{target_name}' is not in the catalog"
                ))
            })?;

        let universe: Vec<RewardItem> = self
            .pool_items()
            .filter(|item| item.name != target.name)
            .cloned()
            .collect();
        if universe.is_empty() {
            return Err(FortuneError::InvalidWeights { total: 0.0 });
        }

        let mut keys: Vec<RewardKey> = Vec::new();
        for item in self.pool_items().chain(self.wish_rewards.iter()) {
            let key = item.key();
            if !keys.contains(&key) {
                keys.push(key);
            }
        }

        Ok(RewardCatalog {
            universe,
            target,
            refresh_cost: self.refresh_cost,
            keys,
        })
    }
}

/// Catalog resolved for one target reward; the input every round is dealt from.
#[derive(Debug, Clone, PartialEq)]
pub struct RewardCatalog {
    universe: Vec<RewardItem>,
    target: RewardItem,
    refresh_cost: u32,
    keys: Vec<RewardKey>,
}

impl RewardCatalog {
    /// Build a resolved catalog directly, bypassing the JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error under the same conditions as [`CatalogData::resolve`].
    pub fn from_items(
        items: Vec<RewardItem>,
        target_name: &str,
        refresh_cost: u32,
    ) -> Result<Self, FortuneError> {
        let data = CatalogData {
            refresh_cost,
            prize_pools: vec![PrizePool {
                name: String::new(),
                items,
            }],
            wish_rewards: Vec::new(),
            progress_rewards: Vec::new(),
        };
        data.validate()?;
        data.resolve(target_name)
    }

    /// Items the non-target slots are drawn from.
    #[must_use]
    pub fn universe(&self) -> &[RewardItem] {
        &self.universe
    }

    #[must_use]
    pub const fn target(&self) -> &RewardItem {
        &self.target
    }

    #[must_use]
    pub const fn refresh_cost(&self) -> u32 {
        self.refresh_cost
    }

    /// Every reward identity the catalog can hand out.
    #[must_use]
    pub fn reward_keys(&self) -> &[RewardKey] {
        &self.keys
    }

    #[must_use]
    pub fn is_target(&self, item: &RewardItem) -> bool {
        item.name == self.target.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"{
            "prize_pools": [
                {
                    "name": "Main",
                    "items": [
                        {"name": "Gems", "quantity": 5, "probability": 2.0},
                        {"name": "Gems", "quantity": 1, "probability": 6.0},
                        {"name": "Crystal", "quantity": 3, "probability": 2.0}
                    ]
                }
            ],
            "wish_rewards": [
                {"name": "Hero Shard", "quantity": 10, "probability": 1.0}
            ],
            "progress_rewards": [
                {"milestone": 50, "rewards": "Gems x5"},
                {"milestone": 10, "rewards": "Crystal x1"}
            ]
        }"#
    }

    #[test]
    fn parses_with_default_refresh_cost() {
        let data = CatalogData::from_json(sample_json()).unwrap();
        assert_eq!(data.refresh_cost, DEFAULT_REFRESH_COST);
        assert_eq!(data.pool_items().count(), 3);
        assert!(data.pool("main").is_some());
    }

    #[test]
    fn resolves_wish_target_and_keys() {
        let data = CatalogData::from_json(sample_json()).unwrap();
        let catalog = data.resolve("Hero Shard").unwrap();
        assert_eq!(catalog.target().quantity, 10);
        assert_eq!(catalog.universe().len(), 3);
        assert_eq!(catalog.reward_keys().len(), 4);
        assert_eq!(catalog.reward_keys()[0].to_string(), "Gems x5");
    }

    #[test]
    fn pool_target_is_removed_from_universe() {
        let data = CatalogData::from_json(sample_json()).unwrap();
        let catalog = data.resolve("Gems").unwrap();
        assert_eq!(catalog.target().quantity, 5);
        assert!(catalog.universe().iter().all(|item| item.name != "Gems"));
    }

    #[test]
    fn missing_target_is_configuration_error() {
        let data = CatalogData::from_json(sample_json()).unwrap();
        assert!(matches!(
            data.resolve("Dragon"),
            Err(FortuneError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn universe_of_only_target_is_invalid_weights() {
        let err = RewardCatalog::from_items(vec![RewardItem::new("Solo", 1, 1.0)], "Solo", 15)
            .unwrap_err();
        assert!(matches!(err, FortuneError::InvalidWeights { .. }));
    }

    #[test]
    fn rejects_malformed_items() {
        let bad_quantity =
            r#"{"prize_pools":[{"items":[{"name":"A","quantity":0,"probability":1.0}]}]}"#;
        let bad_weight =
            r#"{"prize_pools":[{"items":[{"name":"A","quantity":1,"probability":-1.0}]}]}"#;
        let empty = r#"{"prize_pools":[]}"#;
        let zero_refresh = r#"{"refresh_cost":0,"prize_pools":[{"items":[{"name":"A","quantity":1,"probability":1.0}]}]}"#;
        for json in [bad_quantity, bad_weight, empty, zero_refresh] {
            assert!(matches!(
                CatalogData::from_json(json),
                Err(FortuneError::InvalidConfiguration(_))
            ));
        }
        assert!(matches!(
            CatalogData::from_json("{"),
            Err(FortuneError::Parse(_))
        ));
    }

    #[test]
    fn next_milestone_skips_reached_entries() {
        let data = CatalogData::from_json(sample_json()).unwrap();
        assert_eq!(data.next_milestone(0).map(|m| m.milestone), Some(10));
        assert_eq!(data.next_milestone(10).map(|m| m.milestone), Some(50));
        assert!(data.next_milestone(50).is_none());
    }

    #[test]
    fn bundled_catalog_is_valid() {
        let data = CatalogData::bundled().unwrap();
        assert!(!data.wish_rewards.is_empty());
        for wish in &data.wish_rewards {
            assert!(data.resolve(&wish.name).is_ok());
        }
    }
}
