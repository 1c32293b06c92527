//! Empirical check of the weighted sampler against a pool's declared weights.
use rand::Rng;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::catalog::{RewardItem, RewardKey};
use crate::error::FortuneError;
use crate::numbers::{percentage, u64_to_f64};
use crate::sampler::weighted_choice;

/// Expected versus observed selection rate for one reward identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyRow {
    pub reward: RewardKey,
    pub expected_pct: f64,
    pub observed_pct: f64,
    pub difference: f64,
}

/// Draw `draws` items from `items` and compare observed frequencies with weights.
///
/// Rows come back in catalog order. Identities listed more than once have
/// their weights pooled.
///
/// # Errors
///
/// Returns [`FortuneError::InvalidWeights`] when `items` cannot be sampled.
pub fn verify_sampler<R>(
    items: &[RewardItem],
    draws: u64,
    rng: &mut R,
) -> Result<Vec<FrequencyRow>, FortuneError>
where
    R: Rng + ?Sized,
{
    let total_weight: f64 = items
        .iter()
        .map(|item| item.probability)
        .filter(|w| *w > 0.0)
        .sum();

    let mut order: Vec<RewardKey> = Vec::new();
    let mut weights: BTreeMap<RewardKey, f64> = BTreeMap::new();
    for item in items {
        let key = item.key();
        if !weights.contains_key(&key) {
            order.push(key.clone());
        }
        *weights.entry(key).or_insert(0.0) += item.probability.max(0.0);
    }

    let mut counts: BTreeMap<RewardKey, u64> = BTreeMap::new();
    for _ in 0..draws {
        let pick = weighted_choice(items, rng)?;
        *counts.entry(pick.key()).or_insert(0) += 1;
    }

    let draws_f = u64_to_f64(draws);
    let rows = order
        .into_iter()
        .map(|key| {
            let expected_pct = percentage(weights.get(&key).copied().unwrap_or(0.0), total_weight);
            let observed = u64_to_f64(counts.get(&key).copied().unwrap_or(0));
            let observed_pct = percentage(observed, draws_f);
            FrequencyRow {
                reward: key,
                expected_pct,
                observed_pct,
                difference: observed_pct - expected_pct,
            }
        })
        .collect();
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn observed_rates_track_weights() {
        let items = vec![
            RewardItem::new("Wood", 1, 30.0),
            RewardItem::new("Gems", 5, 10.0),
        ];
        let mut rng = SmallRng::seed_from_u64(21);
        let rows = verify_sampler(&items, 100_000, &mut rng).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].reward.name, "Wood");
        assert!((rows[0].expected_pct - 75.0).abs() < 1e-9);
        assert!(rows[0].difference.abs() < 1.0, "{:?}", rows[0]);
        assert!((rows[1].expected_pct - 25.0).abs() < 1e-9);
        let observed: f64 = rows.iter().map(|r| r.observed_pct).sum();
        assert!((observed - 100.0).abs() < 1e-6);
    }

    #[test]
    fn zero_draws_reports_zero_observed() {
        let items = vec![RewardItem::new("Wood", 1, 1.0)];
        let mut rng = SmallRng::seed_from_u64(1);
        let rows = verify_sampler(&items, 0, &mut rng).unwrap();
        assert!((rows[0].expected_pct - 100.0).abs() < 1e-9);
        assert!(rows[0].observed_pct.abs() < f64::EPSILON);
    }

    #[test]
    fn empty_pool_is_rejected() {
        let mut rng = SmallRng::seed_from_u64(1);
        assert!(verify_sampler(&[], 10, &mut rng).is_err());
    }
}
