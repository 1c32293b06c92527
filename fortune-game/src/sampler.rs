//! Weighted random selection over reward tables.
use rand::Rng;

use crate::catalog::RewardItem;
use crate::error::FortuneError;

/// Anything carrying a selection weight.
pub trait Weighted {
    fn weight(&self) -> f64;
}

impl Weighted for RewardItem {
    fn weight(&self) -> f64 {
        self.probability
    }
}

impl<T> Weighted for (T, f64) {
    fn weight(&self) -> f64 {
        self.1
    }
}

/// Draw one item with probability proportional to its weight.
///
/// A roll `r` is taken uniformly from `[0, total)`; the first item whose
/// running sum reaches `r` wins. Items with non-positive weight are never
/// selected. The input is not mutated.
///
/// # Errors
///
/// Returns [`FortuneError::InvalidWeights`] when `items` is empty or the
/// positive weights do not sum to a finite positive total.
pub fn weighted_choice<'a, T, R>(items: &'a [T], rng: &mut R) -> Result<&'a T, FortuneError>
where
    T: Weighted,
    R: Rng + ?Sized,
{
    let total: f64 = items
        .iter()
        .map(Weighted::weight)
        .filter(|w| *w > 0.0)
        .sum();
    if !total.is_finite() || total <= 0.0 {
        return Err(FortuneError::InvalidWeights { total });
    }

    let roll = rng.r#gen::<f64>() * total;
    let mut upto = 0.0_f64;
    let mut last_positive = None;
    for item in items {
        let weight = item.weight();
        if weight <= 0.0 {
            continue;
        }
        upto += weight;
        if upto >= roll {
            return Ok(item);
        }
        last_positive = Some(item);
    }

    // Accumulated rounding can leave the final sum a hair below the roll.
    last_positive.ok_or(FortuneError::InvalidWeights { total })
}
