use std::hash::Hash;

use crate::bucketed::BucketedRanking;
use crate::config::check_scale;
use crate::error::{Error, Result};
use crate::FastHashMap;

/// Cardinal score per item. Derived state, recomputable from the tiers.
pub type Scores<T> = FastHashMap<T, f64>;

/// Turns the tier/bucket structure into scores in `[0, scale]`.
///
/// Higher is better: an item whose tier or bucket comes first never scores
/// below one that comes later.
pub trait Normalizer<T> {
    fn normalize(&self, scale: f64, tiers: &[BucketedRanking<T>]) -> Scores<T>;
}

impl<T, F> Normalizer<T> for F
where
    F: Fn(f64, &[BucketedRanking<T>]) -> Scores<T>,
{
    fn normalize(&self, scale: f64, tiers: &[BucketedRanking<T>]) -> Scores<T> {
        self(scale, tiers)
    }
}

/// Linearizes tiers into score bands and spreads each tier's buckets over
/// its band by mid-rank.
#[derive(Clone, Debug)]
pub struct TierBands {
    // Upper bound of each band as a fraction of scale, ascending.
    upper: Vec<f64>,
}

impl TierBands {
    /// Evenly spaced bands: tier `t` of `n` tops out at `(n - t) / n`.
    pub fn even(tiers: usize) -> Self {
        let n = tiers.max(1) as f64;
        Self {
            upper: (1..=tiers).map(|i| i as f64 / n).collect(),
        }
    }

    /// Bands from explicit ascending upper thresholds on `scale`, one per tier.
    pub fn with_thresholds(thresholds: &[f64], scale: f64) -> Result<Self> {
        check_scale(scale)?;
        if thresholds.is_empty() {
            return Err(Error::InvalidConfig {
                message: "tier thresholds must not be empty.".to_string(),
            });
        }
        let mut prev = 0.0;
        for &t in thresholds {
            if !t.is_finite() || t <= prev {
                return Err(Error::InvalidConfig {
                    message: "tier thresholds must be positive and strictly ascending."
                        .to_string(),
                });
            }
            prev = t;
        }
        if prev > scale {
            return Err(Error::InvalidConfig {
                message: "tier thresholds must not exceed scale.".to_string(),
            });
        }
        Ok(Self {
            upper: thresholds.iter().map(|t| t / scale).collect(),
        })
    }

    #[inline]
    pub fn tiers(&self) -> usize {
        self.upper.len()
    }

    fn band(&self, tier: usize) -> (f64, f64) {
        let k = self.upper.len() - 1 - tier;
        let lo = if k == 0 { 0.0 } else { self.upper[k - 1] };
        (lo, self.upper[k])
    }
}

impl<T: Clone + Eq + Hash> Normalizer<T> for TierBands {
    fn normalize(&self, scale: f64, tiers: &[BucketedRanking<T>]) -> Scores<T> {
        if tiers.len() != self.upper.len() {
            tracing::warn!(
                configured = self.upper.len(),
                actual = tiers.len(),
                "Tier thresholds do not match tier count; using even bands."
            );
            return TierBands::even(tiers.len()).normalize(scale, tiers);
        }

        let mut scores = Scores::default();
        for (t, tier) in tiers.iter().enumerate() {
            let n = tier.len() as f64;
            let (lo, hi) = self.band(t);
            let mut before = 0usize;
            for bucket in tier.buckets() {
                let mid = before as f64 + bucket.len() as f64 / 2.0;
                let score = scale * (lo + (hi - lo) * (1.0 - mid / n));
                for item in bucket {
                    scores.insert(item.clone(), score);
                }
                before += bucket.len();
            }
        }
        scores
    }
}
