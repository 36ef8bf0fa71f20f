use crate::error::{Error, Result};

/// Shape of an [`IndividualTieredRanking`](crate::IndividualTieredRanking).
#[derive(Clone, Debug, PartialEq)]
pub struct RankingConfig {
    /// Number of tiers, numbered `0..tiers` with tier 0 ranked highest.
    pub tiers: usize,
    /// Upper end of the score range.
    pub scale: f64,
    /// Skip normalization on mutation; scores refresh only on `normalize`.
    pub deferred_normalization: bool,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            tiers: 3,
            scale: 10.0,
            deferred_normalization: false,
        }
    }
}

impl RankingConfig {
    pub fn new(tiers: usize, scale: f64) -> Self {
        Self {
            tiers,
            scale,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.tiers == 0 {
            return Err(Error::InvalidConfig {
                message: "tiers must be greater than zero.".to_string(),
            });
        }
        check_scale(self.scale)
    }
}

/// Rejects a scale that would put scores outside `[0, scale]`.
pub(crate) fn check_scale(scale: f64) -> Result<()> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(Error::InvalidConfig {
            message: "scale must be finite and greater than zero.".to_string(),
        });
    }
    Ok(())
}
