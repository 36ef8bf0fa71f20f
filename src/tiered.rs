use std::{cmp::Reverse, hash::Hash};

use ordered_float::OrderedFloat;

use crate::{
    bucketed::BucketedRanking,
    config::{check_scale, RankingConfig},
    error::{Error, Result},
    normalize::{Normalizer, Scores, TierBands},
    oracle::Oracle,
    FastHashMap,
};

/// Where an item currently lives.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Location {
    pub tier: usize,
    pub bucket: usize,
}

/// One person's ranking: a [`BucketedRanking`] per tier plus a registry that
/// always knows every item's `(tier, bucket)`.
///
/// Global linear positions run through tier 0 first, then tier 1, and so
/// on; position 0 is the best item. Every mutation translates coordinates
/// and validates them before touching any bucket.
pub struct IndividualTieredRanking<T, O, N = TierBands> {
    tiers: Vec<BucketedRanking<T>>,
    registry: FastHashMap<T, Location>,
    scores: Scores<T>,
    stale: bool,
    oracle: O,
    normalizer: N,
    config: RankingConfig,
}

impl<T, O> IndividualTieredRanking<T, O>
where
    T: Clone + Eq + Hash,
    O: Oracle<T>,
{
    /// Ranking scored with evenly spaced [`TierBands`].
    pub fn new(config: RankingConfig, oracle: O) -> Result<Self> {
        let bands = TierBands::even(config.tiers);
        Self::with_normalizer(config, oracle, bands)
    }
}

impl<T, O, N> IndividualTieredRanking<T, O, N>
where
    T: Clone + Eq + Hash,
    O: Oracle<T>,
    N: Normalizer<T>,
{
    pub fn with_normalizer(config: RankingConfig, oracle: O, normalizer: N) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            tiers: (0..config.tiers).map(|_| BucketedRanking::new()).collect(),
            registry: FastHashMap::default(),
            scores: Scores::default(),
            stale: false,
            oracle,
            normalizer,
            config,
        })
    }

    #[inline]
    pub fn config(&self) -> &RankingConfig {
        &self.config
    }

    #[inline]
    pub fn tier_count(&self) -> usize {
        self.tiers.len()
    }

    pub fn tier(&self, tier: usize) -> Option<&BucketedRanking<T>> {
        self.tiers.get(tier)
    }

    pub fn tiers(&self) -> &[BucketedRanking<T>] {
        &self.tiers
    }

    pub fn len(&self) -> usize {
        self.tiers.iter().map(|t| t.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.iter().all(|t| t.is_empty())
    }

    pub fn registry(&self) -> &FastHashMap<T, Location> {
        &self.registry
    }

    pub fn location(&self, item: &T) -> Option<Location> {
        self.registry.get(item).copied()
    }

    pub fn contains(&self, item: &T) -> bool {
        self.registry.contains_key(item)
    }

    /// Items in global rank order.
    pub fn iter(&self) -> impl Iterator<Item = (Location, &T)> + '_ {
        self.tiers.iter().enumerate().flat_map(|(tier, ranking)| {
            ranking
                .iter()
                .map(move |(bucket, item)| (Location { tier, bucket }, item))
        })
    }

    #[inline]
    fn check_tier(&self, tier: usize) -> Result<()> {
        if tier >= self.tiers.len() {
            return Err(Error::TierOutOfRange {
                tier,
                tiers: self.tiers.len(),
            });
        }
        Ok(())
    }

    fn items_before_tier(&self, tier: usize) -> usize {
        self.tiers[..tier].iter().map(|t| t.len()).sum()
    }

    /// Resolves a global position in `[0, len]` to `(tier, tier_local_position)`.
    ///
    /// `len` resolves to the end of the last non-empty tier, so trailing empty
    /// tiers are never entered by position. An empty ranking resolves to the
    /// start of tier 0.
    pub fn tier_position(&self, position: usize) -> Result<(usize, usize)> {
        let total = self.len();
        if position > total {
            return Err(Error::PositionOutOfRange {
                position,
                len: total,
            });
        }
        let mut before = 0usize;
        for (tier, ranking) in self.tiers.iter().enumerate() {
            if position < before + ranking.len() {
                return Ok((tier, position - before));
            }
            before += ranking.len();
        }
        let last = self
            .tiers
            .iter()
            .rposition(|t| !t.is_empty())
            .unwrap_or(0);
        Ok((last, self.tiers[last].len()))
    }

    /// Global linear rank of `item`.
    pub fn rank_of(&self, item: &T) -> Option<usize> {
        let loc = self.registry.get(item)?;
        let local = self.tiers.get(loc.tier)?.linear_position(item, loc.bucket)?;
        Some(self.items_before_tier(loc.tier) + local)
    }

    /// Item at global linear rank `rank`.
    pub fn item_at(&self, rank: usize) -> Option<&T> {
        if rank >= self.len() {
            return None;
        }
        let (tier, local) = self.tier_position(rank).ok()?;
        let ranking = &self.tiers[tier];
        let (bucket, offset) = ranking.coords(local).ok()?;
        ranking.bucket(bucket)?.get(offset)
    }

    /// Inclusive rank range; negative indices count from the end.
    pub fn range(&self, start: isize, stop: isize) -> Vec<&T> {
        let len = self.len() as isize;
        if len == 0 {
            return Vec::new();
        }
        let mut start = if start < 0 { len + start } else { start };
        let mut stop = if stop < 0 { len + stop } else { stop };
        if start < 0 {
            start = 0;
        }
        if stop < 0 {
            return Vec::new();
        }
        if stop >= len {
            stop = len - 1;
        }
        if start > stop {
            return Vec::new();
        }
        self.iter()
            .skip(start as usize)
            .take((stop - start + 1) as usize)
            .map(|(_, item)| item)
            .collect()
    }

    fn apply_shifts(&mut self, tier: usize, shifted: Vec<(T, usize)>) -> Result<()> {
        for (item, bucket) in shifted {
            match self.registry.get_mut(&item) {
                Some(loc) if loc.tier == tier => loc.bucket = bucket,
                _ => {
                    return Err(Error::invariant(format!(
                        "shifted item in tier {tier} has no matching registry entry"
                    )))
                }
            }
        }
        Ok(())
    }

    fn set_location(&mut self, item: &T, location: Location) -> Result<()> {
        match self.registry.get_mut(item) {
            Some(loc) => {
                *loc = location;
                Ok(())
            }
            None => Err(Error::invariant("moved item vanished from the registry")),
        }
    }

    fn missing_from_bucket(location: Location) -> Error {
        Error::invariant(format!(
            "registry places item in tier {}, bucket {} but that bucket does not hold it",
            location.tier, location.bucket
        ))
    }

    fn refresh(&mut self) {
        if self.config.deferred_normalization {
            self.stale = true;
        } else {
            self.rescore(self.config.scale);
        }
    }

    /// Ranks a new item inside `tier` by asking the oracle.
    pub fn insert(&mut self, item: T, tier: usize) -> Result<Location> {
        self.check_tier(tier)?;
        if let Some(loc) = self.registry.get(&item) {
            return Err(Error::AlreadyRanked {
                tier: loc.tier,
                bucket: loc.bucket,
            });
        }
        let placed = self.tiers[tier].binary_insert(item.clone(), &mut self.oracle)?;
        let location = Location {
            tier,
            bucket: placed.bucket,
        };
        self.registry.insert(item, location);
        let shifted = placed.shifted.len();
        self.apply_shifts(tier, placed.shifted)?;
        tracing::debug!(tier, bucket = location.bucket, shifted, "Inserted item.");
        self.refresh();
        Ok(location)
    }

    /// Drops `item`, returning where it was.
    pub fn remove(&mut self, item: &T) -> Result<Location> {
        let location = self.location(item).ok_or(Error::NotFound)?;
        let removal = self
            .tiers
            .get_mut(location.tier)
            .and_then(|ranking| ranking.remove(item, location.bucket))
            .ok_or_else(|| Self::missing_from_bucket(location))?;
        self.registry.remove(item);
        let shifted = removal.shifted.len();
        self.apply_shifts(location.tier, removal.shifted)?;
        tracing::debug!(
            tier = location.tier,
            bucket = location.bucket,
            bucket_dropped = removal.bucket.is_none(),
            shifted,
            "Removed item."
        );
        self.refresh();
        Ok(location)
    }

    /// Moves `item` to global linear `position`, landing immediately before
    /// the item that currently holds it.
    ///
    /// `len` appends it to the last non-empty tier; use
    /// [`relocate`](Self::relocate) to reach an empty tier.
    pub fn rerank(&mut self, item: &T, position: usize) -> Result<Location> {
        let (tier, local) = self.tier_position(position)?;
        self.relocate(item, tier, local)
    }

    /// Moves `item` to `position` within `tier`, across tiers if needed.
    ///
    /// The item always lands in a singleton bucket unless it was already at
    /// the target, which is a no-op.
    pub fn relocate(&mut self, item: &T, tier: usize, position: usize) -> Result<Location> {
        self.check_tier(tier)?;
        let current = self.location(item).ok_or(Error::NotFound)?;

        let location = if current.tier == tier {
            let placed = self.tiers[tier]
                .move_item(item, current.bucket, position)?
                .ok_or_else(|| Self::missing_from_bucket(current))?;
            let location = Location {
                tier,
                bucket: placed.bucket,
            };
            let shifted = placed.shifted.len();
            self.set_location(item, location)?;
            self.apply_shifts(tier, placed.shifted)?;
            tracing::debug!(tier, bucket = location.bucket, shifted, "Moved item within tier.");
            location
        } else {
            let len = self.tiers[tier].len();
            if position > len {
                return Err(Error::PositionOutOfRange { position, len });
            }
            let removal = self.tiers[current.tier]
                .remove(item, current.bucket)
                .ok_or_else(|| Self::missing_from_bucket(current))?;
            self.apply_shifts(current.tier, removal.shifted)?;
            let placed = self.tiers[tier].direct_insert(item.clone(), position)?;
            let location = Location {
                tier,
                bucket: placed.bucket,
            };
            self.set_location(item, location)?;
            self.apply_shifts(tier, placed.shifted)?;
            tracing::debug!(
                from_tier = current.tier,
                tier,
                bucket = location.bucket,
                "Moved item across tiers."
            );
            location
        };

        self.refresh();
        Ok(location)
    }

    /// Recomputes scores on `scale` through the normalizer.
    ///
    /// `scale` must be finite and positive; otherwise the current scores are
    /// kept and `InvalidConfig` is returned.
    pub fn normalize(&mut self, scale: f64) -> Result<&Scores<T>> {
        check_scale(scale)?;
        self.rescore(scale);
        Ok(&self.scores)
    }

    fn rescore(&mut self, scale: f64) {
        self.scores = self.normalizer.normalize(scale, &self.tiers);
        self.stale = false;
    }

    /// Last computed scores; see [`is_stale`](Self::is_stale).
    pub fn scores(&self) -> &Scores<T> {
        &self.scores
    }

    pub fn score(&self, item: &T) -> Option<f64> {
        self.scores.get(item).copied()
    }

    /// True when a deferred-normalization ranking changed since the last
    /// `normalize`.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Scored items, best score first; equal scores keep rank order.
    pub fn ranked_by_score(&self) -> Vec<(&T, f64)> {
        let mut out: Vec<(&T, f64)> = self
            .iter()
            .filter_map(|(_, item)| self.score(item).map(|s| (item, s)))
            .collect();
        out.sort_by_key(|&(_, score)| Reverse(OrderedFloat(score)));
        out
    }

    /// Verifies that the registry and the buckets describe the same items
    /// at the same coordinates and that no bucket is empty.
    pub fn check_invariants(&self) -> Result<()> {
        let mut seen = 0usize;
        for (tier, ranking) in self.tiers.iter().enumerate() {
            let mut count = 0usize;
            for (bucket, items) in ranking.buckets().enumerate() {
                if items.is_empty() {
                    return Err(Error::invariant(format!(
                        "tier {tier} holds empty bucket {bucket}"
                    )));
                }
                let expected = Location { tier, bucket };
                for item in items {
                    match self.registry.get(item) {
                        Some(loc) if *loc == expected => {}
                        other => {
                            return Err(Error::invariant(format!(
                                "item at {expected:?} is registered at {other:?}"
                            )))
                        }
                    }
                }
                count += items.len();
            }
            if count != ranking.len() {
                return Err(Error::invariant(format!(
                    "tier {tier} caches {} items but holds {count}",
                    ranking.len()
                )));
            }
            seen += count;
        }
        if seen != self.registry.len() {
            return Err(Error::invariant(format!(
                "buckets hold {seen} items but the registry has {}",
                self.registry.len()
            )));
        }
        Ok(())
    }
}
