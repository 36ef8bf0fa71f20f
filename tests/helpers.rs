#![allow(dead_code)]

use std::fmt::Debug;
use std::hash::Hash;

use tierrank::{
    BucketedRanking, IndividualTieredRanking, Location, Normalizer, Oracle, RankingConfig,
    Verdict,
};

/// Item whose identity is independent of its sort key, so equal keys tie
/// without colliding in the registry.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Keyed {
    pub id: u32,
    pub key: i32,
}

pub fn keyed(id: u32, key: i32) -> Keyed {
    Keyed { id, key }
}

/// Smaller key first.
#[derive(Clone, Copy, Debug, Default)]
pub struct ByKey;

impl Oracle<Keyed> for ByKey {
    fn compare(&mut self, candidate: &Keyed, representative: &Keyed) -> Verdict {
        Verdict::from_ordering(candidate.key.partial_cmp(&representative.key))
    }
}

pub type KeyedRanking = IndividualTieredRanking<Keyed, ByKey>;

pub fn keyed_ranking(tiers: usize, scale: f64) -> KeyedRanking {
    IndividualTieredRanking::new(RankingConfig::new(tiers, scale), ByKey).expect("valid config")
}

pub fn keys(ranking: &BucketedRanking<Keyed>) -> Vec<Vec<i32>> {
    ranking
        .buckets()
        .map(|b| b.iter().map(|k| k.key).collect())
        .collect()
}

/// Full structural state: every tier's buckets plus each item's location.
pub fn state<T, O, N>(ranking: &IndividualTieredRanking<T, O, N>) -> Vec<(Location, T)>
where
    T: Clone + Eq + Hash,
    O: Oracle<T>,
    N: Normalizer<T>,
{
    ranking
        .iter()
        .map(|(loc, item)| (loc, item.clone()))
        .collect()
}

pub fn assert_consistent<T, O, N>(ranking: &IndividualTieredRanking<T, O, N>)
where
    T: Clone + Eq + Hash + Debug,
    O: Oracle<T>,
    N: Normalizer<T>,
{
    if let Err(err) = ranking.check_invariants() {
        panic!("inconsistent ranking: {err}");
    }
    for (loc, item) in ranking.iter() {
        assert_eq!(ranking.location(item), Some(loc), "registry drift for {item:?}");
    }
    assert_eq!(ranking.registry().len(), ranking.len());
}
