#![allow(dead_code)]

use std::{sync::Mutex, time::Duration};

use once_cell::sync::Lazy;
use rand::{rngs::StdRng, Rng, SeedableRng};
use tierrank::{IndividualTieredRanking, Oracle, RankingConfig, Verdict};

/// Compares items on their high 32 bits; the low bits only keep identities
/// distinct so equal keys can tie.
#[derive(Clone, Copy, Default)]
pub struct HighBits;

impl Oracle<u64> for HighBits {
    fn compare(&mut self, candidate: &u64, representative: &u64) -> Verdict {
        Verdict::from_ordering((candidate >> 32).partial_cmp(&(representative >> 32)))
    }
}

pub type Ranking = IndividualTieredRanking<u64, HighBits>;

pub const TIERS: usize = 5;

static BASE_SEED: Lazy<u64> = Lazy::new(|| {
    std::env::var("TIERRANK_BENCH_SEED")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(0x7d11_5eed_f065_cafe)
});

static RNG_COUNTER: Lazy<Mutex<u64>> = Lazy::new(|| Mutex::new(0));

pub fn usize_env(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

pub fn duration_env(name: &str, default_secs: f64) -> Duration {
    let secs = std::env::var(name)
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(default_secs);
    Duration::from_secs_f64(secs)
}

#[inline]
pub fn seeded_rng() -> StdRng {
    let mut guard = RNG_COUNTER.lock().unwrap();
    let seed = BASE_SEED.wrapping_add(*guard);
    *guard = guard.wrapping_add(1);
    StdRng::seed_from_u64(seed)
}

fn item(key: u64, id: usize) -> u64 {
    (key << 32) | id as u64
}

/// `(item, tier)` pairs with mostly distinct keys spread over all tiers.
pub fn uniform_random(n: usize) -> Vec<(u64, usize)> {
    let mut rng = seeded_rng();
    (0..n)
        .map(|i| (item(rng.gen::<u32>() as u64, i), rng.gen_range(0..TIERS)))
        .collect()
}

/// Keys drawn from `distinct` values, so most inserts join a tie bucket.
pub fn high_ties(n: usize, distinct: u64) -> Vec<(u64, usize)> {
    let mut rng = seeded_rng();
    (0..n)
        .map(|i| (item(rng.gen_range(0..distinct.max(1)), i), rng.gen_range(0..TIERS)))
        .collect()
}

pub fn empty(deferred: bool) -> Ranking {
    let config = RankingConfig {
        deferred_normalization: deferred,
        ..RankingConfig::new(TIERS, 100.0)
    };
    IndividualTieredRanking::new(config, HighBits).expect("valid config")
}

/// Deferred ranking holding `entries`, normalized once at the end.
pub fn build(entries: &[(u64, usize)]) -> Ranking {
    let mut ranking = empty(true);
    for &(item, tier) in entries {
        ranking.insert(item, tier).expect("distinct items");
    }
    ranking.normalize(100.0).expect("valid scale");
    ranking
}

pub fn pick_existing(ranking: &Ranking, count: usize) -> Vec<u64> {
    let mut rng = seeded_rng();
    let items: Vec<u64> = ranking.iter().map(|(_, item)| *item).collect();
    if items.is_empty() {
        return Vec::new();
    }
    (0..count)
        .map(|_| items[rng.gen_range(0..items.len())])
        .collect()
}
