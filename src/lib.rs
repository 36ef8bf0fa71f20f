#![deny(clippy::uninlined_format_args)]
#![deny(clippy::to_string_in_format_args)]
//! Tiered ranking of items by pairwise comparison.
//!
//! An [`IndividualTieredRanking`] owns one [`BucketedRanking`] per tier.
//! Items enter a tier by binary search against an [`Oracle`], tied items
//! share a bucket, and a registry tracks every item's `(tier, bucket)` as
//! buckets appear, split and disappear. After each change a [`Normalizer`]
//! turns the structure into scores on a fixed scale.
//!
//! ```
//! use tierrank::{Ascending, IndividualTieredRanking, RankingConfig};
//!
//! let mut ranking = IndividualTieredRanking::new(RankingConfig::new(3, 100.0), Ascending)?;
//! for item in [5, 3, 8, 4] {
//!     ranking.insert(item, 1)?;
//! }
//! ranking.rerank(&8, 0)?;
//! assert_eq!(ranking.range(0, -1), vec![&8, &3, &4, &5]);
//! # Ok::<(), tierrank::Error>(())
//! ```

#[cfg(not(feature = "fast-hash"))]
use ahash::RandomState;
#[cfg(feature = "fast-hash")]
use rustc_hash::FxHasher;
#[cfg(feature = "fast-hash")]
use std::hash::BuildHasherDefault;

pub mod bucketed;
pub mod command;
pub mod config;
pub mod error;
pub mod format;
pub mod normalize;
pub mod oracle;
pub mod tiered;

pub use bucketed::{Bucket, BucketedRanking, Placement, Removal};
pub use config::RankingConfig;
pub use error::{Error, Result};
pub use normalize::{Normalizer, Scores, TierBands};
pub use oracle::{Ascending, Descending, Oracle, Verdict};
pub use tiered::{IndividualTieredRanking, Location};

#[cfg(feature = "fast-hash")]
type Build = BuildHasherDefault<FxHasher>;
#[cfg(not(feature = "fast-hash"))]
type Build = RandomState;

/// Hash map used for the registry and score tables.
pub type FastHashMap<K, V> = hashbrown::HashMap<K, V, Build>;
