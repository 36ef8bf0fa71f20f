use ryu::Buffer;
use std::cell::RefCell;
use std::fmt::{Display, Write};
use std::hash::Hash;

use crate::{IndividualTieredRanking, Normalizer, Oracle};

#[inline]
pub fn fmt_score(buf: &mut Buffer, score: f64) -> &str {
    debug_assert!(score.is_finite());
    let formatted = buf.format_finite(score);
    formatted.strip_suffix(".0").unwrap_or(formatted)
}

thread_local! {
    static FMT_BUF: RefCell<Buffer> = RefCell::new(Buffer::new());
}

#[inline]
pub fn with_fmt_buf<F, R>(f: F) -> R
where
    F: FnOnce(&mut Buffer) -> R,
{
    FMT_BUF.with(|b| f(&mut b.borrow_mut()))
}

/// One line per bucket, tiers in order:
///
/// ```text
/// tier 0
///   [0] a=9.5 b=9.5
/// tier 1
///   (empty)
/// ```
///
/// Items without a current score print as `item=-`.
pub fn render<T, O, N>(ranking: &IndividualTieredRanking<T, O, N>) -> String
where
    T: Display + Clone + Eq + Hash,
    O: Oracle<T>,
    N: Normalizer<T>,
{
    let mut out = String::new();
    for (tier, tier_ranking) in ranking.tiers().iter().enumerate() {
        let _ = writeln!(out, "tier {tier}");
        if tier_ranking.is_empty() {
            out.push_str("  (empty)\n");
            continue;
        }
        for (idx, bucket) in tier_ranking.buckets().enumerate() {
            let _ = write!(out, "  [{idx}]");
            for item in bucket {
                match ranking.score(item) {
                    Some(score) => with_fmt_buf(|buf| {
                        let _ = write!(out, " {item}={}", fmt_score(buf, score));
                    }),
                    None => {
                        let _ = write!(out, " {item}=-");
                    }
                }
            }
            out.push('\n');
        }
    }
    out
}
