mod helpers;

use std::cell::Cell;
use std::rc::Rc;

use helpers::{assert_consistent, keyed, keyed_ranking, keys, state, ByKey, Keyed};
use tierrank::{
    BucketedRanking, Error, IndividualTieredRanking, Location, RankingConfig, Scores, Verdict,
};

#[test]
fn second_equal_item_ties_into_existing_bucket() {
    let mut ranking = keyed_ranking(3, 100.0);
    for (id, key) in [(1, 5), (2, 3), (3, 8), (4, 3)] {
        ranking.insert(keyed(id, key), 1).unwrap();
    }
    let tier = ranking.tier(1).unwrap();
    assert_eq!(keys(tier), vec![vec![3, 3], vec![5], vec![8]]);
    assert_eq!(
        ranking.location(&keyed(4, 3)),
        Some(Location { tier: 1, bucket: 0 })
    );
    assert!(ranking.tier(0).unwrap().is_empty());
    assert_consistent(&ranking);
}

#[test]
fn removing_singleton_bucket_shifts_later_buckets_by_one() {
    let mut ranking = keyed_ranking(3, 100.0);
    for (id, key) in [(1, 1), (2, 2), (3, 3), (4, 3), (5, 4)] {
        ranking.insert(keyed(id, key), 0).unwrap();
    }
    let before: Vec<_> = [keyed(3, 3), keyed(4, 3), keyed(5, 4)]
        .iter()
        .map(|item| ranking.location(item).unwrap().bucket)
        .collect();

    let removed = ranking.remove(&keyed(2, 2)).unwrap();
    assert_eq!(removed, Location { tier: 0, bucket: 1 });

    let after: Vec<_> = [keyed(3, 3), keyed(4, 3), keyed(5, 4)]
        .iter()
        .map(|item| ranking.location(item).unwrap().bucket)
        .collect();
    assert_eq!(after, before.iter().map(|b| b - 1).collect::<Vec<_>>());
    assert_eq!(ranking.location(&keyed(1, 1)).unwrap().bucket, 0);
    assert_consistent(&ranking);
}

#[test]
fn removing_from_shared_bucket_keeps_indices() {
    let mut ranking = keyed_ranking(1, 10.0);
    for (id, key) in [(1, 1), (2, 1), (3, 2)] {
        ranking.insert(keyed(id, key), 0).unwrap();
    }
    ranking.remove(&keyed(1, 1)).unwrap();
    assert_eq!(
        ranking.location(&keyed(2, 1)),
        Some(Location { tier: 0, bucket: 0 })
    );
    assert_eq!(
        ranking.location(&keyed(3, 2)),
        Some(Location { tier: 0, bucket: 1 })
    );
    assert_consistent(&ranking);
}

#[test]
fn rerank_to_current_position_changes_nothing() {
    let mut ranking = keyed_ranking(3, 100.0);
    for (id, key, tier) in [(1, 1, 0), (2, 2, 0), (3, 2, 1), (4, 7, 1)] {
        ranking.insert(keyed(id, key), tier).unwrap();
    }
    let before = state(&ranking);
    let scores_before = ranking.scores().clone();
    for (loc, item) in before.clone() {
        let rank = ranking.rank_of(&item).unwrap();
        assert_eq!(ranking.rerank(&item, rank).unwrap(), loc);
        assert_eq!(state(&ranking), before);
    }
    assert_eq!(ranking.scores(), &scores_before);
}

#[test]
fn rerank_across_tiers_moves_exactly_one_item() {
    let mut ranking = keyed_ranking(3, 100.0);
    for (id, key) in [(1, 1), (2, 2)] {
        ranking.insert(keyed(id, key), 0).unwrap();
    }
    for (id, key) in [(3, 5), (4, 5), (5, 9)] {
        ranking.insert(keyed(id, key), 2).unwrap();
    }
    assert_eq!(keys(ranking.tier(2).unwrap()), vec![vec![5, 5], vec![9]]);

    // Global 3 is the second member of tier 2's tie bucket.
    let moved = keyed(1, 1);
    let loc = ranking.rerank(&moved, 3).unwrap();

    assert_eq!(loc, Location { tier: 2, bucket: 1 });
    assert_eq!(ranking.tier(0).unwrap().len(), 1);
    assert_eq!(ranking.tier(2).unwrap().len(), 4);
    assert_eq!(ranking.tier(2).unwrap().bucket_count(), 4);
    assert_eq!(keys(ranking.tier(2).unwrap()), vec![vec![5], vec![1], vec![5], vec![9]]);
    assert_eq!(ranking.rank_of(&moved), Some(2));
    assert_eq!(
        ranking.location(&keyed(2, 2)),
        Some(Location { tier: 0, bucket: 0 })
    );
    assert_consistent(&ranking);
}

#[test]
fn rerank_to_end_appends_to_last_tier() {
    let mut ranking = keyed_ranking(2, 10.0);
    for (id, key) in [(1, 1), (2, 2)] {
        ranking.insert(keyed(id, key), 0).unwrap();
    }
    ranking.insert(keyed(3, 3), 1).unwrap();
    let total = ranking.len();
    let loc = ranking.rerank(&keyed(1, 1), total).unwrap();
    assert_eq!(loc, Location { tier: 1, bucket: 1 });
    assert_eq!(ranking.item_at(total - 1), Some(&keyed(1, 1)));
    assert_consistent(&ranking);
}

#[test]
fn undecidable_is_not_a_tie() {
    let oracle = |candidate: &Keyed, representative: &Keyed| {
        if candidate.key == representative.key {
            Verdict::Undecidable
        } else {
            Verdict::from_ordering(candidate.key.partial_cmp(&representative.key))
        }
    };
    let mut ranking: IndividualTieredRanking<Keyed, _> =
        IndividualTieredRanking::new(RankingConfig::new(1, 10.0), oracle).unwrap();
    ranking.insert(keyed(1, 4), 0).unwrap();
    ranking.insert(keyed(2, 9), 0).unwrap();
    let before = state(&ranking);

    let err = ranking.insert(keyed(3, 4), 0).unwrap_err();
    assert!(matches!(err, Error::Undecidable { .. }));
    assert_eq!(state(&ranking), before);
    assert!(!ranking.contains(&keyed(3, 4)));
    assert_eq!(ranking.score(&keyed(3, 4)), None);
}

#[test]
fn errors_report_before_mutating() {
    let mut ranking = keyed_ranking(2, 10.0);
    ranking.insert(keyed(1, 1), 0).unwrap();
    let before = state(&ranking);

    assert_eq!(
        ranking.insert(keyed(2, 2), 5).unwrap_err(),
        Error::TierOutOfRange { tier: 5, tiers: 2 }
    );
    assert_eq!(ranking.remove(&keyed(9, 9)).unwrap_err(), Error::NotFound);
    assert_eq!(
        ranking.rerank(&keyed(1, 1), 4).unwrap_err(),
        Error::PositionOutOfRange { position: 4, len: 1 }
    );
    assert_eq!(
        ranking.relocate(&keyed(1, 1), 2, 0).unwrap_err(),
        Error::TierOutOfRange { tier: 2, tiers: 2 }
    );
    assert_eq!(state(&ranking), before);
}

#[test]
fn normalizer_runs_after_every_mutation() {
    let calls = Rc::new(Cell::new(0usize));
    let counter = Rc::clone(&calls);
    let normalizer = move |scale: f64, tiers: &[BucketedRanking<Keyed>]| {
        counter.set(counter.get() + 1);
        let mut scores = Scores::default();
        for (t, tier) in tiers.iter().enumerate() {
            for (_, item) in tier.iter() {
                scores.insert(item.clone(), scale / (t + 1) as f64);
            }
        }
        scores
    };
    let mut ranking =
        IndividualTieredRanking::with_normalizer(RankingConfig::new(2, 60.0), ByKey, normalizer)
            .unwrap();

    ranking.insert(keyed(1, 1), 0).unwrap();
    ranking.insert(keyed(2, 2), 1).unwrap();
    ranking.rerank(&keyed(2, 2), 0).unwrap();
    ranking.remove(&keyed(1, 1)).unwrap();
    assert_eq!(calls.get(), 4);
    assert_eq!(ranking.score(&keyed(2, 2)), Some(60.0));

    // Failed operations leave scores alone.
    assert!(ranking.remove(&keyed(1, 1)).is_err());
    assert_eq!(calls.get(), 4);
}

#[test]
fn deferred_normalization_waits_for_explicit_call() {
    let config = RankingConfig {
        deferred_normalization: true,
        ..RankingConfig::new(3, 100.0)
    };
    let mut ranking = IndividualTieredRanking::new(config, ByKey).unwrap();
    for (id, key) in [(1, 3), (2, 1), (3, 2)] {
        ranking.insert(keyed(id, key), 0).unwrap();
    }
    assert!(ranking.is_stale());
    assert!(ranking.scores().is_empty());

    let scores = ranking.normalize(100.0).unwrap().clone();
    assert_eq!(scores.len(), 3);
    assert!(!ranking.is_stale());
    assert!(scores[&keyed(2, 1)] > scores[&keyed(3, 2)]);
    assert!(scores[&keyed(3, 2)] > scores[&keyed(1, 3)]);
}

#[test]
fn scores_stay_in_scale_and_follow_rank() {
    let mut ranking = keyed_ranking(3, 100.0);
    for (id, key, tier) in [(1, 4, 2), (2, 1, 1), (3, 1, 1), (4, 2, 0), (5, 8, 0), (6, 3, 2)] {
        ranking.insert(keyed(id, key), tier).unwrap();
    }
    let ordered: Vec<f64> = ranking
        .iter()
        .map(|(_, item)| ranking.score(item).unwrap())
        .collect();
    for pair in ordered.windows(2) {
        assert!(pair[0] >= pair[1], "scores out of order: {ordered:?}");
    }
    assert!(ordered.iter().all(|s| (0.0..=100.0).contains(s)));
    assert_eq!(
        ranking.score(&keyed(2, 1)),
        ranking.score(&keyed(3, 1)),
        "tied items share a score"
    );
}
