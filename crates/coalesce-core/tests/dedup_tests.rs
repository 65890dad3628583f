//! End-to-end duplicate detection and merge behavior

use std::collections::HashMap;

use proptest::prelude::*;

use coalesce_core::{
    FieldKind, MatchConfig, MergeResolver, MergeStrategy, Record, RecordBatch, RecordMatcher,
};

fn contact(first: &str, last: &str, email: &str, phone: &str) -> Record {
    Record::from_pairs(vec![
        ("first_name".to_string(), first.to_string()),
        ("last_name".to_string(), last.to_string()),
        ("email".to_string(), email.to_string()),
        ("phone".to_string(), phone.to_string()),
    ])
}

fn contact_batch(rows: &[(&str, &str, &str, &str)]) -> RecordBatch {
    let mut batch = RecordBatch::new(vec![
        "first_name".to_string(),
        "last_name".to_string(),
        "email".to_string(),
        "phone".to_string(),
    ]);
    for &(first, last, email, phone) in rows {
        batch.push(contact(first, last, email, phone));
    }
    batch
}

#[test]
fn exact_email_and_phone_duplicates_cluster_with_full_confidence() {
    let batch = contact_batch(&[
        ("Ann", "Smith", "ann@x.com", "555-123-4567"),
        ("Ann", "Smith", "ann@x.com", "(555) 123 4567"),
        ("Bob", "Jones", "bob@y.org", "999-888-0000"),
    ]);
    let mut matcher = RecordMatcher::new(&batch, MatchConfig::default()).unwrap();
    let clusters = matcher.find_duplicates();

    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].record_indices, vec![0, 1]);
    assert_eq!(clusters[0].confidence, 1.0);
}

#[test]
fn near_miss_emails_do_not_cluster_on_email_alone() {
    // Same email block prefix, different addresses, everything else disjoint
    let batch = contact_batch(&[
        ("Ann", "Smith", "annabel@x.com", "111-111-1111"),
        ("Zoe", "Brown", "annabeth@y.org", "222-222-2222"),
    ]);
    let mut matcher = RecordMatcher::new(&batch, MatchConfig::default()).unwrap();
    assert!(matcher.find_duplicates().is_empty());
}

#[test]
fn clusters_partition_the_record_set() {
    let batch = contact_batch(&[
        ("Ann", "Smith", "ann@x.com", "555-123-4567"),
        ("Ann", "Smith", "ann@x.com", "555-123-4567"),
        ("Ann", "Smyth", "ann@x.com", "555-123-4567"),
        ("Bob", "Jones", "bob@y.org", "999-888-0000"),
        ("Rob", "Jones", "bob@y.org", "999-888-0000"),
    ]);
    let mut matcher = RecordMatcher::new(&batch, MatchConfig::default()).unwrap();
    let clusters = matcher.find_duplicates();

    let mut seen = std::collections::HashSet::new();
    for cluster in clusters {
        assert!(cluster.record_indices.len() >= 2);
        for &index in &cluster.record_indices {
            assert!(index < batch.len());
            assert!(seen.insert(index), "record {index} appears in two clusters");
        }
    }
}

#[test]
fn merge_then_rematch_finds_nothing_new() {
    let batch = contact_batch(&[
        ("Ann", "Smith", "ann@x.com", "555-123-4567"),
        ("Annie", "Smith", "ann@x.com", "5551234567"),
        ("Bob", "Jones", "bob@y.org", "999-888-0000"),
    ]);
    let mut matcher = RecordMatcher::new(&batch, MatchConfig::default()).unwrap();
    let clusters = matcher.find_duplicates().to_vec();
    assert!(!clusters.is_empty());

    let (merged, _) = MergeResolver::new(&batch).bulk_merge(&clusters);
    let mut rematch = RecordMatcher::new(&merged, MatchConfig::default()).unwrap();
    assert!(
        rematch.find_duplicates().is_empty(),
        "merging must be idempotent"
    );
}

#[test]
fn keep_most_complete_prefers_the_fuller_record() {
    let mut batch = RecordBatch::new(vec![
        "first_name".to_string(),
        "email".to_string(),
        "company".to_string(),
    ]);
    batch.push(Record::from_pairs(vec![
        ("first_name".to_string(), "Jon".to_string()),
        ("email".to_string(), "jon@x.com".to_string()),
        ("company".to_string(), String::new()),
    ]));
    batch.push(Record::from_pairs(vec![
        ("first_name".to_string(), "Jonathan".to_string()),
        ("email".to_string(), "jon@x.com".to_string()),
        ("company".to_string(), "Acme".to_string()),
    ]));

    let resolver =
        MergeResolver::new(&batch).with_default_strategy(MergeStrategy::KeepMostComplete);
    let result = resolver.merge_records(&[0, 1]);

    assert_eq!(result.merged_record.value("first_name"), "Jonathan");
    assert_eq!(result.merged_record.value("company"), "Acme");
}

#[test]
fn concatenate_joins_distinct_values_in_first_seen_order() {
    let mut batch = RecordBatch::new(vec!["notes".to_string()]);
    for note in ["Called once", "Left voicemail", "Called once"] {
        batch.push(Record::from_pairs(vec![(
            "notes".to_string(),
            note.to_string(),
        )]));
    }

    let resolver =
        MergeResolver::new(&batch).with_field_strategy("notes", MergeStrategy::Concatenate);
    let result = resolver.merge_records(&[0, 1, 2]);
    assert_eq!(
        result.merged_record.value("notes"),
        "Called once; Left voicemail"
    );
}

#[test]
fn transitive_cluster_confidence_averages_observed_pairs() {
    // 0-1 and 1-2 share phones; 0-2 only meet transitively
    let config = MatchConfig {
        field_weights: HashMap::from([("phone".to_string(), 1.0)]),
        duplicate_threshold: 0.8,
        blocking_fields: vec!["phone".to_string()],
        field_kinds: HashMap::from([("phone".to_string(), FieldKind::Phone)]),
    };
    let batch = contact_batch(&[
        ("A", "A", "", "555-123-4567"),
        ("B", "B", "", "+1 555 123 4567"),
        ("C", "C", "", "15551234567"),
    ]);
    let mut matcher = RecordMatcher::new(&batch, config).unwrap();
    let clusters = matcher.find_duplicates();

    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].record_indices, vec![0, 1, 2]);
    // Pairs (0,1) and (0,2) score 0.9, (1,2) scores 1.0
    assert!((clusters[0].confidence - (0.9 + 0.9 + 1.0) / 3.0).abs() < 1e-9);
}

proptest! {
    #[test]
    fn every_record_matches_itself(
        first in "[A-Za-z]{1,12}",
        last in "[A-Za-z]{1,12}",
        email in "[a-z]{1,8}@[a-z]{1,8}\\.com",
        phone in "[0-9]{10}",
    ) {
        let a = contact(&first, &last, &email, &phone);
        let (score, _) = coalesce_core::dedup::score_pair(&a, &a, &MatchConfig::default());
        prop_assert_eq!(score, 1.0);
    }

    #[test]
    fn pair_scores_stay_in_unit_interval(
        email_a in "[a-z]{1,8}@[a-z]{1,8}\\.com",
        email_b in "[a-z]{1,8}@[a-z]{1,8}\\.com",
        phone_a in "[0-9]{7,12}",
        phone_b in "[0-9]{7,12}",
    ) {
        let a = contact("Ann", "Smith", &email_a, &phone_a);
        let b = contact("Ann", "Smith", &email_b, &phone_b);
        let (score, fields) = coalesce_core::dedup::score_pair(&a, &b, &MatchConfig::default());
        prop_assert!((0.0..=1.0).contains(&score));
        for value in fields.values() {
            prop_assert!((0.0..=1.0).contains(value));
        }
    }

    #[test]
    fn merged_record_values_come_from_members(
        title_a in "[A-Za-z ]{1,16}",
        title_b in "[A-Za-z ]{1,16}",
    ) {
        let mut batch = RecordBatch::new(vec!["title".to_string()]);
        for title in [&title_a, &title_b] {
            batch.push(Record::from_pairs(vec![(
                "title".to_string(),
                title.to_string(),
            )]));
        }
        let result = MergeResolver::new(&batch).merge_records(&[0, 1]);
        let merged = result.merged_record.value("title");
        prop_assert!(
            merged == title_a.trim() || merged == title_b.trim(),
            "merge must pick an existing value, got {merged:?}"
        );
    }
}
