use engine::{search, FieldSpec, SearchableRecord};
use proptest::prelude::*;
use std::collections::HashSet;

fn spec() -> FieldSpec {
    FieldSpec::new(&[("title", 100), ("topic", 60), ("content", 20)])
}

const WORDS: &[&str] = &["faith", "Grace", "HOPE", "love", "prayer", "trials", ""];

fn word() -> impl Strategy<Value = String> {
    prop::sample::select(WORDS).prop_map(str::to_string)
}

fn record_strategy() -> impl Strategy<Value = (String, String, String, u32)> {
    (word(), word(), word(), 1u32..=28)
}

fn records() -> impl Strategy<Value = Vec<SearchableRecord>> {
    prop::collection::vec(record_strategy(), 0..24).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (title, topic, content, day))| {
                SearchableRecord::new(format!("r{i}"), format!("2024-02-{day:02}"))
                    .with_field("title", [title])
                    .with_field("topic", [topic])
                    .with_field("content", [content])
            })
            .collect()
    })
}

fn query() -> impl Strategy<Value = String> {
    prop_oneof![
        word(),
        Just("   ".to_string()),
        word().prop_map(|w| format!("  {}  ", w.to_uppercase())),
        "[a-z]{1,3}",
    ]
}

proptest! {
    #[test]
    fn blank_query_is_identity(records in records(), pad in " {0,4}") {
        prop_assert_eq!(search(&pad, &records, &spec()), records);
    }

    #[test]
    fn results_are_a_subset_without_duplicates(records in records(), q in query()) {
        let results = search(&q, &records, &spec());
        let ids: HashSet<&str> = results.iter().map(|r| r.id.as_str()).collect();
        prop_assert_eq!(ids.len(), results.len());
        for r in &results {
            prop_assert!(records.contains(r));
        }
    }

    #[test]
    fn every_result_matches_and_every_match_is_returned(records in records(), q in query()) {
        let needle = q.trim().to_lowercase();
        prop_assume!(!needle.is_empty());
        let results = search(&q, &records, &spec());
        let expected = records
            .iter()
            .filter(|r| {
                ["title", "topic", "content"]
                    .iter()
                    .any(|f| r.values(f).iter().any(|v| v.to_lowercase().contains(&needle)))
            })
            .count();
        prop_assert_eq!(results.len(), expected);
    }

    #[test]
    fn search_is_deterministic(records in records(), q in query()) {
        prop_assert_eq!(search(&q, &records, &spec()), search(&q, &records, &spec()));
    }
}
