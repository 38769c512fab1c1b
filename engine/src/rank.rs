use crate::parse::parse_date;
use crate::types::{FieldSpec, ScoredRecord, SearchableRecord};
use std::cmp::Ordering;

/// Score a record against an already-normalized query.
///
/// Every field in the spec whose values contain the query (case-insensitive
/// substring) adds its weight once. Returns None when no field matched.
pub fn score_record(query: &str, record: &SearchableRecord, spec: &FieldSpec) -> Option<u32> {
    let mut score = 0u32;
    let mut matched = false;

    for fw in spec.iter() {
        let hit = record
            .values(&fw.field)
            .iter()
            .any(|value| value.to_lowercase().contains(query));
        if hit {
            score = score.saturating_add(fw.weight);
            matched = true;
        }
    }

    matched.then_some(score)
}

/// Compare two scored records for ranking.
///
/// Sort order:
/// 1. Score, descending
/// 2. Primary date, most recent first (unparseable dates last)
/// 3. Input position, ascending
pub fn compare_scored(a: &ScoredRecord, b: &ScoredRecord) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| match (&a.date, &b.date) {
            (Some(da), Some(db)) => db.cmp(da),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.index.cmp(&b.index))
}

/// Score every candidate and return the matches in rank order
pub fn rank<'a>(
    query: &str,
    records: &'a [SearchableRecord],
    spec: &FieldSpec,
) -> Vec<ScoredRecord<'a>> {
    let mut scored: Vec<ScoredRecord<'a>> = records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| {
            score_record(query, record, spec).map(|score| ScoredRecord {
                record,
                score,
                date: parse_date(&record.primary_date),
                index,
            })
        })
        .collect();

    scored.sort_by(compare_scored);
    scored
}

/// Keep the N highest-ranked results of an already ranked list
pub fn top_n<T>(mut ranked: Vec<T>, n: Option<usize>) -> Vec<T> {
    if let Some(n) = n {
        ranked.truncate(n);
    }
    ranked
}
