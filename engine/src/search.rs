//! Ranked multi-field search.
//!
//! A search is a full scan of the candidate set: every record is scored
//! against every field of the kind's [`FieldSpec`], unmatched records are
//! dropped and the rest are ordered by score, then recency, then input
//! position. An empty or whitespace-only query is the "no active search"
//! state and returns the candidates untouched.

use crate::config::SearchConfig;
use crate::parse::normalize_query;
use crate::perf::{log_perf, now_ms};
use crate::rank::{rank, top_n};
use crate::types::{AggregateResults, EntityKind, FieldSpec, MatchCounts, SearchableRecord};

/// Search records, returning the matches in rank order without scores
pub fn search(
    query: &str,
    records: &[SearchableRecord],
    spec: &FieldSpec,
) -> Vec<SearchableRecord> {
    search_limited(query, records, spec, None)
}

/// Like [`search`], keeping at most `limit` matches.
/// A blank query still returns every record.
pub fn search_limited(
    query: &str,
    records: &[SearchableRecord],
    spec: &FieldSpec,
    limit: Option<usize>,
) -> Vec<SearchableRecord> {
    search_refs(query, records, spec, limit)
        .into_iter()
        .cloned()
        .collect()
}

/// Borrowing variant of [`search_limited`]
pub fn search_refs<'a>(
    query: &str,
    records: &'a [SearchableRecord],
    spec: &FieldSpec,
    limit: Option<usize>,
) -> Vec<&'a SearchableRecord> {
    match normalize_query(query) {
        Some(query) => top_n(ranked_refs(&query, records, spec), limit),
        None => records.iter().collect(),
    }
}

/// Every match of a normalized query, in rank order
fn ranked_refs<'a>(
    query: &str,
    records: &'a [SearchableRecord],
    spec: &FieldSpec,
) -> Vec<&'a SearchableRecord> {
    let start = now_ms();
    let ranked: Vec<&'a SearchableRecord> = rank(query, records, spec)
        .into_iter()
        .map(|scored| scored.record)
        .collect();

    tracing::debug!(
        query_len = query.len(),
        candidates = records.len(),
        matches = ranked.len(),
        "search complete"
    );
    log_perf(&format!(
        "[perf] candidates={} matches={} | total={:.1}ms",
        records.len(),
        ranked.len(),
        now_ms() - start
    ));

    ranked
}

/// Search one kind using the configured field spec and result limit
pub fn search_kind(
    query: &str,
    kind: EntityKind,
    records: &[SearchableRecord],
    config: &SearchConfig,
) -> Vec<SearchableRecord> {
    search_limited(query, records, config.field_spec(kind), config.result_limit)
}

/// One aggregate group: the (possibly capped) results and the full match count
fn search_group(
    query: &str,
    kind: EntityKind,
    records: &[SearchableRecord],
    config: &SearchConfig,
) -> (Vec<SearchableRecord>, usize) {
    let Some(query) = normalize_query(query) else {
        return (records.to_vec(), records.len());
    };
    let matches = ranked_refs(&query, records, config.field_spec(kind));
    let count = matches.len();
    let results = top_n(matches, config.result_limit)
        .into_iter()
        .cloned()
        .collect();
    (results, count)
}

/// Search projects, tasks and subtasks independently and group the results.
///
/// Groups are never merged or ranked against each other. Counts are taken
/// before `result_limit` caps a group; `total` is their sum.
pub fn search_all(
    query: &str,
    projects: &[SearchableRecord],
    tasks: &[SearchableRecord],
    subtasks: &[SearchableRecord],
    config: &SearchConfig,
) -> AggregateResults {
    let run = |kind: EntityKind, records: &[SearchableRecord]| {
        search_group(query, kind, records, config)
    };

    #[cfg(feature = "native")]
    let ((projects, n_projects), ((tasks, n_tasks), (subtasks, n_subtasks))) = rayon::join(
        || run(EntityKind::Projects, projects),
        || {
            rayon::join(
                || run(EntityKind::Tasks, tasks),
                || run(EntityKind::Subtasks, subtasks),
            )
        },
    );

    #[cfg(not(feature = "native"))]
    let ((projects, n_projects), (tasks, n_tasks), (subtasks, n_subtasks)) = (
        run(EntityKind::Projects, projects),
        run(EntityKind::Tasks, tasks),
        run(EntityKind::Subtasks, subtasks),
    );

    let match_counts = MatchCounts {
        projects: n_projects,
        tasks: n_tasks,
        subtasks: n_subtasks,
        total: n_projects + n_tasks + n_subtasks,
    };

    AggregateResults {
        projects,
        tasks,
        subtasks,
        match_counts,
    }
}
