//! Upstream record sources and fetch-then-search.
//!
//! Fetch failures never reach the rendering layer as errors: they are
//! logged and turned into an empty result with an error message.

use crate::config::SearchConfig;
use crate::error::Result;
use crate::search::{search_all, search_kind};
use crate::types::{AggregateResults, EntityKind, RecordStore, SearchableRecord};
use serde::Serialize;

/// Supplies the full candidate set for one kind and owner
pub trait RecordSource {
    fn list_records(&self, kind: EntityKind, owner_id: &str) -> Result<Vec<SearchableRecord>>;
}

/// Records already resident in memory, scoped to a single owner
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    records: RecordStore,
}

impl InMemorySource {
    pub fn new(records: RecordStore) -> Self {
        InMemorySource { records }
    }

    pub fn insert(&mut self, kind: EntityKind, records: Vec<SearchableRecord>) {
        self.records.insert(kind, records);
    }

    pub fn records(&self, kind: EntityKind) -> &[SearchableRecord] {
        self.records.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RecordSource for InMemorySource {
    fn list_records(&self, kind: EntityKind, _owner_id: &str) -> Result<Vec<SearchableRecord>> {
        Ok(self.records(kind).to_vec())
    }
}

/// Search results plus the error that emptied them, if any
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchOutcome<T> {
    pub results: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Default> SearchOutcome<T> {
    fn ok(results: T) -> Self {
        SearchOutcome {
            results,
            error: None,
        }
    }

    fn failed(message: String) -> Self {
        SearchOutcome {
            results: T::default(),
            error: Some(message),
        }
    }
}

/// Fetch one kind and search it
pub fn fetch_and_search<S: RecordSource + ?Sized>(
    source: &S,
    kind: EntityKind,
    owner_id: &str,
    query: &str,
    config: &SearchConfig,
) -> SearchOutcome<Vec<SearchableRecord>> {
    match source.list_records(kind, owner_id) {
        Ok(records) => SearchOutcome::ok(search_kind(query, kind, &records, config)),
        Err(err) => {
            tracing::error!(%kind, error = %err, "fetch failed, returning empty results");
            SearchOutcome::failed(err.to_string())
        }
    }
}

/// Fetch projects, tasks and subtasks, then search each independently
pub fn fetch_and_search_all<S: RecordSource + ?Sized>(
    source: &S,
    owner_id: &str,
    query: &str,
    config: &SearchConfig,
) -> SearchOutcome<AggregateResults> {
    let fetched = source
        .list_records(EntityKind::Projects, owner_id)
        .and_then(|p| Ok((p, source.list_records(EntityKind::Tasks, owner_id)?)))
        .and_then(|(p, t)| Ok((p, t, source.list_records(EntityKind::Subtasks, owner_id)?)));

    match fetched {
        Ok((projects, tasks, subtasks)) => {
            SearchOutcome::ok(search_all(query, &projects, &tasks, &subtasks, config))
        }
        Err(err) => {
            tracing::error!(error = %err, "fetch failed, returning empty results");
            SearchOutcome::failed(err.to_string())
        }
    }
}

#[cfg(feature = "native")]
pub use http::HttpSource;

#[cfg(feature = "native")]
mod http {
    use super::RecordSource;
    use crate::build::records_from_json;
    use crate::config::{RemoteConfig, SearchConfig};
    use crate::error::{EngineError, Result};
    use crate::types::{EntityKind, SearchableRecord};

    /// REST endpoint of the hosted database, one table per kind
    pub struct HttpSource {
        client: reqwest::blocking::Client,
        remote: RemoteConfig,
    }

    impl HttpSource {
        pub fn new(remote: RemoteConfig) -> Self {
            HttpSource {
                client: reqwest::blocking::Client::new(),
                remote,
            }
        }

        /// None when the config names no remote
        pub fn from_config(config: &SearchConfig) -> Option<Self> {
            config.remote.clone().map(HttpSource::new)
        }

        fn table_url(&self, kind: EntityKind) -> String {
            format!(
                "{}/rest/v1/{}",
                self.remote.base_url.trim_end_matches('/'),
                kind.as_str()
            )
        }

        fn query_pairs(&self, owner_id: &str) -> [(String, String); 2] {
            [
                ("select".to_string(), "*".to_string()),
                (self.remote.owner_column.clone(), format!("eq.{}", owner_id)),
            ]
        }
    }

    impl RecordSource for HttpSource {
        fn list_records(&self, kind: EntityKind, owner_id: &str) -> Result<Vec<SearchableRecord>> {
            let upstream = |message: String| EngineError::Upstream { kind, message };

            let response = self
                .client
                .get(self.table_url(kind))
                .query(&self.query_pairs(owner_id))
                .header("apikey", &self.remote.api_key)
                .bearer_auth(&self.remote.api_key)
                .send()
                .map_err(|e| upstream(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(upstream(format!("HTTP {}", status)));
            }

            let body = response.text().map_err(|e| upstream(e.to_string()))?;
            let records = records_from_json(kind, &body)?;
            tracing::debug!(%kind, count = records.len(), "fetched records");
            Ok(records)
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::types::MatchCounts;

    struct FailingSource;

    impl RecordSource for FailingSource {
        fn list_records(&self, kind: EntityKind, _owner_id: &str) -> Result<Vec<SearchableRecord>> {
            Err(EngineError::Upstream {
                kind,
                message: "connection reset".into(),
            })
        }
    }

    fn source() -> InMemorySource {
        let mut source = InMemorySource::default();
        source.insert(
            EntityKind::Projects,
            vec![SearchableRecord::new("p1", "2024-01-01").with_field("name", ["Garden"])],
        );
        source.insert(
            EntityKind::Subtasks,
            vec![SearchableRecord::new("st1", "2024-01-03")
                .with_parent("t1")
                .with_field("title", ["Weed the garden"])],
        );
        source
    }

    #[test]
    fn test_fetch_and_search_all() {
        let outcome = fetch_and_search_all(&source(), "u1", "garden", &SearchConfig::default());
        assert!(outcome.error.is_none());
        assert_eq!(
            outcome.results.match_counts,
            MatchCounts {
                projects: 1,
                tasks: 0,
                subtasks: 1,
                total: 2
            }
        );
        assert_eq!(outcome.results.subtasks[0].parent_id.as_deref(), Some("t1"));
    }

    #[test]
    fn test_fetch_failure_is_empty_with_error() {
        let outcome =
            fetch_and_search_all(&FailingSource, "u1", "garden", &SearchConfig::default());
        assert_eq!(outcome.results, AggregateResults::default());
        assert_eq!(
            outcome.error.as_deref(),
            Some("Failed to fetch projects: connection reset")
        );

        let single = fetch_and_search(
            &FailingSource,
            EntityKind::Sermons,
            "u1",
            "faith",
            &SearchConfig::default(),
        );
        assert!(single.results.is_empty());
        assert!(single.error.is_some());
    }

    #[test]
    fn test_in_memory_counts() {
        let source = source();
        assert_eq!(source.len(), 2);
        assert!(source.records(EntityKind::Sermons).is_empty());
    }
}
