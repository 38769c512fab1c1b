use std::cell::RefCell;
use wasm_bindgen::prelude::*;

pub mod build;
pub mod config;
pub mod error;
pub mod parse;
pub mod perf;
pub mod rank;
pub mod search;
pub mod session;
pub mod source;
pub mod types;

pub use config::SearchConfig;
pub use error::{EngineError, Result};
pub use search::{search, search_all, search_kind, search_limited, search_refs};
pub use types::{AggregateResults, EntityKind, FieldSpec, MatchCounts, SearchableRecord};

use crate::source::InMemorySource;
use crate::types::EntityStore;

/// Search engine state: the caller's candidate sets plus config
pub struct SearchEngine {
    source: InMemorySource,
    config: SearchConfig,
}

impl SearchEngine {
    pub fn new(source: InMemorySource, config: SearchConfig) -> Self {
        SearchEngine { source, config }
    }

    /// Build from entity JSON (`{"sermons": [...], "projects": [...], ...}`)
    /// and config JSON (blank for defaults)
    pub fn from_json(records_json: &str, config_json: &str) -> Result<Self> {
        let entities: EntityStore =
            serde_json::from_str(records_json).map_err(EngineError::InvalidRecords)?;
        let config = SearchConfig::from_json(config_json)?;
        let source = InMemorySource::new(build::build_record_store(&entities));

        tracing::info!(
            records = source.len(),
            debounce_ms = config.debounce_ms,
            "search engine initialized"
        );
        Ok(SearchEngine::new(source, config))
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn record_count(&self) -> usize {
        self.source.len()
    }

    pub fn search(&self, kind: EntityKind, query: &str) -> Vec<SearchableRecord> {
        search_kind(query, kind, self.source.records(kind), &self.config)
    }

    /// Caller-side session using the configured debounce window
    pub fn session<T>(&self) -> session::SearchSession<T> {
        session::SearchSession::new(self.config.debounce_ms)
    }

    pub fn search_everything(&self, query: &str) -> AggregateResults {
        search_all(
            query,
            self.source.records(EntityKind::Projects),
            self.source.records(EntityKind::Tasks),
            self.source.records(EntityKind::Subtasks),
            &self.config,
        )
    }
}

// Use thread_local with RefCell for lazy initialization from JS
thread_local! {
    static ENGINE: RefCell<Option<SearchEngine>> = const { RefCell::new(None) };
}

fn with_engine<T>(f: impl FnOnce(&SearchEngine) -> Result<T>) -> Result<T> {
    ENGINE.with(|engine| match engine.borrow().as_ref() {
        Some(eng) => f(eng),
        None => Err(EngineError::NotInitialized),
    })
}

fn to_js_error(err: EngineError) -> JsError {
    JsError::new(&err.to_string())
}

fn to_json<T: serde::Serialize>(value: &T, empty: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| empty.to_string())
}

/// Initialize the search engine with records and config from JavaScript
/// records_json: JSON object of entity arrays keyed by kind
/// config_json: JSON SearchConfig, or "" for defaults
#[wasm_bindgen]
pub fn init_engine(records_json: &str, config_json: &str) -> std::result::Result<(), JsError> {
    let engine = SearchEngine::from_json(records_json, config_json).map_err(to_js_error)?;
    ENGINE.with(|cell| {
        *cell.borrow_mut() = Some(engine);
    });
    Ok(())
}

/// Check if the engine has been initialized
#[wasm_bindgen]
pub fn is_engine_ready() -> bool {
    ENGINE.with(|engine| engine.borrow().is_some())
}

fn search_records_json(kind: &str, query: &str) -> Result<String> {
    let kind: EntityKind = kind.parse()?;
    with_engine(|eng| Ok(to_json(&eng.search(kind, query), "[]")))
}

fn search_everything_json(query: &str) -> Result<String> {
    with_engine(|eng| Ok(to_json(&eng.search_everything(query), "{}")))
}

/// Search one kind and return the ranked records as JSON
#[wasm_bindgen]
pub fn search_records(kind: &str, query: &str) -> std::result::Result<String, JsError> {
    search_records_json(kind, query).map_err(to_js_error)
}

/// Search projects, tasks and subtasks; returns grouped results and match counts as JSON
#[wasm_bindgen]
pub fn search_everything(query: &str) -> std::result::Result<String, JsError> {
    search_everything_json(query).map_err(to_js_error)
}

/// Get total number of records across all kinds
#[wasm_bindgen]
pub fn get_record_count() -> std::result::Result<usize, JsError> {
    with_engine(|eng| Ok(eng.record_count())).map_err(to_js_error)
}

/// Debounce and "last query wins" bookkeeping for a JS search box.
/// Results themselves stay on the JS side.
#[wasm_bindgen(js_name = SearchSession)]
pub struct JsSearchSession {
    session: session::SearchSession<()>,
}

#[wasm_bindgen(js_class = SearchSession)]
impl JsSearchSession {
    /// Without an explicit window, uses the initialized engine's config
    /// (or the default when the engine is not ready)
    #[wasm_bindgen(constructor)]
    pub fn new(debounce_ms: Option<u32>) -> JsSearchSession {
        let session = match debounce_ms {
            Some(ms) => session::SearchSession::new(u64::from(ms)),
            None => with_engine(|eng| Ok(eng.session())).unwrap_or_default(),
        };
        JsSearchSession { session }
    }

    pub fn input(&mut self, query: &str, now_ms: f64) {
        self.session.input(query, now_ms);
    }

    /// Generation to search for, once the query has settled
    pub fn poll(&mut self, now_ms: f64) -> Option<f64> {
        self.session.poll(now_ms).map(|ticket| ticket.generation as f64)
    }

    pub fn query(&self) -> String {
        self.session.query().to_string()
    }

    pub fn is_current(&self, generation: f64) -> bool {
        self.session.is_current(generation as u64)
    }

    /// Mark a search finished; false means the result is stale and must be dropped
    pub fn finish(&mut self, generation: f64) -> bool {
        let ticket = session::SearchTicket {
            generation: generation as u64,
            query: self.session.query().to_string(),
        };
        self.session.complete(&ticket, ())
    }

    pub fn clear(&mut self) {
        self.session.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_test_engine() {
        let test_records = r#"{
            "projects": [
                {"id": "p1", "name": "Backyard Garden", "created_at": "2024-01-10"},
                {"id": "p2", "name": "Garage Cleanup", "created_at": "2024-02-01"}
            ],
            "tasks": [
                {"id": "t1", "title": "Buy seeds", "description": "For the garden", "created_at": "2024-01-11"},
                {"id": "t2", "title": "Build raised beds", "description": "Garden layout", "tools_needed": ["saw", "drill"], "created_at": "2024-01-12"}
            ],
            "subtasks": [
                {"id": "st1", "task_id": "t2", "title": "Cut lumber", "created_at": "2024-01-13"}
            ],
            "sermons": [
                {"id": "s1", "title": "Walking in Faith Through Trials", "topic": "Faith", "date": "2024-03-10"}
            ]
        }"#;

        init_engine(test_records, "").expect("Failed to initialize test engine");
    }

    #[test]
    fn test_search_records() {
        setup_test_engine();
        let results_json = search_records_json("sermons", "FAITH").unwrap();
        let results: Vec<SearchableRecord> = serde_json::from_str(&results_json).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "s1");
    }

    #[test]
    fn test_search_everything() {
        setup_test_engine();
        let results_json = search_everything_json("garden").unwrap();
        let results: AggregateResults = serde_json::from_str(&results_json).unwrap();
        assert_eq!(
            results.match_counts,
            MatchCounts {
                projects: 1,
                tasks: 2,
                subtasks: 0,
                total: 3
            }
        );
        assert_eq!(results.tasks.len(), results.match_counts.tasks);
    }

    #[test]
    fn test_tools_needed_searchable() {
        setup_test_engine();
        let results_json = search_records_json("tasks", "drill").unwrap();
        let results: Vec<SearchableRecord> = serde_json::from_str(&results_json).unwrap();
        assert_eq!(results[0].id, "t2");
    }

    #[test]
    fn test_unknown_kind() {
        setup_test_engine();
        assert!(matches!(
            search_records_json("comments", "x"),
            Err(EngineError::UnknownKind(_))
        ));
    }

    #[test]
    fn test_record_count() {
        setup_test_engine();
        assert!(is_engine_ready());
        assert_eq!(with_engine(|eng| Ok(eng.record_count())).unwrap(), 6);
    }

    #[test]
    fn test_js_session_drops_stale() {
        let mut debounced = JsSearchSession::new(Some(300));
        debounced.input("gar", 0.0);
        let first = debounced.poll(300.0).unwrap();
        debounced.input("garden", 320.0);
        assert!(!debounced.is_current(first));
        let second = debounced.poll(620.0).unwrap();
        assert!(!debounced.finish(first));
        assert!(debounced.finish(second));
        assert_eq!(debounced.query(), "garden");
    }

    #[test]
    fn test_session_uses_engine_debounce() {
        init_engine(r#"{"tasks": []}"#, r#"{"debounce_ms": 50}"#).unwrap();

        let mut session: session::SearchSession<Vec<SearchableRecord>> =
            with_engine(|eng| Ok(eng.session())).unwrap();
        session.input("garden", 0.0);
        assert!(session.poll(49.0).is_none());
        assert!(session.poll(50.0).is_some());

        let mut js_session = JsSearchSession::new(None);
        js_session.input("garden", 0.0);
        assert!(js_session.poll(49.0).is_none());
        assert!(js_session.poll(50.0).is_some());
    }
}
