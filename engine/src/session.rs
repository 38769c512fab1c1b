//! Caller-owned search state.
//!
//! Rapid query changes are coalesced into at most one search per debounce
//! window, always for the latest query. Every input bumps a generation
//! counter; results carrying an older generation are dropped, so the last
//! query wins even when fetches complete out of order.
//!
//! Time is passed in as milliseconds so the session stays deterministic and
//! independent of any UI event loop.

use crate::config::DEFAULT_DEBOUNCE_MS;
use crate::parse::normalize_query;

/// Permission to run one search for one query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    pub generation: u64,
    pub query: String,
}

#[derive(Debug, Clone)]
pub struct SearchSession<T> {
    debounce_ms: u64,
    query: String,
    /// Time of the last input not yet dispatched
    pending_since: Option<f64>,
    generation: u64,
    results: Option<T>,
    error: Option<String>,
    is_searching: bool,
}

impl<T> Default for SearchSession<T> {
    fn default() -> Self {
        SearchSession::new(DEFAULT_DEBOUNCE_MS)
    }
}

impl<T> SearchSession<T> {
    pub fn new(debounce_ms: u64) -> Self {
        SearchSession {
            debounce_ms,
            query: String::new(),
            pending_since: None,
            generation: 0,
            results: None,
            error: None,
            is_searching: false,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Results of the latest completed search; None while idle
    pub fn results(&self) -> Option<&T> {
        self.results.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_searching(&self) -> bool {
        self.is_searching
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Record a new query value. Anything in flight becomes stale, so the
    /// session is not searching again until the next ticket is issued.
    pub fn input(&mut self, query: &str, now_ms: f64) {
        self.query = query.to_string();
        self.generation += 1;
        self.is_searching = false;

        if normalize_query(query).is_none() {
            self.pending_since = None;
            self.results = None;
            self.error = None;
        } else {
            self.pending_since = Some(now_ms);
        }
    }

    /// Issue a ticket once the query has been stable for the debounce interval
    pub fn poll(&mut self, now_ms: f64) -> Option<SearchTicket> {
        let since = self.pending_since?;
        if now_ms - since < self.debounce_ms as f64 {
            return None;
        }
        self.pending_since = None;
        self.is_searching = true;
        Some(SearchTicket {
            generation: self.generation,
            query: self.query.clone(),
        })
    }

    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    /// Store results for a ticket. Returns false when the ticket is stale.
    pub fn complete(&mut self, ticket: &SearchTicket, results: T) -> bool {
        if !self.is_current(ticket.generation) {
            tracing::warn!(
                stale = ticket.generation,
                current = self.generation,
                "dropping stale search results"
            );
            return false;
        }
        self.results = Some(results);
        self.error = None;
        self.is_searching = false;
        true
    }

    /// Back to idle; outstanding tickets become stale
    pub fn clear(&mut self) {
        self.query.clear();
        self.generation += 1;
        self.pending_since = None;
        self.results = None;
        self.error = None;
        self.is_searching = false;
    }
}

impl<T: Default> SearchSession<T> {
    /// Record a failed search as empty results plus an error message.
    /// Returns false when the ticket is stale.
    pub fn fail(&mut self, ticket: &SearchTicket, error: impl Into<String>) -> bool {
        if !self.complete(ticket, T::default()) {
            return false;
        }
        self.error = Some(error.into());
        true
    }
}
