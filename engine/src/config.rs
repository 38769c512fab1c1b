use crate::build::default_field_spec;
use crate::error::{EngineError, Result};
use crate::types::{EntityKind, FieldSpec};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Remote data service connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub base_url: String,
    pub api_key: String,
    /// Column the owner id is matched against
    #[serde(default = "default_owner_column")]
    pub owner_column: String,
}

fn default_owner_column() -> String {
    "user_id".to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    field_specs: HashMap<EntityKind, FieldSpec>,
    #[serde(default)]
    debounce_ms: Option<u64>,
    #[serde(default)]
    result_limit: Option<usize>,
    #[serde(default)]
    remote: Option<RemoteConfig>,
}

/// Engine configuration. Every kind always has a field spec.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchConfig {
    field_specs: HashMap<EntityKind, FieldSpec>,
    pub debounce_ms: u64,
    pub result_limit: Option<usize>,
    pub remote: Option<RemoteConfig>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            field_specs: EntityKind::ALL
                .into_iter()
                .map(|kind| (kind, default_field_spec(kind)))
                .collect(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            result_limit: None,
            remote: None,
        }
    }
}

impl SearchConfig {
    /// Parse config JSON. Kinds without a spec get the defaults; a blank
    /// string yields the default config.
    pub fn from_json(json: &str) -> Result<Self> {
        if json.trim().is_empty() {
            return Ok(SearchConfig::default());
        }
        let raw: RawConfig = serde_json::from_str(json).map_err(EngineError::InvalidConfig)?;

        let mut config = SearchConfig::default();
        for (kind, spec) in raw.field_specs {
            config.set_field_spec(kind, spec)?;
        }
        if let Some(ms) = raw.debounce_ms {
            config.debounce_ms = ms;
        }
        config.result_limit = raw.result_limit;
        config.remote = raw.remote;
        Ok(config)
    }

    pub fn field_spec(&self, kind: EntityKind) -> &FieldSpec {
        // Constructors fill every kind
        &self.field_specs[&kind]
    }

    pub fn set_field_spec(&mut self, kind: EntityKind, spec: FieldSpec) -> Result<()> {
        spec.validate(kind)?;
        self.field_specs.insert(kind, spec);
        Ok(())
    }
}
