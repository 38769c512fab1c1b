use crate::error::{EngineError, Result};
use crate::parse::string_list;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Searchable fields: field_name -> normalized values
pub type Fields = HashMap<String, Vec<String>>;

/// Generic entity subjected to search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchableRecord {
    pub id: String,
    /// ISO-8601 date or date-time, used to break score ties
    pub primary_date: String,
    /// Parent task id for subtasks, needed when navigating to a result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub fields: Fields,
}

impl SearchableRecord {
    pub fn new(id: impl Into<String>, primary_date: impl Into<String>) -> Self {
        SearchableRecord {
            id: id.into(),
            primary_date: primary_date.into(),
            parent_id: None,
            fields: Fields::new(),
        }
    }

    /// Set a field, dropping empty values
    pub fn with_field<I, S>(mut self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values
            .into_iter()
            .map(Into::into)
            .filter(|v| !v.is_empty())
            .collect();
        if !values.is_empty() {
            self.fields.insert(name.to_string(), values);
        }
        self
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Values of a field; a missing field has none
    pub fn values(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// One searchable field and its importance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldWeight {
    pub field: String,
    pub weight: u32,
}

/// Ordered field weights, fixed per entity kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldSpec(pub Vec<FieldWeight>);

impl FieldSpec {
    pub fn new(weights: &[(&str, u32)]) -> Self {
        FieldSpec(
            weights
                .iter()
                .map(|(field, weight)| FieldWeight {
                    field: field.to_string(),
                    weight: *weight,
                })
                .collect(),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldWeight> {
        self.0.iter()
    }

    pub fn validate(&self, kind: EntityKind) -> Result<()> {
        for fw in &self.0 {
            if fw.field.trim().is_empty() {
                return Err(EngineError::InvalidFieldSpec {
                    kind,
                    reason: "empty field name".to_string(),
                });
            }
            if fw.weight == 0 {
                return Err(EngineError::InvalidFieldSpec {
                    kind,
                    reason: format!("field '{}' has zero weight", fw.field),
                });
            }
        }
        Ok(())
    }
}

/// Entity kinds the engine knows how to search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Sermons,
    Projects,
    Tasks,
    Subtasks,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Sermons,
        EntityKind::Projects,
        EntityKind::Tasks,
        EntityKind::Subtasks,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Sermons => "sermons",
            EntityKind::Projects => "projects",
            EntityKind::Tasks => "tasks",
            EntityKind::Subtasks => "subtasks",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sermons" | "sermon" => Ok(EntityKind::Sermons),
            "projects" | "project" => Ok(EntityKind::Projects),
            "tasks" | "task" => Ok(EntityKind::Tasks),
            "subtasks" | "subtask" => Ok(EntityKind::Subtasks),
            _ => Err(EngineError::UnknownKind(s.to_string())),
        }
    }
}

/// Record with its accumulated score, alive only within one search call
#[derive(Debug, Clone, Copy)]
pub struct ScoredRecord<'a> {
    pub record: &'a SearchableRecord,
    pub score: u32,
    /// Parsed primary date; None when it does not parse
    pub date: Option<DateTime<Utc>>,
    /// Position in the candidate set
    pub index: usize,
}

/// Per-kind match counts of an aggregate search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCounts {
    pub projects: usize,
    pub tasks: usize,
    pub subtasks: usize,
    pub total: usize,
}

/// Grouped results of the "search everything" operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResults {
    pub projects: Vec<SearchableRecord>,
    pub tasks: Vec<SearchableRecord>,
    pub subtasks: Vec<SearchableRecord>,
    pub match_counts: MatchCounts,
}

/// Sermon as returned by the data service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sermon {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub series: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub preacher: Option<String>,
    #[serde(default)]
    pub scripture: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    /// Arrives as a string, an array of strings, or not at all
    #[serde(default, deserialize_with = "string_list")]
    pub tools_needed: Vec<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: String,
    pub task_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: String,
}

/// Raw entities loaded by the caller, grouped by kind
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityStore {
    #[serde(default)]
    pub sermons: Vec<Sermon>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
}

/// Candidate records: kind -> records in upstream order
pub type RecordStore = HashMap<EntityKind, Vec<SearchableRecord>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_str() {
        assert_eq!("Projects".parse::<EntityKind>().unwrap(), EntityKind::Projects);
        assert_eq!("subtask".parse::<EntityKind>().unwrap(), EntityKind::Subtasks);
        assert!("comments".parse::<EntityKind>().is_err());
    }

    #[test]
    fn test_field_spec_validate() {
        assert!(FieldSpec::new(&[("title", 100)]).validate(EntityKind::Tasks).is_ok());
        assert!(FieldSpec::new(&[("title", 0)]).validate(EntityKind::Tasks).is_err());
        assert!(FieldSpec::new(&[(" ", 10)]).validate(EntityKind::Tasks).is_err());
    }

    #[test]
    fn test_missing_field_has_no_values() {
        let record = SearchableRecord::new("a", "2024-01-01").with_field("title", ["", "x"]);
        assert_eq!(record.values("title"), ["x".to_string()]);
        assert!(record.values("topic").is_empty());
    }

    #[test]
    fn test_task_tools_needed_shapes() {
        let single: Task = serde_json::from_str(
            r#"{"id":"t1","title":"Fix","tools_needed":"hammer","created_at":"2024-01-01"}"#,
        )
        .unwrap();
        assert_eq!(single.tools_needed, vec!["hammer"]);

        let many: Task = serde_json::from_str(
            r#"{"id":"t2","title":"Fix","tools_needed":["saw","drill"],"created_at":"2024-01-01"}"#,
        )
        .unwrap();
        assert_eq!(many.tools_needed, vec!["saw", "drill"]);

        let missing: Task =
            serde_json::from_str(r#"{"id":"t3","title":"Fix","created_at":"2024-01-01"}"#).unwrap();
        assert!(missing.tools_needed.is_empty());

        let null: Task = serde_json::from_str(
            r#"{"id":"t4","title":"Fix","tools_needed":null,"created_at":"2024-01-01"}"#,
        )
        .unwrap();
        assert!(null.tools_needed.is_empty());
    }
}
