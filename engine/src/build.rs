use crate::error::{EngineError, Result};
use crate::types::{
    EntityKind, EntityStore, FieldSpec, Project, RecordStore, SearchableRecord, Sermon, Subtask,
    Task,
};

/// Default field weights for a kind (higher = more important)
pub fn default_field_spec(kind: EntityKind) -> FieldSpec {
    match kind {
        EntityKind::Sermons => FieldSpec::new(&[
            ("title", 100),
            ("series", 80),
            ("topic", 60),
            ("tags", 60),
            ("preacher", 40),
            ("scripture", 40),
            ("content", 20),
        ]),
        EntityKind::Projects => {
            FieldSpec::new(&[("name", 100), ("category", 80), ("description", 40)])
        }
        EntityKind::Tasks => FieldSpec::new(&[
            ("title", 100),
            ("tools_needed", 60),
            ("description", 40),
            ("status", 20),
            ("priority", 20),
        ]),
        EntityKind::Subtasks => FieldSpec::new(&[("title", 100), ("description", 40)]),
    }
}

/// Convert a Sermon to a searchable record keyed by its date
pub fn sermon_to_record(sermon: &Sermon) -> SearchableRecord {
    SearchableRecord::new(&sermon.id, &sermon.date)
        .with_field("title", [sermon.title.as_str()])
        .with_field("series", sermon.series.iter().map(String::as_str))
        .with_field("topic", sermon.topic.iter().map(String::as_str))
        .with_field("tags", sermon.tags.iter().map(String::as_str))
        .with_field("preacher", sermon.preacher.iter().map(String::as_str))
        .with_field("scripture", sermon.scripture.iter().map(String::as_str))
        .with_field("content", sermon.content.iter().map(String::as_str))
}

pub fn project_to_record(project: &Project) -> SearchableRecord {
    SearchableRecord::new(&project.id, &project.created_at)
        .with_field("name", [project.name.as_str()])
        .with_field("category", project.category.iter().map(String::as_str))
        .with_field("description", project.description.iter().map(String::as_str))
        .with_field("status", project.status.iter().map(String::as_str))
}

pub fn task_to_record(task: &Task) -> SearchableRecord {
    SearchableRecord::new(&task.id, &task.created_at)
        .with_field("title", [task.title.as_str()])
        .with_field("tools_needed", task.tools_needed.iter().map(String::as_str))
        .with_field("description", task.description.iter().map(String::as_str))
        .with_field("status", task.status.iter().map(String::as_str))
        .with_field("priority", task.priority.iter().map(String::as_str))
}

/// Subtask records carry their parent task id for navigation
pub fn subtask_to_record(subtask: &Subtask) -> SearchableRecord {
    SearchableRecord::new(&subtask.id, &subtask.created_at)
        .with_parent(&subtask.task_id)
        .with_field("title", [subtask.title.as_str()])
        .with_field("description", subtask.description.iter().map(String::as_str))
}

pub fn sermons_to_records(sermons: &[Sermon]) -> Vec<SearchableRecord> {
    sermons.iter().map(sermon_to_record).collect()
}

pub fn projects_to_records(projects: &[Project]) -> Vec<SearchableRecord> {
    projects.iter().map(project_to_record).collect()
}

pub fn tasks_to_records(tasks: &[Task]) -> Vec<SearchableRecord> {
    tasks.iter().map(task_to_record).collect()
}

pub fn subtasks_to_records(subtasks: &[Subtask]) -> Vec<SearchableRecord> {
    subtasks.iter().map(subtask_to_record).collect()
}

/// Convert everything the caller loaded into per-kind candidate sets
pub fn build_record_store(entities: &EntityStore) -> RecordStore {
    let mut store = RecordStore::new();
    store.insert(EntityKind::Sermons, sermons_to_records(&entities.sermons));
    store.insert(EntityKind::Projects, projects_to_records(&entities.projects));
    store.insert(EntityKind::Tasks, tasks_to_records(&entities.tasks));
    store.insert(EntityKind::Subtasks, subtasks_to_records(&entities.subtasks));
    store
}

/// Decode a JSON array of one kind's rows into records
pub fn records_from_json(kind: EntityKind, json: &str) -> Result<Vec<SearchableRecord>> {
    fn decode<T: serde::de::DeserializeOwned>(json: &str) -> Result<Vec<T>> {
        serde_json::from_str(json).map_err(EngineError::InvalidRecords)
    }

    Ok(match kind {
        EntityKind::Sermons => sermons_to_records(&decode::<Sermon>(json)?),
        EntityKind::Projects => projects_to_records(&decode::<Project>(json)?),
        EntityKind::Tasks => tasks_to_records(&decode::<Task>(json)?),
        EntityKind::Subtasks => subtasks_to_records(&decode::<Subtask>(json)?),
    })
}
