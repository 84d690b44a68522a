use std::path::Path;

use figment::{
    Figment,
    providers::{Format, Json, Serialized},
};
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

use crate::error::{LoadTopicTableSnafu, TopicTableResult};
use crate::topic::{TopicEntry, TopicTable, builtin_entries};

/// On-disk shape of a replacement FAQ.
///
/// ```json
/// { "topics": [ { "key": "initial", "answer": "Hi!", "next_topics": ["About"] } ] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicTableFile {
    pub topics: Vec<TopicEntry>,
}

impl Default for TopicTableFile {
    fn default() -> Self {
        Self {
            topics: builtin_entries(),
        }
    }
}

/// Reads and validates a topic table from a JSON file.
///
/// Keys missing from the file keep their built-in values; a present `topics` array
/// replaces the built-in one wholesale.
pub fn load_topic_table(path: &Path) -> TopicTableResult<TopicTable> {
    let file = Figment::from(Serialized::defaults(TopicTableFile::default()))
        .merge(Json::file(path))
        .extract::<TopicTableFile>()
        .context(LoadTopicTableSnafu {
            stage: "extract-topic-table",
            path: path.to_path_buf(),
        })?;

    TopicTable::from_entries(file.topics)
}

/// Loads the configured table, falling back to the built-in FAQ on any problem.
pub fn load_or_builtin(path: Option<&Path>) -> TopicTable {
    let Some(path) = path else {
        return TopicTable::builtin();
    };

    if !path.exists() {
        tracing::warn!("topic table not found at {:?}, using built-in FAQ", path);
        return TopicTable::builtin();
    }

    match load_topic_table(path) {
        Ok(table) => {
            tracing::info!(topics = table.len(), "loaded topic table from {:?}", path);
            table
        }
        Err(error) => {
            tracing::warn!("{error}. using built-in FAQ");
            TopicTable::builtin()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::error::TopicTableError;
    use crate::topic::ROOT_TOPIC_KEY;

    fn write_json(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_replacement_table() {
        let file = write_json(
            r#"{
                "topics": [
                    { "key": "Initial", "answer": "Welcome!", "next_topics": ["Pricing"] },
                    { "key": "Pricing", "answer": "It is free." }
                ]
            }"#,
        );

        let table = load_topic_table(file.path()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.root().key, ROOT_TOPIC_KEY);
        assert_eq!(table.root().answer, "Welcome!");
        assert_eq!(table.resolve("pricing").choices, ["Pricing"]);
    }

    #[test]
    fn file_without_topics_keeps_builtin_entries() {
        let file = write_json("{}");
        let table = load_topic_table(file.path()).unwrap();
        assert_eq!(table, TopicTable::builtin());
    }

    #[test]
    fn dangling_choice_in_file_is_rejected() {
        let file = write_json(
            r#"{ "topics": [ { "key": "initial", "answer": "Hi", "next_topics": ["Nowhere"] } ] }"#,
        );
        let error = load_topic_table(file.path()).unwrap_err();
        assert!(matches!(error, TopicTableError::DanglingChoice { .. }));
    }

    #[test]
    fn malformed_file_reports_load_error_and_fallback_recovers() {
        let file = write_json(r#"{ "topics": "not a list" }"#);
        let error = load_topic_table(file.path()).unwrap_err();
        assert!(matches!(error, TopicTableError::LoadTopicTable { .. }));

        assert_eq!(load_or_builtin(Some(file.path())), TopicTable::builtin());
    }

    #[test]
    fn missing_path_uses_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("faq.json");
        assert_eq!(load_or_builtin(Some(&missing)), TopicTable::builtin());
        assert_eq!(load_or_builtin(None), TopicTable::builtin());
    }
}
