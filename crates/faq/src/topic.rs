use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use snafu::ensure;

use crate::error::{
    DanglingChoiceSnafu, DuplicateKeySnafu, EmptyAnswerSnafu, MissingRootSnafu, TopicTableResult,
};

/// Key of the entry used as the opening message and the fallback choice set.
pub const ROOT_TOPIC_KEY: &str = "initial";

/// Answer shown when a selected label has no entry in the table.
pub const APOLOGY_ANSWER: &str =
    "I apologize, I didn't understand that. Please choose from the options.";

/// Case-folds a human-readable label into its table key.
pub fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}

/// One static FAQ record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicEntry {
    pub key: String,
    pub answer: String,
    #[serde(default)]
    pub next_topics: Vec<String>,
}

impl TopicEntry {
    pub fn new<I, S>(key: impl Into<String>, answer: impl Into<String>, next_topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key: normalize_label(&key.into()),
            answer: answer.into(),
            next_topics: next_topics.into_iter().map(Into::into).collect(),
        }
    }
}

/// Outcome of looking up a selected label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub answer: String,
    pub choices: Vec<String>,
    /// False when the label missed the table and the apology fallback was used.
    pub matched: bool,
}

/// Immutable lookup table keyed by normalized label.
///
/// Construction validates that every offered label resolves to an entry, so a
/// table that builds successfully never reaches the apology branch from its own
/// choices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicTable {
    entries: HashMap<String, TopicEntry>,
    order: Vec<String>,
}

impl TopicTable {
    /// Builds and validates a table from authored entries.
    pub fn from_entries(entries: Vec<TopicEntry>) -> TopicTableResult<Self> {
        let mut by_key = HashMap::with_capacity(entries.len());
        let mut order = Vec::with_capacity(entries.len());

        for mut entry in entries {
            entry.key = normalize_label(&entry.key);
            ensure!(
                !entry.answer.trim().is_empty(),
                EmptyAnswerSnafu {
                    stage: "validate-topic-answer",
                    key: entry.key.clone(),
                }
            );
            ensure!(
                !by_key.contains_key(&entry.key),
                DuplicateKeySnafu {
                    stage: "validate-topic-key",
                    key: entry.key.clone(),
                }
            );
            order.push(entry.key.clone());
            by_key.insert(entry.key.clone(), entry);
        }

        ensure!(
            by_key.contains_key(ROOT_TOPIC_KEY),
            MissingRootSnafu {
                stage: "validate-topic-root",
                root: ROOT_TOPIC_KEY,
            }
        );

        for key in &order {
            let entry = &by_key[key];
            for label in &entry.next_topics {
                ensure!(
                    by_key.contains_key(&normalize_label(label)),
                    DanglingChoiceSnafu {
                        stage: "validate-topic-choices",
                        from: entry.key.clone(),
                        label: label.clone(),
                    }
                );
            }
        }

        Ok(Self {
            entries: by_key,
            order,
        })
    }

    /// The hand-authored portfolio FAQ.
    pub fn builtin() -> Self {
        // Authored data is closed over its own labels.
        match Self::from_entries(builtin_entries()) {
            Ok(table) => table,
            Err(error) => panic!("built-in topic table is invalid: {error}"),
        }
    }

    pub fn root(&self) -> &TopicEntry {
        &self.entries[ROOT_TOPIC_KEY]
    }

    pub fn get(&self, label: &str) -> Option<&TopicEntry> {
        self.entries.get(&normalize_label(label))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Entries in authored order.
    pub fn entries(&self) -> impl Iterator<Item = &TopicEntry> {
        self.order.iter().map(|key| &self.entries[key])
    }

    /// Every label any message can offer: the root's choices plus each entry's choices.
    pub fn offered_labels(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.entries()
            .flat_map(|entry| entry.next_topics.iter())
            .filter(|label| seen.insert(normalize_label(label)))
            .cloned()
            .collect()
    }

    /// Choices shown with the opening message.
    pub fn root_choices(&self) -> &[String] {
        &self.root().next_topics
    }

    pub fn resolve(&self, label: &str) -> Resolution {
        match self.get(label) {
            Some(entry) => {
                let choices = if entry.next_topics.is_empty() {
                    self.root().next_topics.clone()
                } else {
                    entry.next_topics.clone()
                };
                Resolution {
                    answer: entry.answer.clone(),
                    choices,
                    matched: true,
                }
            }
            None => {
                tracing::warn!(label, "topic label missed the table, using apology fallback");
                Resolution {
                    answer: APOLOGY_ANSWER.to_string(),
                    choices: self.root().next_topics.clone(),
                    matched: false,
                }
            }
        }
    }
}

impl Default for TopicTable {
    fn default() -> Self {
        Self::builtin()
    }
}

const GREETING: &str = "Hello! How can I assist you today?";

pub fn builtin_entries() -> Vec<TopicEntry> {
    vec![
        TopicEntry::new(
            ROOT_TOPIC_KEY,
            GREETING,
            [
                "Who is Amira?",
                "Amira's Skills",
                "Amira's Services",
                "Contact Amira",
            ],
        ),
        TopicEntry::new(
            "Who is Amira?",
            "Amira is a passionate and skilled professional with expertise in various fields. \
             She is dedicated to creating impactful digital experiences.",
            [
                "Amira's Skills",
                "Amira's Services",
                "Educational Background",
                "Go Back to Main Menu",
            ],
        ),
        TopicEntry::new(
            "Amira's Skills",
            "Amira's skills include UI/UX Design, Data Analysis, Web Design, Frontend \
             Development, and Software Engineering. She is proficient in various tools and \
             technologies related to these areas.",
            [
                "Who is Amira?",
                "Amira's Services",
                "Contact Amira",
                "Go Back to Main Menu",
            ],
        ),
        TopicEntry::new(
            "Amira's Services",
            "Amira offers services such as Responsive Web Development, Intuitive UI/UX Design, \
             Data-Driven Solutions, and Innovative Web Solutions.",
            [
                "Amira's Skills",
                "Educational Background",
                "Contact Amira",
                "Go Back to Main Menu",
            ],
        ),
        TopicEntry::new(
            "Educational Background",
            "Amira has a strong educational background with a Bachelor's degree in Information \
             Systems, completing courses like Database Design and Web Development. She also \
             holds an Advanced Diploma in UI/UX Design.",
            [
                "Who is Amira?",
                "Amira's Skills",
                "Amira's Services",
                "Go Back to Main Menu",
            ],
        ),
        TopicEntry::new(
            "Contact Amira",
            "You can reach Amira through the contact form on this website, or connect with her \
             on her social media channels listed in the footer.",
            [
                "Who is Amira?",
                "Amira's Skills",
                "Amira's Services",
                "Go Back to Main Menu",
            ],
        ),
        // Empty follow-ups fall back to the root's choices.
        TopicEntry::new("Go Back to Main Menu", GREETING, Vec::<String>::new()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TopicTableError;

    #[test]
    fn builtin_table_has_seven_entries_with_root_first() {
        let table = TopicTable::builtin();
        assert_eq!(table.len(), 7);
        assert_eq!(table.entries().next().map(|entry| entry.key.as_str()), Some(ROOT_TOPIC_KEY));
        assert_eq!(table.root().answer, GREETING);
        assert_eq!(
            table.root_choices(),
            ["Who is Amira?", "Amira's Skills", "Amira's Services", "Contact Amira"]
        );
    }

    #[test]
    fn every_offered_label_resolves_without_fallback() {
        let table = TopicTable::builtin();
        let offered = table.offered_labels();
        assert_eq!(offered.len(), 6);

        for label in offered {
            let resolution = table.resolve(&label);
            assert!(resolution.matched, "{label} fell into the fallback");
            assert_ne!(resolution.answer, APOLOGY_ANSWER);
            assert!(!resolution.choices.is_empty());
        }
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let table = TopicTable::builtin();
        let resolution = table.resolve("AMIRA'S SKILLS");
        assert!(resolution.matched);
        assert!(resolution.answer.starts_with("Amira's skills include"));
    }

    #[test]
    fn go_back_uses_root_answer_and_root_choices() {
        let table = TopicTable::builtin();
        let resolution = table.resolve("Go Back to Main Menu");
        assert_eq!(resolution.answer, table.root().answer);
        assert_eq!(resolution.choices, table.root_choices());
    }

    #[test]
    fn unknown_label_falls_back_to_apology_with_root_choices() {
        let table = TopicTable::builtin();
        let resolution = table.resolve("What is the meaning of life?");
        assert!(!resolution.matched);
        assert_eq!(resolution.answer, APOLOGY_ANSWER);
        assert_eq!(resolution.choices, table.root_choices());
    }

    #[test]
    fn rejects_missing_root() {
        let error = TopicTable::from_entries(vec![TopicEntry::new(
            "only",
            "answer",
            Vec::<String>::new(),
        )])
        .unwrap_err();
        assert!(matches!(error, TopicTableError::MissingRoot { .. }));
    }

    #[test]
    fn rejects_duplicate_keys_after_normalization() {
        let error = TopicTable::from_entries(vec![
            TopicEntry::new(ROOT_TOPIC_KEY, "hi", ["Topic"]),
            TopicEntry::new("Topic", "first", Vec::<String>::new()),
            TopicEntry::new("TOPIC", "second", Vec::<String>::new()),
        ])
        .unwrap_err();
        assert!(matches!(error, TopicTableError::DuplicateKey { ref key, .. } if key == "topic"));
    }

    #[test]
    fn rejects_dangling_choice() {
        let error = TopicTable::from_entries(vec![
            TopicEntry::new(ROOT_TOPIC_KEY, "hi", ["Missing"]),
        ])
        .unwrap_err();
        assert!(matches!(
            error,
            TopicTableError::DanglingChoice { ref label, .. } if label == "Missing"
        ));
    }

    #[test]
    fn rejects_blank_answer() {
        let error = TopicTable::from_entries(vec![TopicEntry::new(
            ROOT_TOPIC_KEY,
            "   ",
            Vec::<String>::new(),
        )])
        .unwrap_err();
        assert!(matches!(error, TopicTableError::EmptyAnswer { .. }));
    }
}
