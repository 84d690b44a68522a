use std::path::PathBuf;

use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TopicTableError {
    #[snafu(display("topic table has no root entry '{root}'"))]
    MissingRoot {
        stage: &'static str,
        root: &'static str,
    },
    #[snafu(display("topic '{key}' is defined more than once"))]
    DuplicateKey { stage: &'static str, key: String },
    #[snafu(display("topic '{key}' has an empty answer"))]
    EmptyAnswer { stage: &'static str, key: String },
    #[snafu(display("topic '{from}' offers '{label}', which is not a topic in the table"))]
    DanglingChoice {
        stage: &'static str,
        from: String,
        label: String,
    },
    #[snafu(display("failed to load topic table from {path:?} on `{stage}`: {source}"))]
    LoadTopicTable {
        stage: &'static str,
        path: PathBuf,
        #[snafu(source(from(figment::Error, Box::new)))]
        source: Box<figment::Error>,
    },
}

pub type TopicTableResult<T> = Result<T, TopicTableError>;
