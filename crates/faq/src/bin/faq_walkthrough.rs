use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use snafu::{OptionExt, ResultExt, Snafu};

use folio_faq::{
    Completion, FaqSession, SelectRejection, Thread, TopicTable, TopicTableError, WidgetState,
    load_topic_table,
};

#[derive(Debug, Clone)]
struct RunnerArgs {
    scenario: Scenario,
    topics_path: Option<PathBuf>,
    delay: Option<Duration>,
}

#[derive(Debug, Clone, Copy)]
enum Scenario {
    TableClosure,
    OpenSeed,
    SkillsFlow,
    BackToMain,
    ReopenMidDelay,
    Transcript,
    All,
}

impl Scenario {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "table_closure" => Some(Self::TableClosure),
            "open_seed" => Some(Self::OpenSeed),
            "skills_flow" => Some(Self::SkillsFlow),
            "back_to_main" => Some(Self::BackToMain),
            "reopen_mid_delay" => Some(Self::ReopenMidDelay),
            "transcript" => Some(Self::Transcript),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    /// Scenarios run for this selection, in order. `All` skips the transcript dump.
    fn steps(self) -> &'static [Scenario] {
        match self {
            Self::TableClosure => &[Self::TableClosure],
            Self::OpenSeed => &[Self::OpenSeed],
            Self::SkillsFlow => &[Self::SkillsFlow],
            Self::BackToMain => &[Self::BackToMain],
            Self::ReopenMidDelay => &[Self::ReopenMidDelay],
            Self::Transcript => &[Self::Transcript],
            Self::All => &[
                Self::TableClosure,
                Self::OpenSeed,
                Self::SkillsFlow,
                Self::BackToMain,
                Self::ReopenMidDelay,
            ],
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::TableClosure => "table_closure",
            Self::OpenSeed => "open_seed",
            Self::SkillsFlow => "skills_flow",
            Self::BackToMain => "back_to_main",
            Self::ReopenMidDelay => "reopen_mid_delay",
            Self::Transcript => "transcript",
            Self::All => "all",
        }
    }
}

#[derive(Debug, Snafu)]
enum RunnerError {
    #[snafu(display("missing required --scenario argument"))]
    MissingScenario { stage: &'static str },
    #[snafu(display("missing value for argument '{arg}'"))]
    MissingArgumentValue {
        stage: &'static str,
        arg: &'static str,
    },
    #[snafu(display("unknown scenario '{raw}'"))]
    UnknownScenario { stage: &'static str, raw: String },
    #[snafu(display("unknown argument '{raw}'"))]
    UnknownArgument { stage: &'static str, raw: String },
    #[snafu(display("invalid --delay-ms value '{raw}'"))]
    InvalidDelay {
        stage: &'static str,
        raw: String,
        source: std::num::ParseIntError,
    },
    #[snafu(display("topic table rejected: {source}"))]
    TopicTable {
        stage: &'static str,
        source: TopicTableError,
    },
    #[snafu(display("selection of '{label}' was rejected: {rejection:?}"))]
    Rejected {
        stage: &'static str,
        label: String,
        rejection: SelectRejection,
    },
    #[snafu(display("pending answer task failed: {source}"))]
    Join {
        stage: &'static str,
        source: tokio::task::JoinError,
    },
    #[snafu(display("scenario '{scenario}' failed: {reason}"))]
    ScenarioFailed {
        stage: &'static str,
        scenario: &'static str,
        reason: String,
    },
}

type RunnerResult<T> = Result<T, RunnerError>;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    if let Err(error) = run().await {
        println!("runner_ok=false");
        eprintln!("runner_error={error}");
        std::process::exit(1);
    }
}

async fn run() -> RunnerResult<()> {
    let args = parse_args(env::args().skip(1))?;
    println!("scenario={}", args.scenario.name());

    let table = match args.topics_path.as_deref() {
        Some(path) => {
            println!("topics_path={}", path.display());
            load_topic_table(path).context(TopicTableSnafu {
                stage: "load-topic-table",
            })?
        }
        None => TopicTable::builtin(),
    };
    let table = Arc::new(table);
    let session = match args.delay {
        Some(delay) => FaqSession::with_typing_delay(table.clone(), delay),
        None => FaqSession::new(table.clone()),
    };

    let completed = run_steps(args.scenario, &session, &table).await?;
    println!("scenarios_completed={completed}");
    println!("runner_ok=true");
    Ok(())
}

async fn run_steps(
    scenario: Scenario,
    session: &FaqSession,
    table: &TopicTable,
) -> RunnerResult<usize> {
    let steps = scenario.steps();
    for step in steps {
        match step {
            Scenario::TableClosure => run_table_closure(table)?,
            Scenario::OpenSeed => run_open_seed(session, table)?,
            Scenario::SkillsFlow => run_skills_flow(session).await?,
            Scenario::BackToMain => run_back_to_main(session, table).await?,
            Scenario::ReopenMidDelay => run_reopen_mid_delay(session).await?,
            Scenario::Transcript => run_transcript(session).await?,
            Scenario::All => {}
        }
    }
    Ok(steps.len())
}

fn parse_args(args: impl IntoIterator<Item = String>) -> RunnerResult<RunnerArgs> {
    let mut scenario = None;
    let mut topics_path = None;
    let mut delay = None;
    let mut pending = args.into_iter();

    while let Some(argument) = pending.next() {
        match argument.as_str() {
            "--scenario" => {
                let value = pending.next().context(MissingArgumentValueSnafu {
                    stage: "parse-args-scenario-value",
                    arg: "--scenario",
                })?;

                let parsed = Scenario::parse(&value).context(UnknownScenarioSnafu {
                    stage: "parse-args-scenario",
                    raw: value,
                })?;
                scenario = Some(parsed);
            }
            "--topics" => {
                let value = pending.next().context(MissingArgumentValueSnafu {
                    stage: "parse-args-topics-value",
                    arg: "--topics",
                })?;
                topics_path = Some(PathBuf::from(value));
            }
            "--delay-ms" => {
                let value = pending.next().context(MissingArgumentValueSnafu {
                    stage: "parse-args-delay-value",
                    arg: "--delay-ms",
                })?;
                let millis = value.parse::<u64>().context(InvalidDelaySnafu {
                    stage: "parse-args-delay",
                    raw: value.clone(),
                })?;
                delay = Some(Duration::from_millis(millis));
            }
            _ => {
                return UnknownArgumentSnafu {
                    stage: "parse-args",
                    raw: argument,
                }
                .fail();
            }
        }
    }

    Ok(RunnerArgs {
        scenario: scenario.context(MissingScenarioSnafu {
            stage: "parse-args-scenario-required",
        })?,
        topics_path,
        delay,
    })
}

fn run_table_closure(table: &TopicTable) -> RunnerResult<()> {
    let offered = table.offered_labels();
    let misses = offered
        .iter()
        .filter(|label| !table.resolve(label).matched)
        .cloned()
        .collect::<Vec<_>>();

    println!("offered_labels={}", offered.len());
    if !misses.is_empty() {
        return ScenarioFailedSnafu {
            stage: "scenario-table-closure",
            scenario: "table_closure",
            reason: format!("labels without entries: {misses:?}"),
        }
        .fail();
    }

    println!("table_closure=true");
    Ok(())
}

fn run_open_seed(session: &FaqSession, table: &TopicTable) -> RunnerResult<()> {
    session.close();
    session.open();
    ensure_fresh(session, table, "open_seed")?;
    println!("open_seed=true");
    Ok(())
}

async fn run_skills_flow(session: &FaqSession) -> RunnerResult<()> {
    reopen(session);
    let completion = select_and_wait(session, "Amira's Skills").await?;
    let snapshot = session.snapshot();
    let messages = snapshot.thread.messages();

    let expected_choices = [
        "Who is Amira?",
        "Amira's Services",
        "Contact Amira",
        "Go Back to Main Menu",
    ];
    let passed = matches!(completion, Completion::Applied(_))
        && messages.len() == 3
        && messages[0].choices().is_empty()
        && messages[1].is_user()
        && messages[1].text == "Amira's Skills"
        && messages[2].text.starts_with("Amira's skills include")
        && messages[2].choices() == expected_choices
        && snapshot.state == WidgetState::OpenIdle;

    if !passed {
        return ScenarioFailedSnafu {
            stage: "scenario-skills-flow",
            scenario: "skills_flow",
            reason: format!("unexpected thread: {:?}", snapshot.thread),
        }
        .fail();
    }

    println!("skills_flow=true");
    Ok(())
}

async fn run_back_to_main(session: &FaqSession, table: &TopicTable) -> RunnerResult<()> {
    reopen(session);
    select_and_wait(session, "Amira's Skills").await?;
    select_and_wait(session, "Go Back to Main Menu").await?;

    let snapshot = session.snapshot();
    let passed = snapshot.thread.last().is_some_and(|message| {
        message.text == table.root().answer && message.choices() == table.root_choices()
    });

    if !passed {
        return ScenarioFailedSnafu {
            stage: "scenario-back-to-main",
            scenario: "back_to_main",
            reason: format!("last message was {:?}", snapshot.thread.last()),
        }
        .fail();
    }

    println!("back_to_main=true");
    Ok(())
}

async fn run_reopen_mid_delay(session: &FaqSession) -> RunnerResult<()> {
    reopen(session);
    let stale = session
        .select("Amira's Skills")
        .map_err(|rejection| RunnerError::Rejected {
            stage: "scenario-reopen-select",
            label: "Amira's Skills".to_string(),
            rejection,
        })?;

    session.close();
    session.open();
    let fresh = session.snapshot();

    let completion = stale.await.context(JoinSnafu {
        stage: "scenario-reopen-await",
    })?;
    let after = session.snapshot();

    println!("stale_completion={}", completion == Completion::Stale);
    if completion != Completion::Stale || after != fresh || after.thread.len() != 1 {
        return ScenarioFailedSnafu {
            stage: "scenario-reopen-mid-delay",
            scenario: "reopen_mid_delay",
            reason: format!("stale answer leaked into the new thread: {:?}", after.thread),
        }
        .fail();
    }

    println!("reopen_mid_delay=true");
    Ok(())
}

async fn run_transcript(session: &FaqSession) -> RunnerResult<()> {
    reopen(session);

    // Follow the first unvisited choice until every topic has been answered once.
    let mut visited = Vec::<String>::new();
    loop {
        let snapshot = session.snapshot();
        let next = snapshot
            .thread
            .active_choices()
            .iter()
            .find(|label| !visited.contains(*label))
            .cloned();
        let Some(label) = next else {
            break;
        };
        select_and_wait(session, &label).await?;
        visited.push(label);
    }

    print_thread(&session.snapshot().thread);
    println!("visited_topics={}", visited.len());
    Ok(())
}

fn reopen(session: &FaqSession) {
    session.close();
    session.open();
}

async fn select_and_wait(session: &FaqSession, label: &str) -> RunnerResult<Completion> {
    let handle = session
        .select(label)
        .map_err(|rejection| RunnerError::Rejected {
            stage: "select-and-wait",
            label: label.to_string(),
            rejection,
        })?;

    handle.await.context(JoinSnafu {
        stage: "select-and-wait-join",
    })
}

fn ensure_fresh(
    session: &FaqSession,
    table: &TopicTable,
    scenario: &'static str,
) -> RunnerResult<()> {
    let snapshot = session.snapshot();
    let messages = snapshot.thread.messages();
    let fresh = messages.len() == 1
        && messages[0].text == table.root().answer
        && messages[0].choices() == table.root_choices()
        && snapshot.state == WidgetState::OpenIdle;

    if !fresh {
        return ScenarioFailedSnafu {
            stage: "ensure-fresh-thread",
            scenario,
            reason: format!("thread after open: {:?}", snapshot.thread),
        }
        .fail();
    }
    Ok(())
}

fn print_thread(thread: &Thread) {
    for message in thread.messages() {
        let speaker = if message.is_user() { "you" } else { "bot" };
        println!("{speaker}> {}", message.text);
        for choice in message.choices() {
            println!("    [{choice}]");
        }
    }
}
