use std::fmt;
use std::sync::Arc;

use quiz_core::model::{AnswerSet, QuestionId, QuizId};
use storage::AnswerStore;
use storage::repository::Storage;

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    quiz_id: QuizId,
    answers: AnswerSet,
    clear: bool,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingQuizId,
    UnknownArg(String),
    InvalidQuizId { raw: String },
    InvalidAnswer { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingQuizId => write!(f, "--quiz-id is required"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidQuizId { raw } => write!(f, "invalid --quiz-id value: {raw:?}"),
            ArgsError::InvalidAnswer { raw } => {
                write!(f, "invalid --answer value (expected question_<n>=<value>): {raw}")
            }
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!(
        "  cargo run -p storage --bin seed -- --quiz-id <id> [--db <sqlite_url>] [--answer question_<n>=<value>]... [--clear]"
    );
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL");
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_answer(raw: &str) -> Result<(QuestionId, String), ArgsError> {
    let invalid = || ArgsError::InvalidAnswer {
        raw: raw.to_string(),
    };
    let (question, value) = raw.split_once('=').ok_or_else(invalid)?;
    let question: QuestionId = question.trim().parse().map_err(|_| invalid())?;
    Ok((question, value.to_string()))
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, ArgsError> {
        let mut args = args.into_iter();
        let mut db_url =
            std::env::var("QUIZ_DB_URL").unwrap_or_else(|_| "sqlite://quiz.sqlite3?mode=rwc".into());
        let mut quiz_id = None;
        let mut answers = AnswerSet::new();
        let mut clear = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--quiz-id" => {
                    let value = require_value(&mut args, "--quiz-id")?;
                    quiz_id = Some(
                        value
                            .parse::<QuizId>()
                            .map_err(|_| ArgsError::InvalidQuizId { raw: value.clone() })?,
                    );
                }
                "--answer" => {
                    let value = require_value(&mut args, "--answer")?;
                    let (question, selected) = parse_answer(&value)?;
                    answers.insert(question, selected);
                }
                "--clear" => clear = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            quiz_id: quiz_id.ok_or(ArgsError::MissingQuizId)?,
            answers,
            clear,
        })
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse(std::env::args().skip(1)).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    let store = AnswerStore::new(Arc::clone(&storage.local));
    let key = args.quiz_id.storage_key();

    if args.clear {
        store.clear(&key).await?;
        println!("cleared {key}");
        return Ok(());
    }

    store.save(&key, &args.answers).await?;
    println!("seeded {key} with {} answer(s)", args.answers.len());
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
