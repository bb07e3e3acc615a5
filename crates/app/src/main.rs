use std::fmt;
use std::path::PathBuf;

use quiz_core::model::QuizLayout;
use services::{Clock, PollerConfigDraft, QuizServices, TrackerConfig};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

mod command;
mod dashboard;
mod driver;
mod render;
mod submit;

use driver::QuizDriver;
use render::{RenderMode, Renderer};
use submit::Submitter;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingLayout,
    UnknownArg(String),
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingLayout => write!(f, "take requires --layout <path>"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- take      --layout <path> [--db <sqlite_url>] [--submit-url <url>] [--json]");
    eprintln!("  cargo run -p app -- dashboard [--url <base_url>]");
    eprintln!();
    eprintln!("Defaults for take:");
    eprintln!("  --db sqlite://quiz.sqlite3");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_STATS_URL, QUIZ_PREDICTIONS_SECS, QUIZ_STATS_SECS, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Take,
    Dashboard,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "take" => Some(Self::Take),
            "dashboard" => Some(Self::Dashboard),
            _ => None,
        }
    }
}

struct TakeArgs {
    db_url: String,
    layout: PathBuf,
    submit_url: Option<String>,
    mode: RenderMode,
}

impl TakeArgs {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("QUIZ_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://quiz.sqlite3".into(), normalize_sqlite_url);
        let mut layout = None;
        let mut submit_url = None;
        let mut mode = RenderMode::Text;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--layout" => layout = Some(PathBuf::from(require_value(args, "--layout")?)),
                "--submit-url" => submit_url = Some(require_value(args, "--submit-url")?),
                "--json" => mode = RenderMode::Json,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            layout: layout.ok_or(ArgsError::MissingLayout)?,
            submit_url,
            mode,
        })
    }
}

fn parse_dashboard(args: &mut impl Iterator<Item = String>) -> Result<PollerConfigDraft, ArgsError> {
    let mut draft = PollerConfigDraft::from_env();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--url" => draft.base_url = Some(require_value(args, "--url")?),
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            _ => return Err(ArgsError::UnknownArg(arg)),
        }
    }
    Ok(draft)
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn load_layout(path: &std::path::Path) -> Result<QuizLayout, Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(path)?;
    let layout: QuizLayout = serde_json::from_str(&raw)?;
    layout.check()?;
    Ok(layout)
}

async fn take(args: TakeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let layout = load_layout(&args.layout)?;

    // Open + migrate SQLite here so the library crates never touch the filesystem layout.
    prepare_sqlite_file(&args.db_url)?;
    let config = TrackerConfig::default();
    let services = QuizServices::new_sqlite(&args.db_url, Clock::system(), config).await?;

    let tracker = services.start_quiz(layout);
    let (tx, rx) = mpsc::channel(32);
    let driver = QuizDriver::new(
        tracker,
        Renderer::new(args.mode),
        Submitter::from_url(args.submit_url),
        services.clock(),
        services.config(),
        tx,
    );
    driver::run(driver, rx).await?;
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);

    let cmd = match argv.next().as_deref() {
        None | Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    let report = |e: ArgsError| {
        eprintln!("{e}");
        print_usage();
        e
    };

    match cmd {
        Command::Take => take(TakeArgs::parse(&mut argv).map_err(report)?).await,
        Command::Dashboard => {
            let config = parse_dashboard(&mut argv).map_err(report)?.validate()?;
            dashboard::run(config).await?;
            Ok(())
        }
    }
}

/// `RUST_LOG` directives when set and valid, `info` otherwise.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|raw| !raw.trim().is_empty())
        .and_then(|raw| EnvFilter::try_new(raw).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> std::vec::IntoIter<String> {
        raw.iter()
            .map(|s| (*s).to_owned())
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn take_requires_layout() {
        let err = TakeArgs::parse(&mut args(&["--db", "sqlite::memory:"])).err();
        assert!(matches!(err, Some(ArgsError::MissingLayout)));
    }

    #[test]
    fn take_reads_flags() {
        let parsed = TakeArgs::parse(&mut args(&[
            "--layout",
            "quiz.json",
            "--db",
            "sqlite::memory:",
            "--submit-url",
            "http://localhost:5000/quiz/submit",
            "--json",
        ]))
        .unwrap();
        assert_eq!(parsed.layout, PathBuf::from("quiz.json"));
        assert_eq!(parsed.db_url, "sqlite::memory:");
        assert_eq!(parsed.mode, RenderMode::Json);
        assert!(parsed.submit_url.is_some());
    }

    #[test]
    fn relative_db_paths_become_absolute() {
        let url = normalize_sqlite_url("sqlite:data/quiz.sqlite3".into());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/quiz.sqlite3"));
    }

    #[test]
    fn log_level_follows_rust_log() {
        use tracing_subscriber::filter::LevelFilter;

        assert_eq!(log_filter(None).max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(log_filter(Some("  ")).max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(
            log_filter(Some("debug")).max_level_hint(),
            Some(LevelFilter::DEBUG)
        );
        assert_eq!(log_filter(Some("warn")).max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn dashboard_url_flag_overrides_env() {
        let draft = parse_dashboard(&mut args(&["--url", "http://localhost:5000"])).unwrap();
        assert_eq!(draft.base_url.as_deref(), Some("http://localhost:5000"));
        assert!(matches!(
            parse_dashboard(&mut args(&["--url"])),
            Err(ArgsError::MissingValue { flag: "--url" })
        ));
    }
}
