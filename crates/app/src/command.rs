use std::fmt;

use quiz_core::model::QuestionId;
use quiz_core::{NavKey, QuizEvent};

/// One line typed at the quiz prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Event(QuizEvent),
    Status,
    Help,
    Quit,
}

#[derive(Debug, PartialEq, Eq)]
pub enum CommandError {
    Empty,
    Unknown(String),
    MissingArgument { command: &'static str },
    InvalidIndex { raw: String },
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Empty => write!(f, "empty command"),
            CommandError::Unknown(raw) => write!(f, "unknown command: {raw} (try `help`)"),
            CommandError::MissingArgument { command } => {
                write!(f, "{command} needs more arguments (try `help`)")
            }
            CommandError::InvalidIndex { raw } => write!(f, "not a question number: {raw}"),
        }
    }
}

impl std::error::Error for CommandError {}

pub const HELP: &str = "\
Commands:
  answer <n> <value>   select <value> for question n (0-based)
  focus <n>            make question n current
  1..4                 pick that option of the current question
  submit               submit (same as Ctrl+Enter)
  esc                  back to the top
  hint <n>             show the hint for question n
  reveal <n>           show the correct answer for question n
  status               show progress and unanswered questions
  quit                 leave the quiz";

fn index(raw: Option<&str>, command: &'static str) -> Result<usize, CommandError> {
    let raw = raw.ok_or(CommandError::MissingArgument { command })?;
    let raw = raw.strip_prefix("question_").unwrap_or(raw);
    raw.parse().map_err(|_| CommandError::InvalidIndex {
        raw: raw.to_owned(),
    })
}

/// Parse a prompt line.
///
/// # Errors
///
/// Returns `CommandError` for blank, unknown or malformed input.
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Err(CommandError::Empty);
    };

    let command = match head {
        "answer" | "a" => {
            let question = QuestionId::new(index(words.next(), "answer")?);
            let value = words.collect::<Vec<_>>().join(" ");
            if value.is_empty() {
                return Err(CommandError::MissingArgument { command: "answer" });
            }
            Command::Event(QuizEvent::AnswerSelected { question, value })
        }
        "focus" | "f" => Command::Event(QuizEvent::Focus(index(words.next(), "focus")?)),
        "submit" | "ctrl+enter" => Command::Event(QuizEvent::NavigationKey(NavKey::Submit)),
        "esc" | "escape" => Command::Event(QuizEvent::NavigationKey(NavKey::Escape)),
        "hint" => Command::Event(QuizEvent::HintRequested(index(words.next(), "hint")?)),
        "reveal" => Command::Event(QuizEvent::RevealRequested(index(words.next(), "reveal")?)),
        "status" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "q" => Command::Quit,
        key => match NavKey::from_key(key, false) {
            Some(nav) => Command::Event(QuizEvent::NavigationKey(nav)),
            None => return Err(CommandError::Unknown(key.to_owned())),
        },
    };
    Ok(command)
}
