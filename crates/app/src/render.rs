use std::io::{self, Write};

use quiz_core::model::{QuizProgress, TimerTone};
use quiz_core::Effect;

/// How effects reach the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Text,
    /// One JSON object per effect, for piping into another front end.
    Json,
}

pub struct Renderer {
    mode: RenderMode,
}

impl Renderer {
    #[must_use]
    pub fn new(mode: RenderMode) -> Self {
        Self { mode }
    }

    pub fn effects(&self, effects: &[Effect]) {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        for effect in effects {
            let line = match self.mode {
                RenderMode::Text => describe(effect),
                RenderMode::Json => serde_json::to_string(effect).ok(),
            };
            if let Some(line) = line {
                let _ = writeln!(out, "{line}");
            }
        }
    }

    pub fn notice(&self, message: &str) {
        if self.mode == RenderMode::Text {
            println!("{message}");
        }
    }
}

const BAR_WIDTH: usize = 20;

fn progress_line(progress: &QuizProgress) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let filled = ((progress.percent() / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!(
        "[{}{}] {} answered ({:.0}%)",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        progress.label(),
        progress.percent()
    )
}

/// Terminal text for an effect, or `None` for effects with nothing to show.
#[must_use]
pub fn describe(effect: &Effect) -> Option<String> {
    let line = match effect {
        Effect::PersistAnswers { .. } | Effect::ErasePersisted { .. } => return None,
        Effect::SelectOption { question, value } => format!("{question}: selected {value:?}"),
        Effect::MarkAnswered { question } => format!("{question}: answered"),
        Effect::RenderProgress { progress } => progress_line(progress),
        Effect::SetCurrent { question } => format!("> {question}"),
        Effect::CancelSubmit => return None,
        Effect::ShowValidation { message, .. } => format!("! {message}"),
        Effect::ScrollTo { question } => format!("> {question}"),
        Effect::ScrollToTop => "> top".to_owned(),
        Effect::Highlight { question, .. } => format!("* {question} needs an answer"),
        Effect::ClearHighlight { .. } => return None,
        Effect::ProceedSubmit => "submitting answers".to_owned(),
        Effect::DisableSubmit { label } => format!("[{label}]"),
        Effect::EnableSubmit => "submit is available again".to_owned(),
        Effect::StopTimer => return None,
        Effect::ResumeTimer => return None,
        Effect::RenderTimer { text, tone } => match tone {
            TimerTone::Normal => format!("time {text}"),
            TimerTone::Warning => format!("time {text} (over 5 minutes)"),
            TimerTone::Danger => format!("time {text} (over 10 minutes)"),
        },
        Effect::ShowHint { question, hint } => format!("hint for {question}: {hint}"),
        Effect::HighlightCorrect { question, value } => {
            format!("{question}: correct answer is {value:?}")
        }
        Effect::ConfirmLeave => {
            "unanswered questions remain; type quit again to leave anyway".to_owned()
        }
    };
    Some(line)
}
