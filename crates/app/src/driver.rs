use std::collections::VecDeque;
use std::time::Duration;

use quiz_core::{Clock, Effect, QuizEvent, SessionPhase};
use services::{ElapsedTicker, QuizTracker, TrackerConfig};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::command::{Command, CommandError, HELP, parse_command};
use crate::render::Renderer;
use crate::submit::{Submitter, submission_form};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Finished,
}

/// Runs one attempt: feeds typed commands and timer events into the tracker and
/// carries out the effects that need the runtime (ticker, highlight expiry, submit).
pub struct QuizDriver {
    tracker: QuizTracker,
    renderer: Renderer,
    submitter: Submitter,
    clock: Clock,
    tick_every: Duration,
    events: mpsc::Sender<QuizEvent>,
    ticker: Option<ElapsedTicker>,
    leave_armed: bool,
}

impl QuizDriver {
    #[must_use]
    pub fn new(
        tracker: QuizTracker,
        renderer: Renderer,
        submitter: Submitter,
        clock: Clock,
        config: &TrackerConfig,
        events: mpsc::Sender<QuizEvent>,
    ) -> Self {
        Self {
            tracker,
            renderer,
            submitter,
            clock,
            tick_every: config.tick_every,
            events,
            ticker: None,
            leave_armed: false,
        }
    }

    #[cfg(test)]
    fn tracker(&self) -> &QuizTracker {
        &self.tracker
    }

    #[cfg(test)]
    fn timer_running(&self) -> bool {
        self.ticker.is_some()
    }

    /// Restore saved answers and start the elapsed ticker.
    pub async fn start(&mut self) {
        let effects = self.tracker.restore().await;
        self.renderer.effects(&effects);
        self.start_ticker();
    }

    fn start_ticker(&mut self) {
        if self.ticker.is_none() {
            self.ticker = Some(ElapsedTicker::spawn(
                self.clock,
                self.tick_every,
                self.events.clone(),
            ));
        }
    }

    pub async fn command(&mut self, command: Command) -> Flow {
        match command {
            Command::Event(event) => {
                self.leave_armed = false;
                self.dispatch(event).await
            }
            Command::Status => {
                self.status();
                Flow::Continue
            }
            Command::Help => {
                self.renderer.notice(HELP);
                Flow::Continue
            }
            Command::Quit => self.quit().await,
        }
    }

    async fn quit(&mut self) -> Flow {
        if self.leave_armed {
            return Flow::Finished;
        }
        let effects = self.dispatch_one(QuizEvent::LeaveRequested).await;
        if effects.contains(&Effect::ConfirmLeave) {
            self.leave_armed = true;
            Flow::Continue
        } else {
            Flow::Finished
        }
    }

    fn status(&self) {
        let progress = self.tracker.progress();
        let unanswered: Vec<String> = self
            .tracker
            .unanswered()
            .map(|q| q.to_string())
            .collect();
        self.renderer.notice(&format!(
            "{} answered ({:.2}%)",
            progress.label(),
            progress.percent_rounded()
        ));
        if !unanswered.is_empty() {
            self.renderer
                .notice(&format!("unanswered: {}", unanswered.join(", ")));
        }
    }

    /// Handle an event and whatever follow-up events its effects produce.
    pub async fn dispatch(&mut self, event: QuizEvent) -> Flow {
        let mut queue = VecDeque::from([event]);
        while let Some(event) = queue.pop_front() {
            let effects = self.dispatch_one(event).await;
            if effects.contains(&Effect::ProceedSubmit) {
                let form = submission_form(self.tracker.session());
                let accepted = self.submitter.submit(&form).await;
                queue.push_back(if accepted {
                    QuizEvent::SubmissionConfirmed
                } else {
                    QuizEvent::SubmissionFailed
                });
            }
        }

        if self.tracker.session().phase() == SessionPhase::Submitted {
            self.renderer.notice("answers submitted");
            Flow::Finished
        } else {
            Flow::Continue
        }
    }

    async fn dispatch_one(&mut self, event: QuizEvent) -> Vec<Effect> {
        let effects = match self.tracker.handle(event).await {
            Ok(effects) => effects,
            Err(err) => {
                self.renderer.notice(&format!("! {err}"));
                return Vec::new();
            }
        };
        for effect in &effects {
            match effect {
                Effect::StopTimer => self.ticker = None,
                Effect::ResumeTimer => self.start_ticker(),
                Effect::Highlight { question, duration } => {
                    let events = self.events.clone();
                    let question = *question;
                    let duration = *duration;
                    tokio::spawn(async move {
                        tokio::time::sleep(duration).await;
                        let _ = events.send(QuizEvent::HighlightExpired(question)).await;
                    });
                }
                _ => {}
            }
        }
        self.renderer.effects(&effects);
        effects
    }
}

/// Drive the attempt from stdin until it is submitted or left.
///
/// # Errors
///
/// Returns an error if stdin cannot be read.
pub async fn run(
    mut driver: QuizDriver,
    mut events: mpsc::Receiver<QuizEvent>,
) -> Result<(), std::io::Error> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    driver.start().await;

    loop {
        let flow = tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("stdin closed");
                    break;
                };
                match parse_command(&line) {
                    Ok(command) => driver.command(command).await,
                    Err(CommandError::Empty) => Flow::Continue,
                    Err(err) => {
                        warn!(error = %err, "ignored input");
                        driver.renderer.notice(&err.to_string());
                        Flow::Continue
                    }
                }
            }
            Some(event) = events.recv() => driver.dispatch(event).await,
        };
        if flow == Flow::Finished {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RenderMode;
    use quiz_core::model::{QuestionId, QuizId, QuizLayout};
    use quiz_core::time::fixed_now;
    use quiz_core::NavKey;
    use services::QuizServices;

    fn driver(questions: usize) -> (QuizDriver, mpsc::Receiver<QuizEvent>) {
        let services = QuizServices::in_memory(Clock::fixed(fixed_now()));
        let tracker = services.start_quiz(QuizLayout::with_question_count(
            Some(QuizId::new("abc")),
            questions,
        ));
        let (tx, rx) = mpsc::channel(16);
        let driver = QuizDriver::new(
            tracker,
            Renderer::new(RenderMode::Json),
            Submitter::Local,
            services.clock(),
            services.config(),
            tx,
        );
        (driver, rx)
    }

    fn answer(index: usize) -> QuizEvent {
        QuizEvent::AnswerSelected {
            question: QuestionId::new(index),
            value: "x".into(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn blocked_submit_schedules_highlight_expiry() {
        let (mut driver, mut rx) = driver(2);
        driver.start().await;
        driver.dispatch(answer(0)).await;

        let flow = driver
            .dispatch(QuizEvent::NavigationKey(NavKey::Submit))
            .await;
        assert_eq!(flow, Flow::Continue);
        assert!(driver.timer_running());

        let mut expired = None;
        while let Some(event) = rx.recv().await {
            if let QuizEvent::HighlightExpired(question) = event {
                expired = Some(question);
                break;
            }
        }
        assert_eq!(expired, Some(QuestionId::new(1)));
    }

    #[tokio::test]
    async fn complete_attempt_submits_and_finishes() {
        let (mut driver, _rx) = driver(2);
        driver.start().await;
        driver.dispatch(answer(0)).await;
        driver.dispatch(answer(1)).await;

        let flow = driver.dispatch(QuizEvent::SubmitAttempted).await;
        assert_eq!(flow, Flow::Finished);
        assert!(!driver.timer_running());
        assert_eq!(driver.tracker().session().phase(), SessionPhase::Submitted);
    }

    #[tokio::test]
    async fn quit_with_gaps_asks_twice() {
        let (mut driver, _rx) = driver(2);
        driver.start().await;
        assert_eq!(driver.command(Command::Quit).await, Flow::Continue);
        assert_eq!(driver.command(Command::Quit).await, Flow::Finished);
    }

    #[tokio::test]
    async fn quit_when_done_leaves_at_once() {
        let (mut driver, _rx) = driver(0);
        driver.start().await;
        assert_eq!(driver.command(Command::Quit).await, Flow::Finished);
    }
}
