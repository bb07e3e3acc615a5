use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::QuizError;
use crate::model::{AnswerSet, ElapsedTime, QuestionId, QuizId, QuizLayout, QuizProgress};

use super::effect::Effect;
use super::event::{NavKey, QuizEvent};

/// How long the first unanswered question stays highlighted after a blocked submit.
pub const DEFAULT_HIGHLIGHT: Duration = Duration::from_secs(3);

/// Label shown on the submit control while a submission is in flight.
pub const SUBMITTING_LABEL: &str = "Submitting...";

/// Where the attempt is in its submission lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Answering,
    Submitting,
    Submitted,
}

/// User-facing text for a blocked submission.
#[must_use]
pub fn validation_message(unanswered: usize) -> String {
    let plural = if unanswered > 1 { "s" } else { "" };
    format!("Please answer all questions. You have {unanswered} unanswered question{plural}.")
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// State of one quiz attempt.
///
/// Every transition is a method returning the effects it implies. Nothing here touches
/// storage or a screen; callers carry out the returned `Effect`s in order.
pub struct QuizSession {
    quiz_id: QuizId,
    layout: QuizLayout,
    answers: AnswerSet,
    answered: BTreeSet<QuestionId>,
    current: Option<QuestionId>,
    started_at: DateTime<Utc>,
    timer_running: bool,
    phase: SessionPhase,
    highlight_for: Duration,
}

impl QuizSession {
    /// Start an attempt for `layout`.
    ///
    /// The quiz id comes from the layout; without one it falls back to `started_at`.
    #[must_use]
    pub fn new(layout: QuizLayout, started_at: DateTime<Utc>) -> Self {
        let quiz_id = QuizId::resolve(layout.quiz_id(), started_at);
        Self {
            quiz_id,
            layout,
            answers: AnswerSet::new(),
            answered: BTreeSet::new(),
            current: None,
            started_at,
            timer_running: true,
            phase: SessionPhase::Answering,
            highlight_for: DEFAULT_HIGHLIGHT,
        }
    }

    #[must_use]
    pub fn with_highlight_duration(mut self, duration: Duration) -> Self {
        self.highlight_for = duration;
        self
    }

    #[must_use]
    pub fn quiz_id(&self) -> &QuizId {
        &self.quiz_id
    }

    #[must_use]
    pub fn storage_key(&self) -> String {
        self.quiz_id.storage_key()
    }

    #[must_use]
    pub fn layout(&self) -> &QuizLayout {
        &self.layout
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.layout.total_questions()
    }

    /// Questions carrying an answer that resolves against the layout.
    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answered.len()
    }

    #[must_use]
    pub fn is_answered(&self, question: QuestionId) -> bool {
        self.answered.contains(&question)
    }

    #[must_use]
    pub fn current(&self) -> Option<QuestionId> {
        self.current
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn timer_running(&self) -> bool {
        self.timer_running
    }

    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        QuizProgress::new(self.answered_count(), self.total_questions())
    }

    /// True iff every question has an answer.
    #[must_use]
    pub fn validate(&self) -> bool {
        self.answered_count() == self.total_questions()
    }

    /// Questions still lacking an answer, in page order.
    ///
    /// The iterator is lazy and can be cloned to walk it again.
    pub fn unanswered(&self) -> impl Iterator<Item = QuestionId> + Clone + '_ {
        (0..self.total_questions())
            .map(QuestionId::new)
            .filter(move |question| !self.answered.contains(question))
    }

    /// Answers that count toward progress, in page order. Stale entries are left out.
    pub fn resolved_answers(&self) -> impl Iterator<Item = (QuestionId, &str)> + '_ {
        self.answered
            .iter()
            .filter_map(|question| self.answers.get(*question).map(|value| (*question, value)))
    }

    #[must_use]
    pub fn has_unanswered(&self) -> bool {
        self.unanswered().next().is_some()
    }

    #[must_use]
    pub fn elapsed(&self, now: DateTime<Utc>) -> ElapsedTime {
        ElapsedTime::between(self.started_at, now)
    }

    fn resolves(&self, question: QuestionId, value: &str) -> bool {
        self.layout
            .question(question)
            .is_some_and(|q| q.accepts(value))
    }

    fn render_progress(&self) -> Effect {
        Effect::RenderProgress {
            progress: self.progress(),
        }
    }

    //
    // ─── TRANSITIONS ───────────────────────────────────────────────────────────
    //

    /// Dispatch a single event.
    ///
    /// # Errors
    ///
    /// Returns `QuizError` when the event is not valid in the current state.
    pub fn handle(&mut self, event: QuizEvent) -> Result<Vec<Effect>, QuizError> {
        match event {
            QuizEvent::Restore(saved) => Ok(self.restore(saved)),
            QuizEvent::AnswerSelected { question, value } => self.record_answer(question, value),
            QuizEvent::Focus(index) => self.focus(index),
            QuizEvent::NavigationKey(key) => self.navigate(key),
            QuizEvent::SubmitAttempted => self.on_submit_attempt(),
            QuizEvent::SubmissionConfirmed => self.confirm_submission(),
            QuizEvent::SubmissionFailed => self.submission_failed(),
            QuizEvent::TimerTick { now } => Ok(self.tick(now)),
            QuizEvent::HighlightExpired(question) => {
                Ok(vec![Effect::ClearHighlight { question }])
            }
            QuizEvent::HintRequested(index) => Ok(self.show_hint(index)),
            QuizEvent::RevealRequested(index) => Ok(self.reveal_correct(index)),
            QuizEvent::LeaveRequested => Ok(self.leave_requested()),
        }
    }

    /// Replace the answers with a persisted set and re-mark what it selects.
    ///
    /// Entries that do not resolve against the layout are kept but neither marked nor
    /// counted. Calling this twice with the same set yields the same state.
    pub fn restore(&mut self, saved: AnswerSet) -> Vec<Effect> {
        self.answers = saved;
        self.answered.clear();

        let mut effects = Vec::new();
        for (question, value) in self.answers.canonical() {
            if !self.resolves(question, value) {
                continue;
            }
            self.answered.insert(question);
            effects.push(Effect::SelectOption {
                question,
                value: value.to_owned(),
            });
            effects.push(Effect::MarkAnswered { question });
        }
        effects.push(self.render_progress());
        effects
    }

    /// Record the selected value for a question, replacing any earlier choice.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Locked` once submission has started,
    /// `QuizError::UnknownQuestion` for a question outside the layout and
    /// `QuizError::UnknownOption` for a value the question does not offer.
    pub fn record_answer(
        &mut self,
        question: QuestionId,
        value: impl Into<String>,
    ) -> Result<Vec<Effect>, QuizError> {
        if self.phase != SessionPhase::Answering {
            return Err(QuizError::Locked);
        }
        let value = value.into();
        let Some(entry) = self.layout.question(question) else {
            return Err(QuizError::UnknownQuestion(question));
        };
        if !entry.accepts(&value) {
            return Err(QuizError::UnknownOption { question, value });
        }

        self.answers.insert(question, value.clone());
        self.answered.insert(question);

        Ok(vec![
            Effect::PersistAnswers {
                key: self.storage_key(),
                answers: self.answers.clone(),
            },
            Effect::SelectOption { question, value },
            Effect::MarkAnswered { question },
            self.render_progress(),
        ])
    }

    /// Gate a submit: either block with validation feedback or let it through.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Locked` if a submission is already in flight or done.
    pub fn on_submit_attempt(&mut self) -> Result<Vec<Effect>, QuizError> {
        if self.phase != SessionPhase::Answering {
            return Err(QuizError::Locked);
        }

        if !self.validate() {
            let unanswered = self.unanswered();
            let count = unanswered.clone().count();
            let mut effects = vec![
                Effect::CancelSubmit,
                Effect::ShowValidation {
                    message: validation_message(count),
                    unanswered: count,
                },
            ];
            if let Some(first) = unanswered.clone().next() {
                effects.push(Effect::ScrollTo { question: first });
                effects.push(Effect::Highlight {
                    question: first,
                    duration: self.highlight_for,
                });
            }
            return Ok(effects);
        }

        self.phase = SessionPhase::Submitting;
        self.timer_running = false;
        Ok(vec![
            Effect::ProceedSubmit,
            Effect::DisableSubmit {
                label: SUBMITTING_LABEL.to_owned(),
            },
            Effect::StopTimer,
        ])
    }

    /// The submission went through; drop the persisted answers.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotSubmitting` if no submission was let through.
    pub fn confirm_submission(&mut self) -> Result<Vec<Effect>, QuizError> {
        if self.phase != SessionPhase::Submitting {
            return Err(QuizError::NotSubmitting);
        }
        self.phase = SessionPhase::Submitted;
        Ok(vec![Effect::ErasePersisted {
            key: self.storage_key(),
        }])
    }

    /// The submission did not go through; reopen the quiz with answers intact.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotSubmitting` if no submission was let through.
    pub fn submission_failed(&mut self) -> Result<Vec<Effect>, QuizError> {
        if self.phase != SessionPhase::Submitting {
            return Err(QuizError::NotSubmitting);
        }
        self.phase = SessionPhase::Answering;
        self.timer_running = true;
        Ok(vec![Effect::EnableSubmit, Effect::ResumeTimer])
    }

    pub fn tick(&self, now: DateTime<Utc>) -> Vec<Effect> {
        if !self.timer_running {
            return Vec::new();
        }
        let elapsed = self.elapsed(now);
        vec![Effect::RenderTimer {
            text: elapsed.display(),
            tone: elapsed.tone(),
        }]
    }

    /// Make the question at `index` the current one.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::UnknownQuestion` if `index` is out of range.
    pub fn focus(&mut self, index: usize) -> Result<Vec<Effect>, QuizError> {
        let question = QuestionId::new(index);
        if !self.layout.contains(question) {
            return Err(QuizError::UnknownQuestion(question));
        }
        self.current = Some(question);
        Ok(vec![Effect::SetCurrent { question }])
    }

    /// Apply a keyboard shortcut. Shortcuts are inert once submission has started.
    ///
    /// # Errors
    ///
    /// Propagates errors from the answer or submit path.
    pub fn navigate(&mut self, key: NavKey) -> Result<Vec<Effect>, QuizError> {
        match key {
            NavKey::Escape => Ok(vec![Effect::ScrollToTop]),
            _ if self.phase != SessionPhase::Answering => Ok(Vec::new()),
            NavKey::Submit => self.on_submit_attempt(),
            NavKey::Option(digit) => {
                let Some(question) = self.current else {
                    return Ok(Vec::new());
                };
                let option = usize::from(digit)
                    .checked_sub(1)
                    .and_then(|pos| self.layout.question(question)?.option_at(pos))
                    .map(|opt| opt.value.clone());
                match option {
                    Some(value) => self.record_answer(question, value),
                    None => Ok(Vec::new()),
                }
            }
        }
    }

    #[must_use]
    pub fn show_hint(&self, index: usize) -> Vec<Effect> {
        let question = QuestionId::new(index);
        self.layout
            .question(question)
            .and_then(|q| q.hint.clone())
            .map(|hint| vec![Effect::ShowHint { question, hint }])
            .unwrap_or_default()
    }

    #[must_use]
    pub fn reveal_correct(&self, index: usize) -> Vec<Effect> {
        let question = QuestionId::new(index);
        self.layout
            .question(question)
            .and_then(|q| q.correct.clone())
            .map(|value| vec![Effect::HighlightCorrect { question, value }])
            .unwrap_or_default()
    }

    #[must_use]
    pub fn leave_requested(&self) -> Vec<Effect> {
        if self.phase != SessionPhase::Submitted && self.has_unanswered() {
            vec![Effect::ConfirmLeave]
        } else {
            Vec::new()
        }
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("quiz_id", &self.quiz_id)
            .field("total_questions", &self.total_questions())
            .field("answered", &self.answered.len())
            .field("current", &self.current)
            .field("phase", &self.phase)
            .field("started_at", &self.started_at)
            .finish_non_exhaustive()
    }
}
