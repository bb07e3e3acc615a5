mod effect;
mod event;
mod state;

pub use effect::Effect;
pub use event::{NavKey, QuizEvent};
pub use state::{DEFAULT_HIGHLIGHT, QuizSession, SUBMITTING_LABEL, SessionPhase, validation_message};
