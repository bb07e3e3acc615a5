#![forbid(unsafe_code)]

pub mod error;
pub mod model;
pub mod session;
pub mod time;

pub use error::QuizError;
pub use session::{Effect, NavKey, QuizEvent, QuizSession, SessionPhase};
pub use time::Clock;
