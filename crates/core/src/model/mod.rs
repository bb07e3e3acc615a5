mod answers;
mod elapsed;
mod ids;
mod layout;
mod progress;

pub use answers::AnswerSet;
pub use elapsed::{DANGER_AFTER_SECS, ElapsedTime, TimerTone, WARNING_AFTER_SECS};
pub use ids::{ANSWERS_KEY_PREFIX, ParseIdError, QUESTION_PREFIX, QuestionId, QuizId};
pub use layout::{AnswerOption, LayoutError, Question, QuizLayout};
pub use progress::{QuizProgress, SubmitState};
