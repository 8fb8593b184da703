//! Survey domain: question table, per-user sessions, state machine.

pub mod machine;
pub mod question;
pub mod session;

pub use machine::{advance, CompletedSurvey, SurveyAction, Transition, TurnInput};
pub use question::{QuestionKey, QuestionSpec, QUESTIONS};
pub use session::{ConversationSession, SessionStore, UserKey};
