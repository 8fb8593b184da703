//! Conversation state machine.
//!
//! One pure transition function over the enumerated question sequence,
//! instead of per-state handler registration: the whole transition table is
//! auditable (and tested) in one place.

use super::question::QuestionKey;
use super::session::ConversationSession;

/// One decoded inbound turn, as far as the state machine cares.
#[derive(Debug, Clone, Copy)]
pub struct TurnInput<'a> {
    /// Whether this turn is the start trigger (`/start`).
    pub is_start: bool,
    /// Raw message text. Stored verbatim as the answer — yes/no is a UI
    /// hint, not a constraint, so any text (including empty) is accepted.
    pub text: &'a str,
}

/// The side effect the dispatcher must perform after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurveyAction {
    /// Send the prompt for this question.
    ShowPrompt(QuestionKey),
    /// Send the closing line and the summary, then drop the session.
    ShowSummaryAndClear(CompletedSurvey),
    /// No state change, no outbound send.
    Ignore,
}

/// All four answers, in question order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedSurvey {
    pub answers: Vec<(QuestionKey, String)>,
}

/// Result of advancing the machine: the session to persist (`None` means
/// cleared/absent) and the action to perform.
#[derive(Debug, Clone)]
pub struct Transition {
    pub session: Option<ConversationSession>,
    pub action: SurveyAction,
}

/// Advance a user's dialog by one inbound message.
///
/// - start trigger: always begins a fresh session at the first question,
///   silently discarding any in-flight answers;
/// - answer mid-sequence: records it and moves to the next question;
/// - answer to the final question: records it and completes the survey;
/// - anything else without a session: ignored.
pub fn advance(existing: Option<ConversationSession>, input: &TurnInput<'_>) -> Transition {
    if input.is_start {
        let session = ConversationSession::new();
        return Transition {
            action: SurveyAction::ShowPrompt(session.current_question),
            session: Some(session),
        };
    }

    let Some(mut session) = existing else {
        return Transition {
            session: None,
            action: SurveyAction::Ignore,
        };
    };

    let answered = session.current_question;
    session.answers.push((answered, input.text.to_string()));

    match answered.next() {
        Some(next) => {
            session.current_question = next;
            Transition {
                session: Some(session),
                action: SurveyAction::ShowPrompt(next),
            }
        }
        None => Transition {
            session: None,
            action: SurveyAction::ShowSummaryAndClear(CompletedSurvey {
                answers: session.answers,
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> TurnInput<'static> {
        TurnInput {
            is_start: true,
            text: "/start",
        }
    }

    fn answer(text: &str) -> TurnInput<'_> {
        TurnInput {
            is_start: false,
            text,
        }
    }

    #[test]
    fn start_creates_session_at_first_question() {
        let t = advance(None, &start());
        let session = t.session.expect("session created");
        assert_eq!(session.current_question, QuestionKey::Zen);
        assert!(session.answers.is_empty());
        assert_eq!(t.action, SurveyAction::ShowPrompt(QuestionKey::Zen));
    }

    #[test]
    fn full_dialog_yields_summary_in_order() {
        let mut session = None;
        let t = advance(session.take(), &start());
        session = t.session;

        for text in ["Si", "No", "Si"] {
            let t = advance(session.take(), &answer(text));
            assert!(matches!(t.action, SurveyAction::ShowPrompt(_)));
            session = t.session;
        }

        let t = advance(session.take(), &answer("No"));
        assert!(t.session.is_none(), "session discarded on completion");
        let SurveyAction::ShowSummaryAndClear(survey) = t.action else {
            panic!("expected completion");
        };
        let answers: Vec<&str> = survey.answers.iter().map(|(_, a)| a.as_str()).collect();
        assert_eq!(answers, ["Si", "No", "Si", "No"]);
        let keys: Vec<QuestionKey> = survey.answers.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            keys,
            [
                QuestionKey::Zen,
                QuestionKey::TradeRepublic,
                QuestionKey::Bitsa,
                QuestionKey::Bbva,
            ]
        );
    }

    #[test]
    fn answers_are_not_validated() {
        let t = advance(None, &start());
        let t = advance(t.session, &answer(""));
        let session = t.session.unwrap();
        assert_eq!(session.answers[0].1, "");

        let t = advance(Some(session), &answer("definitely not a yes/no"));
        let session = t.session.unwrap();
        assert_eq!(session.answers[1].1, "definitely not a yes/no");
    }

    #[test]
    fn restart_mid_dialog_discards_answers() {
        let t = advance(None, &start());
        let t = advance(t.session, &answer("Si"));
        let t = advance(t.session, &answer("No"));
        let session = t.session.unwrap();
        assert_eq!(session.answers.len(), 2);

        let t = advance(Some(session), &start());
        let session = t.session.unwrap();
        assert!(session.answers.is_empty());
        assert_eq!(session.current_question, QuestionKey::Zen);
        assert_eq!(t.action, SurveyAction::ShowPrompt(QuestionKey::Zen));
    }

    #[test]
    fn message_without_session_is_ignored() {
        let t = advance(None, &answer("hello?"));
        assert!(t.session.is_none());
        assert_eq!(t.action, SurveyAction::Ignore);
    }

    #[test]
    fn current_question_strictly_advances() {
        let mut session = advance(None, &start()).session;
        let mut seen = vec![session.as_ref().unwrap().current_question];
        for _ in 0..3 {
            let t = advance(session.take(), &answer("Si"));
            if let Some(ref s) = t.session {
                seen.push(s.current_question);
            }
            session = t.session;
        }
        assert_eq!(
            seen,
            [
                QuestionKey::Zen,
                QuestionKey::TradeRepublic,
                QuestionKey::Bitsa,
                QuestionKey::Bbva,
            ]
        );
    }

    #[test]
    fn answers_never_contain_unreached_question() {
        let mut session = advance(None, &start()).session;
        while let Some(s) = session {
            for (key, _) in &s.answers {
                assert!((*key as usize) < s.current_question as usize);
            }
            session = advance(Some(s), &answer("Si")).session;
        }
    }
}
