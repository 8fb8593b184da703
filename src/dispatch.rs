//! Dispatch router — drives one inbound event through the state machine and
//! performs the outbound side effects.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::DispatchError;
use crate::gateway::{Keyboard, MessagingGateway};
use crate::survey::machine::{advance, CompletedSurvey, SurveyAction, TurnInput};
use crate::survey::{SessionStore, UserKey};

/// Closing acknowledgment sent after the final answer, before the summary.
const CLOSING_TEXT: &str =
    "Grazie! La domanda è stata elaborata. Il nostro responsabile vi contatterà al più presto 👌";

/// One decoded inbound message event.
#[derive(Debug, Clone)]
pub struct IncomingEvent {
    pub user: UserKey,
    /// Raw message text, stored verbatim as the answer.
    pub text: String,
    /// Gateway id of the inbound message itself.
    pub message_id: i64,
    /// Whether this message is the start trigger.
    pub is_start: bool,
    /// Display name used to attribute the summary.
    pub full_name: String,
}

/// Routes decoded events: session lookup, state machine, prompt cleanup,
/// outbound sends, session persistence.
pub struct DispatchRouter {
    store: Arc<SessionStore>,
    gateway: Arc<dyn MessagingGateway>,
    cleanup_enabled: bool,
}

impl DispatchRouter {
    pub fn new(
        store: Arc<SessionStore>,
        gateway: Arc<dyn MessagingGateway>,
        cleanup_enabled: bool,
    ) -> Self {
        Self {
            store,
            gateway,
            cleanup_enabled,
        }
    }

    /// Handle one inbound event.
    ///
    /// Gateway send failures are returned as non-fatal errors after session
    /// state has already been updated; a lost prompt just means the user
    /// sees no next question until they message again.
    pub async fn handle_incoming(&self, event: IncomingEvent) -> Result<(), DispatchError> {
        let existing = self.store.get(event.user).await;
        let stale_ids = existing
            .as_ref()
            .map(|s| s.pending_prompt_ids.clone())
            .unwrap_or_default();

        let input = TurnInput {
            is_start: event.is_start,
            text: &event.text,
        };
        let transition = advance(existing, &input);

        match transition.action {
            SurveyAction::Ignore => {
                debug!(
                    user_id = event.user.user_id,
                    "Message without active session ignored"
                );
                Ok(())
            }

            SurveyAction::ShowPrompt(question) => {
                self.clear_stale_prompts(event.user.chat_id, &stale_ids).await;

                let mut session = transition
                    .session
                    .expect("a prompt action always carries a session");

                let sent = self
                    .gateway
                    .send_message(event.user.chat_id, question.spec().prompt, Keyboard::YesNo)
                    .await;

                // The triggering message and (when sent) the new prompt are
                // the deletion candidates for the next turn.
                session.pending_prompt_ids = match &sent {
                    Ok(prompt_id) => vec![*prompt_id, event.message_id],
                    Err(_) => vec![event.message_id],
                };
                self.store.put(event.user, session).await;

                info!(
                    user_id = event.user.user_id,
                    question = %question,
                    "Prompt turn handled"
                );
                sent.map(|_| ()).map_err(DispatchError::from)
            }

            SurveyAction::ShowSummaryAndClear(survey) => {
                self.clear_stale_prompts(event.user.chat_id, &stale_ids).await;

                let closing = self
                    .gateway
                    .send_message(event.user.chat_id, CLOSING_TEXT, Keyboard::Remove)
                    .await;
                let summary = self
                    .gateway
                    .send_message(
                        event.user.chat_id,
                        &summary_text(&event.full_name, &survey),
                        Keyboard::None,
                    )
                    .await;

                // The dialog is over either way.
                self.store.clear(event.user).await;

                info!(
                    user_id = event.user.user_id,
                    answers = survey.answers.len(),
                    "Survey completed"
                );
                closing?;
                summary?;
                Ok(())
            }
        }
    }

    /// Best-effort removal of the previous prompt and reply messages.
    ///
    /// Deletion failures are expected (message already gone, too old,
    /// missing permission) and are swallowed, never propagated.
    async fn clear_stale_prompts(&self, chat_id: i64, stale_ids: &[i64]) {
        if !self.cleanup_enabled {
            return;
        }
        for &message_id in stale_ids {
            if let Err(e) = self.gateway.delete_message(chat_id, message_id).await {
                debug!(chat_id, message_id, error = %e, "Stale prompt deletion failed");
            }
        }
    }
}

/// Format the final summary, answers in fixed question order.
fn summary_text(full_name: &str, survey: &CompletedSurvey) -> String {
    let mut text = format!("📋 Elenco delle registrazioni da {full_name}:");
    for (key, answer) in &survey.answers {
        text.push_str(&format!("\n {}: {}", key.spec().label, answer));
    }
    text
}
