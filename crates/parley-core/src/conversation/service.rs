//! Conversation service orchestrating the user/assistant exchange.
//!
//! ConversationService validates input, serializes mutations of the
//! singleton conversation, asks the `AiResponder` for a reply, and persists
//! the user message together with the reply in one repository call.

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use parley_types::conversation::{Conversation, Exchange, Message};
use parley_types::error::ChatError;

use crate::conversation::repository::ConversationRepository;
use crate::llm::responder::AiResponder;

/// Error text returned for empty or whitespace-only utterances.
pub const EMPTY_MESSAGE: &str = "Message cannot be empty";

/// Owns the singleton conversation on behalf of callers.
///
/// Generic over `ConversationRepository` so parley-core never depends on
/// parley-infra.
pub struct ConversationService<R: ConversationRepository> {
    repo: R,
    responder: AiResponder,
    /// Held across an entire exchange or reset so mutations never interleave.
    write_lock: Mutex<()>,
}

impl<R: ConversationRepository> ConversationService<R> {
    pub fn new(repo: R, responder: AiResponder) -> Self {
        Self {
            repo,
            responder,
            write_lock: Mutex::new(()),
        }
    }

    /// Access the conversation repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Access the reply resolver.
    pub fn responder(&self) -> &AiResponder {
        &self.responder
    }

    /// Return the conversation, creating an empty one on first access.
    pub async fn get_or_create(&self) -> Result<Conversation, ChatError> {
        Ok(self.repo.get_or_create().await?)
    }

    /// Run one exchange: store `utterance` as a user message followed by
    /// the resolved assistant reply.
    ///
    /// Empty or whitespace-only input is rejected before anything is touched.
    /// Both messages are persisted together or not at all; a cancelled
    /// exchange persists nothing.
    pub async fn append_exchange(
        &self,
        utterance: &str,
        cancel: &CancellationToken,
    ) -> Result<Exchange, ChatError> {
        if utterance.trim().is_empty() {
            return Err(ChatError::Validation(EMPTY_MESSAGE.to_string()));
        }

        let _guard = self.write_lock.lock().await;
        let conversation = self.repo.get_or_create().await?;
        let user_message = Message::user(utterance);

        debug!(conversation_id = %conversation.id, "Resolving reply");
        let resolution = self.responder.resolve(utterance, cancel).await;
        if cancel.is_cancelled() {
            return Err(ChatError::Cancelled);
        }

        let assistant_message = Message::assistant(resolution.text);
        let conversation = self
            .repo
            .append_messages(
                &conversation.id,
                &[user_message, assistant_message.clone()],
            )
            .await?;

        info!(
            conversation_id = %conversation.id,
            tier = %resolution.tier,
            degraded = resolution.degraded,
            message_count = conversation.messages.len(),
            "Exchange persisted"
        );

        Ok(Exchange {
            conversation,
            last_message: assistant_message,
        })
    }

    /// Discard all history and start over with an empty conversation.
    pub async fn reset(&self) -> Result<(), ChatError> {
        let _guard = self.write_lock.lock().await;
        let conversation = self.repo.reset().await?;
        info!(conversation_id = %conversation.id, "Conversation reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::box_provider::BoxProviderClient;
    use crate::llm::provider::ProviderClient;
    use chrono::Utc;
    use parley_types::conversation::MessageRole;
    use parley_types::error::RepositoryError;
    use parley_types::llm::{LlmError, TierReply};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;
    use uuid::Uuid;

    // --- In-memory repository ---

    #[derive(Default)]
    struct InMemoryRepository {
        conversation: std::sync::Mutex<Option<Conversation>>,
        fail_writes: AtomicBool,
    }

    impl ConversationRepository for InMemoryRepository {
        async fn find(&self) -> Result<Option<Conversation>, RepositoryError> {
            Ok(self.conversation.lock().unwrap().clone())
        }

        async fn get_or_create(&self) -> Result<Conversation, RepositoryError> {
            let mut slot = self.conversation.lock().unwrap();
            Ok(slot.get_or_insert_with(Conversation::empty).clone())
        }

        async fn append_messages(
            &self,
            conversation_id: &Uuid,
            messages: &[Message],
        ) -> Result<Conversation, RepositoryError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(RepositoryError::Connection);
            }
            let mut slot = self.conversation.lock().unwrap();
            let conversation = slot
                .as_mut()
                .filter(|c| c.id == *conversation_id)
                .ok_or(RepositoryError::NotFound)?;
            conversation.messages.extend_from_slice(messages);
            conversation.updated_at = Utc::now();
            conversation.version += 1;
            Ok(conversation.clone())
        }

        async fn reset(&self) -> Result<Conversation, RepositoryError> {
            let fresh = Conversation::empty();
            *self.conversation.lock().unwrap() = Some(fresh.clone());
            Ok(fresh)
        }

        async fn message_count(&self) -> Result<u64, RepositoryError> {
            Ok(self
                .conversation
                .lock()
                .unwrap()
                .as_ref()
                .map(|c| c.messages.len() as u64)
                .unwrap_or(0))
        }
    }

    /// Echoes the prompt back after a short delay.
    struct EchoProvider;

    impl ProviderClient for EchoProvider {
        fn name(&self) -> &str {
            "echo"
        }

        async fn complete(&self, prompt: &str) -> Result<TierReply, LlmError> {
            tokio::time::sleep(Duration::from_millis(2)).await;
            Ok(TierReply::Content(format!("echo: {prompt}")))
        }
    }

    fn local_service() -> ConversationService<InMemoryRepository> {
        ConversationService::new(InMemoryRepository::default(), AiResponder::local_only())
    }

    // --- Tests ---

    #[tokio::test]
    async fn test_get_or_create_starts_empty() {
        let service = local_service();
        let conversation = service.get_or_create().await.unwrap();
        assert!(conversation.messages.is_empty());

        let again = service.get_or_create().await.unwrap();
        assert_eq!(conversation.id, again.id);
    }

    #[tokio::test]
    async fn test_empty_utterances_are_rejected_without_mutation() {
        let service = local_service();
        service.get_or_create().await.unwrap();

        for input in ["", "   ", "\n\t"] {
            let err = service
                .append_exchange(input, &CancellationToken::new())
                .await
                .unwrap_err();
            assert!(matches!(err, ChatError::Validation(ref m) if m == EMPTY_MESSAGE));
        }

        assert_eq!(service.repo().message_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_exchange_appends_user_then_assistant() {
        let service = local_service();

        let exchange = service
            .append_exchange("hi", &CancellationToken::new())
            .await
            .unwrap();

        let messages = &exchange.conversation.messages;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::User);
        assert_eq!(messages[0].content, "hi");
        assert_eq!(messages[1].role, MessageRole::Assistant);
        assert_eq!(exchange.last_message, messages[1]);
    }

    #[tokio::test]
    async fn test_scenario_local_fallback_then_reset() {
        let service = local_service();
        assert!(service.get_or_create().await.unwrap().messages.is_empty());

        let exchange = service
            .append_exchange("2+2?", &CancellationToken::new())
            .await
            .unwrap();
        assert!(exchange.last_message.content.contains("2+2?"));

        service.reset().await.unwrap();
        assert!(service.get_or_create().await.unwrap().messages.is_empty());
    }

    #[tokio::test]
    async fn test_persistence_failure_surfaces() {
        let service = local_service();
        service.repo().fail_writes.store(true, Ordering::SeqCst);

        let err = service
            .append_exchange("hello", &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ChatError::Persistence(RepositoryError::Connection)));
        assert_eq!(service.repo().message_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_exchange_persists_nothing() {
        let service = local_service();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = service.append_exchange("hello", &cancel).await.unwrap_err();

        assert!(matches!(err, ChatError::Cancelled));
        assert_eq!(service.repo().message_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_exchanges_keep_pairs_together() {
        let responder = AiResponder::new(
            BoxProviderClient::new(EchoProvider),
            BoxProviderClient::null("secondary"),
        );
        let service = Arc::new(ConversationService::new(
            InMemoryRepository::default(),
            responder,
        ));

        let mut handles = Vec::new();
        for i in 0..10 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                service
                    .append_exchange(&format!("msg {i}"), &CancellationToken::new())
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let conversation = service.get_or_create().await.unwrap();
        assert_eq!(conversation.messages.len(), 20);
        assert_eq!(conversation.version, 10);
        for pair in conversation.messages.chunks(2) {
            assert_eq!(pair[0].role, MessageRole::User);
            assert_eq!(pair[1].role, MessageRole::Assistant);
            assert_eq!(pair[1].content, format!("echo: {}", pair[0].content));
        }
    }
}
