//! ConversationRepository trait definition.
//!
//! The store holds at most one conversation. Mutations are exposed as
//! atomic operations (append, reset) rather than read/modify/write of the
//! whole document.

use parley_types::conversation::{Conversation, Message};
use parley_types::error::RepositoryError;
use uuid::Uuid;

/// Repository trait for the singleton conversation.
///
/// Implementations live in parley-infra (e.g., `SqliteConversationRepository`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait ConversationRepository: Send + Sync {
    /// Load the conversation with its messages in insertion order, if one exists.
    fn find(
        &self,
    ) -> impl std::future::Future<Output = Result<Option<Conversation>, RepositoryError>> + Send;

    /// Return the conversation, creating and persisting an empty one if absent.
    ///
    /// Must leave exactly one conversation behind no matter how many calls
    /// race each other.
    fn get_or_create(
        &self,
    ) -> impl std::future::Future<Output = Result<Conversation, RepositoryError>> + Send;

    /// Append `messages` in order and stamp `updated_at`, all or nothing.
    ///
    /// Returns the conversation as persisted after the append. Fails with
    /// `RepositoryError::NotFound` if the conversation no longer exists.
    fn append_messages(
        &self,
        conversation_id: &Uuid,
        messages: &[Message],
    ) -> impl std::future::Future<Output = Result<Conversation, RepositoryError>> + Send;

    /// Delete every conversation and persist a new empty one, all or nothing.
    fn reset(
        &self,
    ) -> impl std::future::Future<Output = Result<Conversation, RepositoryError>> + Send;

    /// Number of messages in the conversation (0 if none exists).
    fn message_count(
        &self,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
