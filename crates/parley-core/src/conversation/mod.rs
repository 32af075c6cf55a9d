//! Conversation persistence abstractions and the service built on them.
//!
//! `ConversationRepository` is implemented by the infrastructure layer;
//! `ConversationService` owns validation, locking and the exchange flow.

pub mod repository;
pub mod service;
