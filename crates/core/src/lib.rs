//! # StudyLab Core
//!
//! Domain types, traits, and error definitions for the StudyLab course
//! chatbot engine. This crate has **zero framework dependencies** — it
//! defines the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every collaborator is defined as a trait here. Implementations live in
//! their respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod document;
pub mod error;
pub mod history;
pub mod persona;
pub mod provider;
pub mod turn;

// Re-export key types at crate root for ergonomics
pub use document::{DocumentStore, SourceDocument};
pub use error::{Error, Result};
pub use history::HistoryStore;
pub use persona::{AdviceScope, Persona, Tone};
pub use provider::{CompletionRequest, CompletionResponse, ModelProvider, Usage};
pub use turn::{ConversationId, Role, Turn};
