//! Shared domain types for the Nexus chat backend.
//!
//! This crate contains the types used across the platform: conversations,
//! messages, training instructions, LLM request/response shapes, the
//! client-facing turn event protocol, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod attachment;
pub mod chat;
pub mod config;
pub mod error;
pub mod event;
pub mod llm;
