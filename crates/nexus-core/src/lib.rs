//! Turn orchestration logic and trait definitions for the Nexus chat backend.
//!
//! This crate defines the "ports" (repository, object-store, and LLM
//! provider traits) that the infrastructure layer implements, plus the pure
//! orchestration logic built on them: prompt composition, attachment
//! resolution, model dispatch with failover, and the streaming turn engine.
//! It depends only on `nexus-types` -- never on `nexus-infra` or any
//! database/HTTP crate.

pub mod attachment;
pub mod chat;
pub mod llm;
pub mod prompt;
pub mod storage;
pub mod turn;
