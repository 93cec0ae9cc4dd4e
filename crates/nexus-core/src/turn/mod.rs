//! The streaming chat-turn orchestrator.
//!
//! `dispatch` selects the model and builds the ordered attempt list,
//! `engine` runs the relay state machine that turns an attempt list into a
//! client event stream, and `enrich` covers the post-turn auxiliary calls
//! (suggestions, smart titles).

pub mod dispatch;
pub mod engine;
pub mod enrich;

use std::fmt;

/// Phases of a turn's relay channel.
///
/// `Done` and `Failed` are terminal: the engine emits nothing once either
/// is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    Idle,
    Dispatched,
    Streaming,
    Enriching,
    Done,
    Failed,
}

impl TurnPhase {
    /// Whether `next` is a legal successor of `self`.
    pub fn can_advance_to(self, next: TurnPhase) -> bool {
        use TurnPhase::*;
        matches!(
            (self, next),
            (Idle, Dispatched)
                | (Dispatched, Streaming)
                // A stream may complete without a single token.
                | (Dispatched, Enriching)
                | (Dispatched, Failed)
                | (Streaming, Enriching)
                | (Streaming, Failed)
                | (Enriching, Done)
        )
    }

    /// Advance to `next`, logging the transition. Illegal transitions are a
    /// programming error and panic in debug builds.
    pub fn advance(&mut self, next: TurnPhase) {
        debug_assert!(
            self.can_advance_to(next),
            "illegal turn phase transition: {self} -> {next}"
        );
        tracing::trace!(from = %self, to = %next, "turn phase transition");
        *self = next;
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, TurnPhase::Done | TurnPhase::Failed)
    }
}

impl fmt::Display for TurnPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TurnPhase::Idle => "idle",
            TurnPhase::Dispatched => "dispatched",
            TurnPhase::Streaming => "streaming",
            TurnPhase::Enriching => "enriching",
            TurnPhase::Done => "done",
            TurnPhase::Failed => "failed",
        };
        write!(f, "{s}")
    }
}
