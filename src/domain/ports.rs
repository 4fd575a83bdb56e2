use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::room::{HintTier, Mark, Room, BOARD_CELLS};

/// A room guarded by its own lock. Everything that touches one room,
/// request handlers and timer firings alike, serializes on this mutex.
pub type SharedRoom = Arc<Mutex<Room>>;

// Port for the concurrency-safe code-to-room store used by the engine.
#[async_trait]
pub trait RoomRegistry: Send + Sync {
    /// Returns the room for a code that has already been referenced.
    async fn get(&self, code: &str) -> Option<SharedRoom>;
    /// Returns the existing room or lazily creates a fresh one.
    async fn get_or_create(&self, code: &str) -> SharedRoom;
    /// Substitutes a brand-new room under the same code.
    async fn replace(&self, code: &str) -> SharedRoom;
}

// Port for retrieving the current time. Confirmation stamps use server
// time only, so client clock skew never enters the synchrony check.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> u64;
}

// Port for game-specific answer evaluation and hint content.
pub trait AnswerJudge: Send + Sync {
    /// Number of rounds the session runs before it is complete.
    fn round_count(&self) -> u32;
    /// Whether the agreed answer matches the expected solution.
    fn is_correct(&self, round: u32, answer: &str) -> bool;
    /// Hint text for the given round and escalation tier.
    fn hint(&self, round: u32, tier: HintTier) -> String;
}

// Port for the opaque opponent-move strategy of the duel variant.
pub trait MoveSelector: Send + Sync {
    /// Picks a cell for the opponent, or `None` when no move is available.
    fn choose_move(&self, board: &[Option<Mark>; BOARD_CELLS]) -> Option<usize>;
}
