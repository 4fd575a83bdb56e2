// The room session engine: one parameterized state machine behind every
// mini-game room, with injected registry, clock, and game collaborators.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use tracing::debug;

use crate::domain::errors::SessionError;
use crate::domain::ports::{AnswerJudge, Clock, MoveSelector, RoomRegistry, SharedRoom};
use crate::domain::room::{Room, RoomSnapshot, SeatRole, TimerKind};

/// Tunable delays and bounds for the engine. Defaults match the protocol
/// contract; the server overrides them from the environment.
#[derive(Clone, Debug)]
pub struct EngineSettings {
    /// Briefing countdown before active play begins.
    pub countdown: Duration,
    /// Maximum gap between the two confirmation stamps that still counts
    /// as simultaneous.
    pub sync_tolerance_ms: u64,
    /// Suspense pause between entering sync_confirm and evaluating.
    pub reveal_delay: Duration,
    /// How long a retry notice is shown before play resumes.
    pub retry_delay: Duration,
    /// Delay before the autonomous opponent answers a duel move.
    pub opponent_delay: Duration,
    /// Pause on a cleared round before the next briefing starts.
    pub auto_advance_delay: Duration,
    pub chat_capacity: usize,
    pub chat_max_len: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            countdown: Duration::from_secs(5),
            sync_tolerance_ms: 10_000,
            reveal_delay: Duration::from_millis(1_500),
            retry_delay: Duration::from_secs(3),
            opponent_delay: Duration::from_secs(1),
            auto_advance_delay: Duration::from_secs(2),
            chat_capacity: 50,
            chat_max_len: 240,
        }
    }
}

/// The engine behind every room operation. Stateless apart from the timer
/// sequence; all mutable session state lives in the registry's rooms.
pub struct SessionEngine {
    pub(crate) registry: Arc<dyn RoomRegistry>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) judge: Arc<dyn AnswerJudge>,
    pub(crate) selector: Arc<dyn MoveSelector>,
    pub(crate) settings: EngineSettings,
    timer_seq: AtomicU64,
    // Handle to self for the spawned timer tasks.
    weak_self: Weak<SessionEngine>,
}

impl SessionEngine {
    pub fn new(
        registry: Arc<dyn RoomRegistry>,
        clock: Arc<dyn Clock>,
        judge: Arc<dyn AnswerJudge>,
        selector: Arc<dyn MoveSelector>,
        settings: EngineSettings,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak_self| Self {
            registry,
            clock,
            judge,
            selector,
            settings,
            timer_seq: AtomicU64::new(0),
            weak_self: weak_self.clone(),
        })
    }

    /// Returns the current snapshot, lazily creating the room.
    pub async fn room_snapshot(&self, code: &str) -> Result<RoomSnapshot, SessionError> {
        let handle = self.registry.get_or_create(code).await;
        let room = handle.lock().await;
        Ok(room.snapshot())
    }

    /// Substitutes a brand-new room under the same code. The only
    /// operation that discards in-room history. Outstanding timers of the
    /// old room die by generation mismatch.
    pub async fn reset_room(&self, code: &str) -> Result<RoomSnapshot, SessionError> {
        let handle = self.registry.replace(code).await;
        let room = handle.lock().await;
        debug!(code, "room reset");
        Ok(room.snapshot())
    }

    /// Looks up an existing room for a mutating operation. Never creates;
    /// a never-referenced code is the caller's signal to start over.
    pub(crate) async fn existing_room(&self, code: &str) -> Result<SharedRoom, SessionError> {
        self.registry
            .get(code)
            .await
            .ok_or(SessionError::RoomMissing)
    }

    /// Verifies that the token currently owns the seat.
    pub(crate) fn authorize(
        room: &Room,
        role: SeatRole,
        token: &str,
    ) -> Result<(), SessionError> {
        if token.is_empty() {
            return Err(SessionError::EmptyToken);
        }
        if room.seat(role).owned_by(token) {
            Ok(())
        } else {
            Err(SessionError::SeatNotClaimed)
        }
    }

    pub(crate) fn now_millis(&self) -> u64 {
        self.clock.now_millis()
    }

    /// Schedules a one-shot transition for the room, superseding any live
    /// timer of the same kind. Generations are process-wide unique, so a
    /// cancelled or superseded task can never act on a room that has
    /// changed shape since it was scheduled, not even across a reset.
    pub(crate) fn schedule(&self, room: &mut Room, kind: TimerKind, delay: Duration) {
        let Some(engine) = self.weak_self.upgrade() else {
            return;
        };
        let generation = self.timer_seq.fetch_add(1, Ordering::Relaxed) + 1;
        room.pending.insert(kind, generation);
        debug!(code = %room.code, ?kind, generation, ?delay, "timer scheduled");

        let code = room.code.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            engine.fire(&code, kind, generation).await;
        });
    }

    /// Timer entry point. Takes the room lock, re-checks that this firing
    /// is still the live generation for its kind, and only then applies
    /// the transition.
    async fn fire(&self, code: &str, kind: TimerKind, generation: u64) {
        let Some(handle) = self.registry.get(code).await else {
            return;
        };
        let mut room = handle.lock().await;
        if room.pending.get(&kind) != Some(&generation) {
            debug!(code, ?kind, generation, "stale timer ignored");
            return;
        }
        room.pending.remove(&kind);
        debug!(code, ?kind, "timer fired");

        match kind {
            TimerKind::Countdown => self.finish_countdown(&mut room),
            TimerKind::SyncEvaluate => self.evaluate_answers(&mut room),
            TimerKind::RetryWindow => self.finish_retry_window(&mut room),
            TimerKind::AutoAdvance => self.advance_round(&mut room),
            TimerKind::OpponentMove => self.play_opponent_move(&mut room),
        }
    }
}
