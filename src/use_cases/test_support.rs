// Shared fixtures for deterministic engine tests: a manual clock, an
// in-memory registry, and scripted game collaborators.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::ports::{AnswerJudge, Clock, MoveSelector, RoomRegistry, SharedRoom};
use crate::domain::room::{HintTier, Mark, Phase, Room, SeatRole, TimerKind, BOARD_CELLS};
use crate::use_cases::{EngineSettings, SessionEngine};

// Manual time source so synchrony-window assertions are exact.
pub(crate) struct ManualClock(AtomicU64);

impl ManualClock {
    pub(crate) fn new(start_ms: u64) -> Self {
        Self(AtomicU64::new(start_ms))
    }

    pub(crate) fn advance(&self, ms: u64) {
        self.0.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

// In-memory code-to-room store mirroring the production adapter.
pub(crate) struct TestRegistry {
    rooms: Mutex<HashMap<String, SharedRoom>>,
    chat_capacity: usize,
}

impl TestRegistry {
    pub(crate) fn new(chat_capacity: usize) -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            chat_capacity,
        }
    }
}

#[async_trait]
impl RoomRegistry for TestRegistry {
    async fn get(&self, code: &str) -> Option<SharedRoom> {
        let rooms = self.rooms.lock().await;
        rooms.get(code).cloned()
    }

    async fn get_or_create(&self, code: &str) -> SharedRoom {
        let mut rooms = self.rooms.lock().await;
        rooms
            .entry(code.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(Room::new(code, self.chat_capacity))))
            .clone()
    }

    async fn replace(&self, code: &str) -> SharedRoom {
        let mut rooms = self.rooms.lock().await;
        let fresh = Arc::new(Mutex::new(Room::new(code, self.chat_capacity)));
        rooms.insert(code.to_string(), fresh.clone());
        fresh
    }
}

// Judge scripted with one expected solution per round.
pub(crate) struct ScriptedJudge {
    solutions: Vec<String>,
}

impl ScriptedJudge {
    pub(crate) fn new(solutions: Vec<&str>) -> Self {
        Self {
            solutions: solutions.into_iter().map(str::to_string).collect(),
        }
    }
}

impl AnswerJudge for ScriptedJudge {
    fn round_count(&self) -> u32 {
        self.solutions.len() as u32
    }

    fn is_correct(&self, round: u32, answer: &str) -> bool {
        self.solutions
            .get(round as usize)
            .is_some_and(|solution| solution == answer)
    }

    fn hint(&self, _round: u32, tier: HintTier) -> String {
        match tier {
            HintTier::Generic => "generic hint".to_string(),
            HintTier::Specific => "specific hint".to_string(),
            HintTier::StepByStep => "step-by-step hint".to_string(),
        }
    }
}

// Selector that plays a fixed sequence of cells, then stops.
pub(crate) struct ScriptedSelector {
    moves: std::sync::Mutex<VecDeque<usize>>,
}

impl ScriptedSelector {
    pub(crate) fn new(moves: Vec<usize>) -> Self {
        Self {
            moves: std::sync::Mutex::new(moves.into()),
        }
    }
}

impl MoveSelector for ScriptedSelector {
    fn choose_move(&self, _board: &[Option<Mark>; BOARD_CELLS]) -> Option<usize> {
        self.moves
            .lock()
            .expect("scripted moves mutex poisoned")
            .pop_front()
    }
}

// Selector that never produces a move, for degrade-to-draw paths.
pub(crate) struct NoMoveSelector;

impl MoveSelector for NoMoveSelector {
    fn choose_move(&self, _board: &[Option<Mark>; BOARD_CELLS]) -> Option<usize> {
        None
    }
}

fn build_engine(
    clock: Arc<ManualClock>,
    judge: Arc<dyn AnswerJudge>,
    selector: Arc<dyn MoveSelector>,
) -> Arc<SessionEngine> {
    let settings = EngineSettings::default();
    let registry = Arc::new(TestRegistry::new(settings.chat_capacity));
    SessionEngine::new(registry, clock, judge, selector, settings)
}

/// Engine with a single-round judge expecting the answer "blue".
pub(crate) fn engine() -> Arc<SessionEngine> {
    engine_with_clock().0
}

pub(crate) fn engine_with_clock() -> (Arc<SessionEngine>, Arc<ManualClock>) {
    engine_with(ScriptedJudge::new(vec!["blue"]))
}

pub(crate) fn engine_with(judge: ScriptedJudge) -> (Arc<SessionEngine>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(1_700_000_000_000));
    let engine = build_engine(clock.clone(), Arc::new(judge), Arc::new(NoMoveSelector));
    (engine, clock)
}

pub(crate) fn engine_with_selector(selector: impl MoveSelector + 'static) -> Arc<SessionEngine> {
    let clock = Arc::new(ManualClock::new(1_700_000_000_000));
    build_engine(
        clock,
        Arc::new(ScriptedJudge::new(vec!["blue"])),
        Arc::new(selector),
    )
}

/// Claims seat A for "t1" and seat B for "t2".
pub(crate) async fn seated_room(engine: &Arc<SessionEngine>, code: &str) {
    engine
        .claim_seat(code, SeatRole::A, "t1")
        .await
        .expect("expected claim A to succeed");
    engine
        .claim_seat(code, SeatRole::B, "t2")
        .await
        .expect("expected claim B to succeed");
}

/// Seats both players and opens the gate directly, skipping the
/// briefing wait so non-paused tests stay fast.
pub(crate) async fn active_room(engine: &Arc<SessionEngine>, code: &str) {
    seated_room(engine, code).await;
    for (role, token) in [(SeatRole::A, "t1"), (SeatRole::B, "t2")] {
        engine
            .set_ready(code, role, token, true)
            .await
            .expect("expected ready to succeed");
    }
    engine
        .request_start(code, SeatRole::A, "t1")
        .await
        .expect("expected start to succeed");

    let handle = engine
        .registry
        .get(code)
        .await
        .expect("expected room to exist");
    let mut room = handle.lock().await;
    room.cancel_timer(TimerKind::Countdown);
    room.clear_round_state();
    room.phase = Phase::Active;
}

/// Lets scheduled timers land under the paused test clock.
pub(crate) async fn settle_timers(duration: Duration) {
    tokio::time::sleep(duration).await;
}
