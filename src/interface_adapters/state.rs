use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

use crate::domain::ports::{AnswerJudge, Clock, MoveSelector, RoomRegistry, SharedRoom};
use crate::domain::room::{HintTier, Mark, Room, BOARD_CELLS};
use crate::use_cases::SessionEngine;

// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SessionEngine>,
}

// In-memory code-to-room registry. Rooms live for the process lifetime;
// only an explicit reset substitutes a fresh value under a code.
pub struct InMemoryRoomRegistry {
    rooms: Mutex<HashMap<String, SharedRoom>>,
    chat_capacity: usize,
}

impl InMemoryRoomRegistry {
    pub fn new(chat_capacity: usize) -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            chat_capacity,
        }
    }
}

#[async_trait]
impl RoomRegistry for InMemoryRoomRegistry {
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

// System clock adapter used by the engine in production.
#[derive(Clone)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

// Judge backed by a configured list of expected solutions, one per
// round. Comparison is trimmed and case-insensitive.
pub struct SolutionListJudge {
    solutions: Vec<String>,
}

impl SolutionListJudge {
    pub fn new(solutions: Vec<String>) -> Self {
        Self { solutions }
    }
}

impl AnswerJudge for SolutionListJudge {
    fn round_count(&self) -> u32 {
        self.solutions.len() as u32
    }

    fn is_correct(&self, round: u32, answer: &str) -> bool {
        self.solutions
            .get(round as usize)
            .is_some_and(|solution| solution.trim().eq_ignore_ascii_case(answer.trim()))
    }

    fn hint(&self, round: u32, tier: HintTier) -> String {
        let solution = self
            .solutions
            .get(round as usize)
            .map(String::as_str)
            .unwrap_or_default();
        match tier {
            HintTier::Generic => "keep comparing your two screens before you lock in".to_string(),
            HintTier::Specific => {
                format!("the answer is {} characters long", solution.chars().count())
            }
            HintTier::StepByStep => format!(
                "enter \"{solution}\" on both screens, then confirm together"
            ),
        }
    }
}

// Opponent strategy preferring center, corners, then edges.
pub struct PreferredCellSelector;

const CELL_PREFERENCE: [usize; BOARD_CELLS] = [4, 0, 2, 6, 8, 1, 3, 5, 7];

impl MoveSelector for PreferredCellSelector {
    fn choose_move(&self, board: &[Option<Mark>; BOARD_CELLS]) -> Option<usize> {
        CELL_PREFERENCE
            .into_iter()
            .find(|&cell| board[cell].is_none())
    }
}
