// Domain entities for one shared two-seat game room.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::fmt;

/// The two fixed player slots of a room.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatRole {
    A,
    B,
}

impl SeatRole {
    /// Returns the opposite seat role.
    pub fn other(self) -> SeatRole {
        match self {
            SeatRole::A => SeatRole::B,
            SeatRole::B => SeatRole::A,
        }
    }
}

impl fmt::Display for SeatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeatRole::A => write!(f, "A"),
            SeatRole::B => write!(f, "B"),
        }
    }
}

/// Coarse progress state of a room session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Lobby,
    Briefing,
    Active,
    SyncConfirm,
    Retry,
    Success,
    Summary,
}

// One player slot. All fields return to defaults when the seat is vacated.
#[derive(Clone, Debug)]
pub struct Seat {
    pub role: SeatRole,
    pub occupant_token: Option<String>,
    pub ready: bool,
    pub confirmed_at_ms: Option<u64>,
    pub selected_answer: Option<String>,
    pub exit_requested: bool,
}

impl Seat {
    fn new(role: SeatRole) -> Self {
        Self {
            role,
            occupant_token: None,
            ready: false,
            confirmed_at_ms: None,
            selected_answer: None,
            exit_requested: false,
        }
    }

    /// True when the given token currently owns this seat.
    pub fn owned_by(&self, token: &str) -> bool {
        self.occupant_token.as_deref() == Some(token)
    }

    /// Hands the seat to a new occupant, resetting all per-occupant state.
    pub fn occupy(&mut self, token: String) {
        *self = Seat::new(self.role);
        self.occupant_token = Some(token);
    }

    /// Returns the seat to its vacant default state.
    pub fn vacate(&mut self) {
        *self = Seat::new(self.role);
    }
}

/// Who wrote a chat line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    A,
    B,
    System,
}

impl From<SeatRole> for Speaker {
    fn from(role: SeatRole) -> Self {
        match role {
            SeatRole::A => Speaker::A,
            SeatRole::B => Speaker::B,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ChatMessage {
    pub speaker: Speaker,
    pub text: String,
    pub at_ms: u64,
}

// Fixed-capacity message history; the oldest line is evicted on overflow.
#[derive(Clone, Debug)]
pub struct ChatLog {
    capacity: usize,
    messages: VecDeque<ChatMessage>,
}

impl ChatLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            messages: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, message: ChatMessage) {
        if self.messages.len() == self.capacity {
            self.messages.pop_front();
        }
        self.messages.push_back(message);
    }

    pub fn messages(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// One-shot scheduled transitions. At most one live timer per kind per room.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerKind {
    Countdown,
    SyncEvaluate,
    RetryWindow,
    OpponentMove,
    AutoAdvance,
}

/// Escalating assistance shown on repeated wrong answers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HintTier {
    Generic,
    Specific,
    StepByStep,
}

impl HintTier {
    /// Maps the wrong-answer counter to a tier: 1 generic, 2 specific,
    /// 3 and above step-by-step.
    pub fn for_counter(counter: u32) -> HintTier {
        match counter {
            0 | 1 => HintTier::Generic,
            2 => HintTier::Specific,
            _ => HintTier::StepByStep,
        }
    }
}

/// Why the last evaluation sent the room back to retry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryReason {
    Disagreement,
    WrongAnswer,
}

#[derive(Clone, Debug, Serialize)]
pub struct RetryNotice {
    pub reason: RetryReason,
    pub hint_tier: Option<HintTier>,
    pub hint: Option<String>,
}

/// Board mark for the duel variant. The two human seats share one side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mark {
    Players,
    Opponent,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnOwner {
    Players,
    Opponent,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DuelOutcome {
    PlayersWin,
    OpponentWins,
    Draw,
}

pub const BOARD_CELLS: usize = 9;

// Shared 3x3 board played against an autonomous opponent.
#[derive(Clone, Debug)]
pub struct DuelState {
    pub board: [Option<Mark>; BOARD_CELLS],
    pub turn: TurnOwner,
    pub outcome: Option<DuelOutcome>,
}

impl DuelState {
    pub fn new() -> Self {
        Self {
            board: [None; BOARD_CELLS],
            turn: TurnOwner::Players,
            outcome: None,
        }
    }

    /// Returns the winning mark, if any line is complete.
    pub fn winner(&self) -> Option<Mark> {
        const LINES: [[usize; 3]; 8] = [
            [0, 1, 2],
            [3, 4, 5],
            [6, 7, 8],
            [0, 3, 6],
            [1, 4, 7],
            [2, 5, 8],
            [0, 4, 8],
            [2, 4, 6],
        ];
        for line in LINES {
            if let Some(mark) = self.board[line[0]] {
                if self.board[line[1]] == Some(mark) && self.board[line[2]] == Some(mark) {
                    return Some(mark);
                }
            }
        }
        None
    }

    pub fn is_full(&self) -> bool {
        self.board.iter().all(|cell| cell.is_some())
    }
}

impl Default for DuelState {
    fn default() -> Self {
        Self::new()
    }
}

/// One mutable shared session, addressed by its code.
#[derive(Clone, Debug)]
pub struct Room {
    pub code: String,
    pub phase: Phase,
    pub round: u32,
    pub seats: [Seat; 2],
    pub hint_counter: u32,
    pub retry: Option<RetryNotice>,
    pub chat: ChatLog,
    // Live timer generations, one slot per kind. A scheduled task only
    // applies its transition while its generation is still recorded here.
    pub pending: HashMap<TimerKind, u64>,
    pub duel: Option<DuelState>,
}

impl Room {
    pub fn new(code: impl Into<String>, chat_capacity: usize) -> Self {
        Self {
            code: code.into(),
            phase: Phase::Lobby,
            round: 0,
            seats: [Seat::new(SeatRole::A), Seat::new(SeatRole::B)],
            hint_counter: 0,
            retry: None,
            chat: ChatLog::new(chat_capacity),
            pending: HashMap::new(),
            duel: None,
        }
    }

    pub fn seat(&self, role: SeatRole) -> &Seat {
        match role {
            SeatRole::A => &self.seats[0],
            SeatRole::B => &self.seats[1],
        }
    }

    pub fn seat_mut(&mut self, role: SeatRole) -> &mut Seat {
        match role {
            SeatRole::A => &mut self.seats[0],
            SeatRole::B => &mut self.seats[1],
        }
    }

    pub fn occupant_count(&self) -> u8 {
        self.seats
            .iter()
            .filter(|seat| seat.occupant_token.is_some())
            .count() as u8
    }

    /// Both seats have asked to end the session.
    pub fn terminate_authorized(&self) -> bool {
        self.seats.iter().all(|seat| seat.exit_requested)
    }

    /// Drops the live generation for one timer kind. Returns whether a
    /// timer was actually pending.
    pub fn cancel_timer(&mut self, kind: TimerKind) -> bool {
        self.pending.remove(&kind).is_some()
    }

    pub fn cancel_all_timers(&mut self) {
        self.pending.clear();
    }

    pub fn timer_pending(&self, kind: TimerKind) -> bool {
        self.pending.contains_key(&kind)
    }

    /// Clears both seats' confirmation stamps.
    pub fn clear_confirmations(&mut self) {
        for seat in &mut self.seats {
            seat.confirmed_at_ms = None;
        }
    }

    /// Clears per-round seat state when a round begins.
    pub fn clear_round_state(&mut self) {
        for seat in &mut self.seats {
            seat.confirmed_at_ms = None;
            seat.selected_answer = None;
        }
        self.retry = None;
    }

    pub fn push_system_message(&mut self, text: impl Into<String>, at_ms: u64) {
        self.chat.push(ChatMessage {
            speaker: Speaker::System,
            text: text.into(),
            at_ms,
        });
    }

    /// Builds the full self-consistent view returned by every operation.
    /// Occupant tokens and answer contents stay server-side; the snapshot
    /// exposes occupancy and selection as booleans only.
    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            code: self.code.clone(),
            phase: self.phase,
            round: self.round,
            seats: self.seats.iter().map(SeatView::from).collect(),
            occupant_count: self.occupant_count(),
            terminate_authorized: self.terminate_authorized(),
            retry: self.retry.clone(),
            chat: self.chat.messages().cloned().collect(),
            duel: self.duel.as_ref().map(DuelView::from),
        }
    }
}

/// Per-seat slice of the snapshot.
#[derive(Clone, Debug, Serialize)]
pub struct SeatView {
    pub role: SeatRole,
    pub occupied: bool,
    pub ready: bool,
    pub confirmed: bool,
    pub answer_selected: bool,
    pub exit_requested: bool,
}

impl From<&Seat> for SeatView {
    fn from(seat: &Seat) -> Self {
        Self {
            role: seat.role,
            occupied: seat.occupant_token.is_some(),
            ready: seat.ready,
            confirmed: seat.confirmed_at_ms.is_some(),
            answer_selected: seat.selected_answer.is_some(),
            exit_requested: seat.exit_requested,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct DuelView {
    pub board: Vec<Option<Mark>>,
    pub turn: TurnOwner,
    pub outcome: Option<DuelOutcome>,
}

impl From<&DuelState> for DuelView {
    fn from(duel: &DuelState) -> Self {
        Self {
            board: duel.board.to_vec(),
            turn: duel.turn,
            outcome: duel.outcome,
        }
    }
}

/// Complete room state as returned to polling clients.
#[derive(Clone, Debug, Serialize)]
pub struct RoomSnapshot {
    pub code: String,
    pub phase: Phase,
    pub round: u32,
    pub seats: Vec<SeatView>,
    pub occupant_count: u8,
    pub terminate_authorized: bool,
    pub retry: Option<RetryNotice>,
    pub chat: Vec<ChatMessage>,
    pub duel: Option<DuelView>,
}
