use serde::Deserialize;

use crate::domain::room::SeatRole;

// Request payload for claiming a seat.
#[derive(Debug, Deserialize)]
pub struct ClaimRequest {
    pub role: SeatRole,
    pub token: String,
}

// Request payload for releasing one seat or every seat of a token.
#[derive(Debug, Deserialize)]
pub struct ReleaseRequest {
    #[serde(default)]
    pub role: Option<SeatRole>,
    pub token: String,
}

// Request payload for setting a seat's readiness flag.
#[derive(Debug, Deserialize)]
pub struct ReadyRequest {
    pub role: SeatRole,
    pub token: String,
    pub ready: bool,
}

// Request payload for operations that only name a seat.
#[derive(Debug, Deserialize)]
pub struct SeatRequest {
    pub role: SeatRole,
    pub token: String,
}

// Request payload for selecting a candidate answer.
#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub role: SeatRole,
    pub token: String,
    pub answer: String,
}

// Request payload for posting a chat line.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub role: SeatRole,
    pub token: String,
    pub text: String,
}

// Request payload for playing a duel move.
#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub role: SeatRole,
    pub token: String,
    pub cell: usize,
}

// Simple error envelope for JSON responses.
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    pub message: String,
}
