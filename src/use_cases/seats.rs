// Seat claiming and release. A token holds at most one seat per room,
// and any seat churn invalidates an in-flight countdown.

use tracing::info;

use crate::domain::errors::SessionError;
use crate::domain::room::{Phase, RoomSnapshot, SeatRole, TimerKind};
use crate::use_cases::SessionEngine;

impl SessionEngine {
    /// Claims a seat for the token, lazily creating the room. Fails with
    /// a conflict when a different token holds the seat; re-claiming an
    /// already-owned seat is a no-op.
    pub async fn claim_seat(
        &self,
        code: &str,
        role: SeatRole,
        token: &str,
    ) -> Result<RoomSnapshot, SessionError> {
        if token.is_empty() {
            return Err(SessionError::EmptyToken);
        }

        let handle = self.registry.get_or_create(code).await;
        let mut room = handle.lock().await;

        if room.seat(role).owned_by(token) {
            return Ok(room.snapshot());
        }
        if room.seat(role).occupant_token.is_some() {
            return Err(SessionError::SeatTaken);
        }

        let now = self.now_millis();

        // One seat per token: switching seats vacates the old one first.
        let other = role.other();
        if room.seat(other).owned_by(token) {
            room.seat_mut(other).vacate();
            room.push_system_message(format!("seat {other} left"), now);
        }

        room.seat_mut(role).occupy(token.to_string());
        room.push_system_message(format!("seat {role} joined"), now);

        // A claim invalidates an in-flight start.
        if room.cancel_timer(TimerKind::Countdown) {
            room.phase = Phase::Lobby;
        }

        info!(code = %room.code, %role, "seat claimed");
        Ok(room.snapshot())
    }

    /// Vacates the seat(s) owned by the token: a specific role when given,
    /// otherwise every seat the token holds. Cancels all pending timers
    /// and falls back to the lobby; history stays untouched.
    pub async fn release_seat(
        &self,
        code: &str,
        role: Option<SeatRole>,
        token: &str,
    ) -> Result<RoomSnapshot, SessionError> {
        if token.is_empty() {
            return Err(SessionError::EmptyToken);
        }

        let handle = self.existing_room(code).await?;
        let mut room = handle.lock().await;

        let candidates = match role {
            Some(role) => vec![role],
            None => vec![SeatRole::A, SeatRole::B],
        };
        let vacated: Vec<SeatRole> = candidates
            .into_iter()
            .filter(|&role| room.seat(role).owned_by(token))
            .collect();

        if vacated.is_empty() {
            return Ok(room.snapshot());
        }

        let now = self.now_millis();
        for role in &vacated {
            room.seat_mut(*role).vacate();
            room.push_system_message(format!("seat {role} left"), now);
        }

        // A half-empty room cannot carry a start, a pending evaluation,
        // or an opponent turn; consensus restarts from the lobby.
        room.cancel_all_timers();
        room.clear_confirmations();
        room.phase = Phase::Lobby;

        info!(code = %room.code, ?vacated, "seat(s) released");
        Ok(room.snapshot())
    }
}
