// Mutual-consent exit negotiation. The engine marks the room as
// authorized to terminate; actually tearing it down is the caller's job.

use tracing::info;

use crate::domain::errors::SessionError;
use crate::domain::room::{Phase, RoomSnapshot, SeatRole};
use crate::use_cases::SessionEngine;

impl SessionEngine {
    /// Flags the seat's wish to end the session. Always interrupts
    /// gameplay: every pending timer is cancelled and the phase falls
    /// back to a stable resting point. Idempotent per seat.
    pub async fn request_exit(
        &self,
        code: &str,
        role: SeatRole,
        token: &str,
    ) -> Result<RoomSnapshot, SessionError> {
        let handle = self.existing_room(code).await?;
        let mut room = handle.lock().await;
        Self::authorize(&room, role, token)?;

        if room.seat(role).exit_requested {
            return Ok(room.snapshot());
        }

        room.seat_mut(role).exit_requested = true;
        room.cancel_all_timers();
        match room.phase {
            Phase::Briefing => room.phase = Phase::Lobby,
            Phase::SyncConfirm | Phase::Retry => {
                room.clear_confirmations();
                room.phase = Phase::Active;
            }
            _ => {}
        }

        let now = self.now_millis();
        room.push_system_message(format!("seat {role} requested to end the session"), now);
        if room.terminate_authorized() {
            room.push_system_message("both seats agreed to end the session", now);
            info!(code = %room.code, "session end authorized");
        }

        Ok(room.snapshot())
    }

    /// Withdraws the seat's exit request. Cancelled timers stay
    /// cancelled. Idempotent per seat.
    pub async fn cancel_exit(
        &self,
        code: &str,
        role: SeatRole,
        token: &str,
    ) -> Result<RoomSnapshot, SessionError> {
        let handle = self.existing_room(code).await?;
        let mut room = handle.lock().await;
        Self::authorize(&room, role, token)?;

        if !room.seat(role).exit_requested {
            return Ok(room.snapshot());
        }

        room.seat_mut(role).exit_requested = false;
        let now = self.now_millis();
        room.push_system_message(format!("seat {role} withdrew the end request"), now);

        Ok(room.snapshot())
    }
}
