// Readiness consensus and the cancellable start countdown.

use tracing::info;

use crate::domain::errors::SessionError;
use crate::domain::room::{Phase, Room, RoomSnapshot, SeatRole, TimerKind};
use crate::use_cases::SessionEngine;

impl SessionEngine {
    /// Sets the seat's readiness flag. Revoking readiness while the
    /// countdown runs cancels it and drops the room back to the lobby.
    pub async fn set_ready(
        &self,
        code: &str,
        role: SeatRole,
        token: &str,
        ready: bool,
    ) -> Result<RoomSnapshot, SessionError> {
        let handle = self.existing_room(code).await?;
        let mut room = handle.lock().await;
        Self::authorize(&room, role, token)?;

        room.seat_mut(role).ready = ready;
        if !ready && room.cancel_timer(TimerKind::Countdown) {
            room.phase = Phase::Lobby;
            info!(code = %room.code, %role, "countdown cancelled by readiness revocation");
        }

        Ok(room.snapshot())
    }

    /// Starts the briefing countdown once both seats are occupied and
    /// ready. Idempotent while the countdown runs and once the room has
    /// moved past the lobby, so duplicated polls are harmless.
    pub async fn request_start(
        &self,
        code: &str,
        role: SeatRole,
        token: &str,
    ) -> Result<RoomSnapshot, SessionError> {
        let handle = self.existing_room(code).await?;
        let mut room = handle.lock().await;
        Self::authorize(&room, role, token)?;

        if room.timer_pending(TimerKind::Countdown) || room.phase != Phase::Lobby {
            return Ok(room.snapshot());
        }

        let consensus = room
            .seats
            .iter()
            .all(|seat| seat.occupant_token.is_some() && seat.ready);
        if !consensus {
            return Err(SessionError::NotReady);
        }

        room.phase = Phase::Briefing;
        let countdown = self.settings.countdown;
        self.schedule(&mut room, TimerKind::Countdown, countdown);
        info!(code = %room.code, "start countdown running");

        Ok(room.snapshot())
    }

    /// Countdown completion: the gate opens and active play begins.
    pub(crate) fn finish_countdown(&self, room: &mut Room) {
        room.clear_round_state();
        room.phase = Phase::Active;
        info!(code = %room.code, round = room.round, "room active");
    }
}
