// The synchronized confirmation engine: two independently-polling seats
// must submit their answers close enough together to count as one moment.
// Confirmation stamps come from the server clock only.

use tracing::info;

use crate::domain::errors::SessionError;
use crate::domain::room::{
    HintTier, Phase, RetryNotice, RetryReason, Room, RoomSnapshot, SeatRole, TimerKind,
};
use crate::use_cases::SessionEngine;

impl SessionEngine {
    /// Stores the seat's candidate answer. No phase change; the candidate
    /// can be replaced freely until the seat confirms.
    pub async fn select_answer(
        &self,
        code: &str,
        role: SeatRole,
        token: &str,
        answer: &str,
    ) -> Result<RoomSnapshot, SessionError> {
        let handle = self.existing_room(code).await?;
        let mut room = handle.lock().await;
        Self::authorize(&room, role, token)?;

        if room.phase != Phase::Active {
            return Err(SessionError::PhaseForbids { phase: room.phase });
        }
        if answer.trim().is_empty() {
            return Err(SessionError::EmptyAnswer);
        }
        if room.seat(role).confirmed_at_ms.is_some() {
            return Err(SessionError::AlreadyConfirmed);
        }

        room.seat_mut(role).selected_answer = Some(answer.trim().to_string());
        Ok(room.snapshot())
    }

    /// Stamps the seat's confirmation with server-local time. When both
    /// seats have stamps, either the synchrony window holds and the
    /// reveal pause starts, or both stamps are discarded as not
    /// simultaneous enough. Idempotent per seat.
    pub async fn confirm_answer(
        &self,
        code: &str,
        role: SeatRole,
        token: &str,
    ) -> Result<RoomSnapshot, SessionError> {
        let handle = self.existing_room(code).await?;
        let mut room = handle.lock().await;
        Self::authorize(&room, role, token)?;

        // A retransmitted confirm is a no-op even after the room has
        // already moved into the reveal pause.
        if room.seat(role).confirmed_at_ms.is_some() {
            return Ok(room.snapshot());
        }
        if room.phase != Phase::Active {
            return Err(SessionError::PhaseForbids { phase: room.phase });
        }
        if room.seat(role).selected_answer.is_none() {
            return Err(SessionError::NoAnswerSelected);
        }

        let now = self.now_millis();
        room.seat_mut(role).confirmed_at_ms = Some(now);

        let Some(partner_at) = room.seat(role.other()).confirmed_at_ms else {
            return Ok(room.snapshot());
        };

        let delta = now.abs_diff(partner_at);
        if delta <= self.settings.sync_tolerance_ms {
            room.phase = Phase::SyncConfirm;
            room.retry = None;
            let delay = self.settings.reveal_delay;
            self.schedule(&mut room, TimerKind::SyncEvaluate, delay);
            info!(code = %room.code, delta_ms = delta, "confirmations in sync");
        } else {
            // Not simultaneous enough; not an error. Both seats go again.
            room.clear_confirmations();
            info!(code = %room.code, delta_ms = delta, "confirmations out of sync");
        }

        Ok(room.snapshot())
    }

    /// Reveal-pause completion: compare the answers to each other first,
    /// then to the expected solution.
    pub(crate) fn evaluate_answers(&self, room: &mut Room) {
        let answer_a = room.seat(SeatRole::A).selected_answer.clone();
        let answer_b = room.seat(SeatRole::B).selected_answer.clone();
        let (Some(answer_a), Some(answer_b)) = (answer_a, answer_b) else {
            // A seat lost its candidate under us; resume play safely.
            room.clear_confirmations();
            room.phase = Phase::Active;
            return;
        };

        if answer_a != answer_b {
            self.enter_retry(room, RetryReason::Disagreement);
            return;
        }
        if !self.judge.is_correct(room.round, &answer_a) {
            room.hint_counter += 1;
            self.enter_retry(room, RetryReason::WrongAnswer);
            return;
        }

        room.phase = Phase::Success;
        room.clear_confirmations();
        info!(code = %room.code, round = room.round, "round cleared");
        if room.round + 1 < self.judge.round_count() {
            let delay = self.settings.auto_advance_delay;
            self.schedule(room, TimerKind::AutoAdvance, delay);
        }
    }

    fn enter_retry(&self, room: &mut Room, reason: RetryReason) {
        let hint = match reason {
            RetryReason::Disagreement => None,
            RetryReason::WrongAnswer => {
                let tier = HintTier::for_counter(room.hint_counter);
                Some((tier, self.judge.hint(room.round, tier)))
            }
        };
        room.retry = Some(RetryNotice {
            reason,
            hint_tier: hint.as_ref().map(|(tier, _)| *tier),
            hint: hint.map(|(_, text)| text),
        });
        room.clear_confirmations();
        room.phase = Phase::Retry;
        let delay = self.settings.retry_delay;
        self.schedule(room, TimerKind::RetryWindow, delay);
        info!(code = %room.code, ?reason, hints = room.hint_counter, "retry");
    }

    /// Retry-window completion: play resumes with the notice still shown.
    pub(crate) fn finish_retry_window(&self, room: &mut Room) {
        room.phase = Phase::Active;
    }

    /// Auto-advance completion: per-round state resets and the next
    /// briefing countdown begins.
    pub(crate) fn advance_round(&self, room: &mut Room) {
        room.round += 1;
        room.hint_counter = 0;
        room.clear_round_state();
        room.phase = Phase::Briefing;
        let countdown = self.settings.countdown;
        self.schedule(room, TimerKind::Countdown, countdown);
        info!(code = %room.code, round = room.round, "next round briefing");
    }
}
