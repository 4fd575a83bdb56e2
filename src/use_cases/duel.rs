// Turn scheduler for games played against an autonomous opponent. The
// two seats share one side of a 3x3 board; after their move lands, the
// opponent's reply is a delayed timer driving the move-selection port.

use tracing::{info, warn};

use crate::domain::errors::SessionError;
use crate::domain::room::{
    DuelOutcome, DuelState, Mark, Phase, Room, RoomSnapshot, SeatRole, TimerKind, TurnOwner,
    BOARD_CELLS,
};
use crate::use_cases::SessionEngine;

impl SessionEngine {
    /// Plays a player move into the shared board, lazily creating the
    /// duel on first use. Out-of-turn and occupied-cell moves conflict.
    pub async fn play_move(
        &self,
        code: &str,
        role: SeatRole,
        token: &str,
        cell: usize,
    ) -> Result<RoomSnapshot, SessionError> {
        let handle = self.existing_room(code).await?;
        let mut room = handle.lock().await;
        Self::authorize(&room, role, token)?;

        if room.phase != Phase::Active {
            return Err(SessionError::PhaseForbids { phase: room.phase });
        }
        if cell >= BOARD_CELLS {
            return Err(SessionError::CellOutOfRange);
        }

        let duel = room.duel.get_or_insert_with(DuelState::new);
        if duel.turn != TurnOwner::Players {
            return Err(SessionError::OutOfTurn);
        }
        if duel.board[cell].is_some() {
            return Err(SessionError::CellOccupied);
        }

        duel.board[cell] = Some(Mark::Players);
        if Self::settle_if_terminal(&mut room) {
            return Ok(room.snapshot());
        }

        if let Some(duel) = room.duel.as_mut() {
            duel.turn = TurnOwner::Opponent;
        }
        let delay = self.settings.opponent_delay;
        self.schedule(&mut room, TimerKind::OpponentMove, delay);
        info!(code = %room.code, cell, "player move applied");

        Ok(room.snapshot())
    }

    /// Opponent-move timer completion. A missing or invalid selection
    /// degrades the duel to a draw; a timer firing must never crash the
    /// room.
    pub(crate) fn play_opponent_move(&self, room: &mut Room) {
        let Some(duel) = room.duel.as_mut() else {
            return;
        };
        if duel.turn != TurnOwner::Opponent || duel.outcome.is_some() {
            return;
        }

        let choice = self
            .selector
            .choose_move(&duel.board)
            .filter(|&cell| cell < BOARD_CELLS && duel.board[cell].is_none());
        let Some(cell) = choice else {
            warn!(code = %room.code, "no opponent move available, settling as draw");
            duel.outcome = Some(DuelOutcome::Draw);
            room.phase = Phase::Summary;
            let now = self.now_millis();
            room.push_system_message("duel ended in a draw", now);
            return;
        };

        duel.board[cell] = Some(Mark::Opponent);
        if Self::settle_if_terminal(room) {
            return;
        }
        if let Some(duel) = room.duel.as_mut() {
            duel.turn = TurnOwner::Players;
        }
        info!(code = %room.code, cell, "opponent move applied");
    }

    /// Terminal check shared by both sides: a completed line wins, a full
    /// board draws, and either ends the room in the summary phase.
    fn settle_if_terminal(room: &mut Room) -> bool {
        let Some(duel) = room.duel.as_mut() else {
            return false;
        };
        let outcome = match duel.winner() {
            Some(Mark::Players) => Some(DuelOutcome::PlayersWin),
            Some(Mark::Opponent) => Some(DuelOutcome::OpponentWins),
            None if duel.is_full() => Some(DuelOutcome::Draw),
            None => None,
        };
        let Some(outcome) = outcome else {
            return false;
        };

        duel.outcome = Some(outcome);
        room.phase = Phase::Summary;
        room.cancel_all_timers();
        info!(code = %room.code, ?outcome, "duel settled");
        true
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::domain::errors::SessionError;
    use crate::domain::room::{DuelOutcome, Phase, SeatRole, TurnOwner};
    use crate::use_cases::test_support::{
        active_room, engine, engine_with_selector, settle_timers, NoMoveSelector,
        ScriptedSelector,
    };

    #[tokio::test(start_paused = true)]
    async fn when_a_player_moves_then_the_opponent_turn_is_scheduled() {
        let engine = engine_with_selector(ScriptedSelector::new(vec![4]));
        active_room(&engine, "ABC123").await;

        let snapshot = engine
            .play_move("ABC123", SeatRole::A, "t1", 0)
            .await
            .expect("expected move to succeed");
        let duel = snapshot.duel.expect("expected a duel view");
        assert_eq!(duel.turn, TurnOwner::Opponent);

        settle_timers(Duration::from_millis(1_100)).await;

        let snapshot = engine
            .room_snapshot("ABC123")
            .await
            .expect("expected snapshot");
        let duel = snapshot.duel.expect("expected a duel view");
        assert_eq!(duel.turn, TurnOwner::Players);
        assert!(duel.board[4].is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn when_moving_out_of_turn_then_it_conflicts() {
        let engine = engine_with_selector(ScriptedSelector::new(vec![4]));
        active_room(&engine, "ABC123").await;
        engine
            .play_move("ABC123", SeatRole::A, "t1", 0)
            .await
            .expect("expected move to succeed");

        // The opponent reply has not fired yet.
        let result = engine.play_move("ABC123", SeatRole::B, "t2", 1).await;

        assert_eq!(result.unwrap_err(), SessionError::OutOfTurn);
    }

    #[tokio::test(start_paused = true)]
    async fn when_moving_into_an_occupied_cell_then_it_conflicts() {
        let engine = engine_with_selector(ScriptedSelector::new(vec![4]));
        active_room(&engine, "ABC123").await;
        engine
            .play_move("ABC123", SeatRole::A, "t1", 0)
            .await
            .expect("expected move to succeed");
        settle_timers(Duration::from_millis(1_100)).await;

        let result = engine.play_move("ABC123", SeatRole::B, "t2", 4).await;

        assert_eq!(result.unwrap_err(), SessionError::CellOccupied);
    }

    #[tokio::test(start_paused = true)]
    async fn when_the_players_complete_a_line_then_the_duel_ends_in_summary() {
        // Opponent plays 3 and 4; players take the top row.
        let engine = engine_with_selector(ScriptedSelector::new(vec![3, 4]));
        active_room(&engine, "ABC123").await;

        for cell in [0, 1] {
            engine
                .play_move("ABC123", SeatRole::A, "t1", cell)
                .await
                .expect("expected move to succeed");
            settle_timers(Duration::from_millis(1_100)).await;
        }
        let snapshot = engine
            .play_move("ABC123", SeatRole::B, "t2", 2)
            .await
            .expect("expected winning move to succeed");

        assert_eq!(snapshot.phase, Phase::Summary);
        let duel = snapshot.duel.expect("expected a duel view");
        assert_eq!(duel.outcome, Some(DuelOutcome::PlayersWin));

        // No opponent reply is pending after the game settled.
        settle_timers(Duration::from_millis(2_000)).await;
        let snapshot = engine
            .room_snapshot("ABC123")
            .await
            .expect("expected snapshot");
        assert_eq!(snapshot.phase, Phase::Summary);
    }

    #[tokio::test(start_paused = true)]
    async fn when_the_selector_has_no_move_then_the_duel_degrades_to_a_draw() {
        let engine = engine_with_selector(NoMoveSelector);
        active_room(&engine, "ABC123").await;
        engine
            .play_move("ABC123", SeatRole::A, "t1", 0)
            .await
            .expect("expected move to succeed");

        settle_timers(Duration::from_millis(1_100)).await;

        let snapshot = engine
            .room_snapshot("ABC123")
            .await
            .expect("expected snapshot");
        assert_eq!(snapshot.phase, Phase::Summary);
        let duel = snapshot.duel.expect("expected a duel view");
        assert_eq!(duel.outcome, Some(DuelOutcome::Draw));
    }

    #[tokio::test]
    async fn when_the_cell_is_out_of_range_then_the_move_is_rejected() {
        let engine = engine();
        active_room(&engine, "ABC123").await;

        let result = engine.play_move("ABC123", SeatRole::A, "t1", 9).await;

        assert_eq!(result.unwrap_err(), SessionError::CellOutOfRange);
    }

    #[tokio::test]
    async fn when_the_room_is_not_active_then_the_move_conflicts() {
        let engine = engine();
        engine
            .claim_seat("ABC123", SeatRole::A, "t1")
            .await
            .expect("expected claim to succeed");

        let result = engine.play_move("ABC123", SeatRole::A, "t1", 0).await;

        assert_eq!(
            result.unwrap_err(),
            SessionError::PhaseForbids {
                phase: Phase::Lobby
            }
        );
    }
}
