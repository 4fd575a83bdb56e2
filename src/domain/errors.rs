// Domain-level errors for room session operations. Exactly three HTTP
// families: validation, conflict, and not-found; the adapter layer does
// the mapping.

use crate::domain::room::Phase;

#[derive(Debug, PartialEq, Eq)]
pub enum SessionError {
    // Validation: rejected before any state mutates.
    EmptyToken,
    EmptyAnswer,
    EmptyMessage,
    MessageTooLong,
    NoAnswerSelected,
    NotReady,
    CellOutOfRange,

    // Conflict: the room disagrees; the caller should re-poll and retry.
    SeatTaken,
    SeatNotClaimed,
    AlreadyConfirmed,
    PhaseForbids { phase: Phase },
    OutOfTurn,
    CellOccupied,

    // Not found: the referenced room was never created on this server.
    RoomMissing,
}
