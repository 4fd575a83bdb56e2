use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::warn;

use crate::domain::errors::SessionError;
use crate::domain::room::RoomSnapshot;
use crate::interface_adapters::protocol::{
    AnswerRequest, ChatRequest, ClaimRequest, ErrorResponse, MoveRequest, ReadyRequest,
    ReleaseRequest, SeatRequest,
};
use crate::interface_adapters::state::AppState;

type HandlerResult = Result<Json<RoomSnapshot>, (StatusCode, Json<ErrorResponse>)>;

fn error_response(status: StatusCode, message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            message: message.to_string(),
        }),
    )
}

// Every domain error belongs to one of three HTTP families.
fn map_session_error(error: SessionError) -> (StatusCode, Json<ErrorResponse>) {
    match error {
        SessionError::EmptyToken => error_response(StatusCode::BAD_REQUEST, "token is required"),
        SessionError::EmptyAnswer => error_response(StatusCode::BAD_REQUEST, "answer is required"),
        SessionError::EmptyMessage => error_response(StatusCode::BAD_REQUEST, "text is required"),
        SessionError::MessageTooLong => {
            error_response(StatusCode::BAD_REQUEST, "text is too long")
        }
        SessionError::NoAnswerSelected => {
            error_response(StatusCode::BAD_REQUEST, "no answer selected")
        }
        SessionError::NotReady => error_response(
            StatusCode::BAD_REQUEST,
            "both seats must be occupied and ready",
        ),
        SessionError::CellOutOfRange => {
            error_response(StatusCode::BAD_REQUEST, "cell is out of range")
        }
        SessionError::SeatTaken => {
            error_response(StatusCode::CONFLICT, "seat is taken by another player")
        }
        SessionError::SeatNotClaimed => {
            error_response(StatusCode::CONFLICT, "seat is not claimed by this token")
        }
        SessionError::AlreadyConfirmed => {
            error_response(StatusCode::CONFLICT, "answer already confirmed")
        }
        SessionError::PhaseForbids { phase } => {
            warn!(?phase, "action rejected by phase");
            error_response(
                StatusCode::CONFLICT,
                "action not allowed in the current phase",
            )
        }
        SessionError::OutOfTurn => error_response(StatusCode::CONFLICT, "not your turn"),
        SessionError::CellOccupied => error_response(StatusCode::CONFLICT, "cell is occupied"),
        SessionError::RoomMissing => error_response(StatusCode::NOT_FOUND, "room not found"),
    }
}

pub async fn get_room(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> HandlerResult {
    let snapshot = state
        .engine
        .room_snapshot(&code)
        .await
        .map_err(map_session_error)?;
    Ok(Json(snapshot))
}

pub async fn claim_seat(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    Json(request): Json<ClaimRequest>,
) -> HandlerResult {
    let snapshot = state
        .engine
        .claim_seat(&code, request.role, &request.token)
        .await
        .map_err(map_session_error)?;
    Ok(Json(snapshot))
}

pub async fn release_seat(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    Json(request): Json<ReleaseRequest>,
) -> HandlerResult {
    let snapshot = state
        .engine
        .release_seat(&code, request.role, &request.token)
        .await
        .map_err(map_session_error)?;
    Ok(Json(snapshot))
}

pub async fn set_ready(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    Json(request): Json<ReadyRequest>,
) -> HandlerResult {
    let snapshot = state
        .engine
        .set_ready(&code, request.role, &request.token, request.ready)
        .await
        .map_err(map_session_error)?;
    Ok(Json(snapshot))
}

pub async fn request_start(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    Json(request): Json<SeatRequest>,
) -> HandlerResult {
    let snapshot = state
        .engine
        .request_start(&code, request.role, &request.token)
        .await
        .map_err(map_session_error)?;
    Ok(Json(snapshot))
}

pub async fn select_answer(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    Json(request): Json<AnswerRequest>,
) -> HandlerResult {
    let snapshot = state
        .engine
        .select_answer(&code, request.role, &request.token, &request.answer)
        .await
        .map_err(map_session_error)?;
    Ok(Json(snapshot))
}

pub async fn confirm_answer(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    Json(request): Json<SeatRequest>,
) -> HandlerResult {
    let snapshot = state
        .engine
        .confirm_answer(&code, request.role, &request.token)
        .await
        .map_err(map_session_error)?;
    Ok(Json(snapshot))
}

pub async fn request_exit(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    Json(request): Json<SeatRequest>,
) -> HandlerResult {
    let snapshot = state
        .engine
        .request_exit(&code, request.role, &request.token)
        .await
        .map_err(map_session_error)?;
    Ok(Json(snapshot))
}

pub async fn cancel_exit(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    Json(request): Json<SeatRequest>,
) -> HandlerResult {
    let snapshot = state
        .engine
        .cancel_exit(&code, request.role, &request.token)
        .await
        .map_err(map_session_error)?;
    Ok(Json(snapshot))
}

pub async fn post_chat(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    Json(request): Json<ChatRequest>,
) -> HandlerResult {
    let snapshot = state
        .engine
        .post_chat(&code, request.role, &request.token, &request.text)
        .await
        .map_err(map_session_error)?;
    Ok(Json(snapshot))
}

pub async fn play_move(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    Json(request): Json<MoveRequest>,
) -> HandlerResult {
    let snapshot = state
        .engine
        .play_move(&code, request.role, &request.token, request.cell)
        .await
        .map_err(map_session_error)?;
    Ok(Json(snapshot))
}

pub async fn reset_room(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> HandlerResult {
    let snapshot = state
        .engine
        .reset_room(&code)
        .await
        .map_err(map_session_error)?;
    Ok(Json(snapshot))
}
