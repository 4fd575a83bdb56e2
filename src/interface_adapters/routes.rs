use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::interface_adapters::handlers::{
    cancel_exit, claim_seat, confirm_answer, get_room, play_move, post_chat, release_seat,
    request_exit, request_start, reset_room, select_answer, set_ready,
};
use crate::interface_adapters::state::AppState;

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/rooms/{code}", get(get_room))
        .route("/rooms/{code}/claim", post(claim_seat))
        .route("/rooms/{code}/release", post(release_seat))
        .route("/rooms/{code}/ready", post(set_ready))
        .route("/rooms/{code}/start", post(request_start))
        .route("/rooms/{code}/answer", post(select_answer))
        .route("/rooms/{code}/confirm", post(confirm_answer))
        .route("/rooms/{code}/exit", post(request_exit))
        .route("/rooms/{code}/exit/cancel", post(cancel_exit))
        .route("/rooms/{code}/chat", post(post_chat))
        .route("/rooms/{code}/move", post(play_move))
        .route("/rooms/{code}/reset", post(reset_room))
        .with_state(state)
}
