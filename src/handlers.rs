use crate::errors::AppError;
use crate::models::{PreferenceRequest, ProgramView};
use crate::preferences::{PreferenceKey, set_preference};
use crate::program::Action;
use crate::state::AppState;
use crate::ui::render_index;
use axum::{Json, extract::State, response::Html};
use chrono::Utc;
use tracing::info;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let session = state.session.lock().await;
    Html(render_index(&session.view()))
}

pub async fn get_state(State(state): State<AppState>) -> Json<ProgramView> {
    let session = state.session.lock().await;
    Json(session.view())
}

pub async fn action(
    State(state): State<AppState>,
    Json(action): Json<Action>,
) -> Result<Json<ProgramView>, AppError> {
    let mut session = state.session.lock().await;
    session.dispatch(action, Utc::now()).await?;

    Ok(Json(session.view()))
}

pub async fn preference(
    State(state): State<AppState>,
    Json(payload): Json<PreferenceRequest>,
) -> Result<Json<ProgramView>, AppError> {
    let key: PreferenceKey = payload.key.trim().parse()?;
    let mut session = state.session.lock().await;
    let preferences = set_preference(&mut session.store, key, payload.value.trim()).await?;
    session.preferences = preferences;
    info!(key = key.storage_key(), value = payload.value.trim(), "preference updated");

    Ok(Json(session.view()))
}
