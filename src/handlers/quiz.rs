// src/handlers/quiz.rs

use std::sync::Arc;

use axum::{Extension, Json, extract::State, response::IntoResponse};
use serde::Deserialize;

use crate::{
    error::AppError,
    models::{question::OptionSlot, submission::AnswerMap},
    quiz::{
        SessionContext,
        identity::{Identity, RequestIdentity},
        session::{QuizSession, Screen},
    },
    state::AppState,
};

/// DTO for choosing an answer on the current question.
#[derive(Debug, Deserialize)]
pub struct SelectOptionRequest {
    pub slot: OptionSlot,
}

fn no_session() -> AppError {
    AppError::NotFound("No active quiz session".to_string())
}

async fn transition<F>(state: &AppState, identity: &Identity, f: F) -> Result<Json<Screen>, AppError>
where
    F: FnOnce(&mut QuizSession),
{
    state
        .sessions
        .update(identity, f)
        .await
        .map(Json)
        .ok_or_else(no_session)
}

/// Mounts a quiz session for the caller.
///
/// Loads the question sheet once; the session keeps that copy until it
/// ends. A load failure returns the error and no questions.
pub async fn mount_session(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, AppError> {
    let questions = state.loader.load().await.map_err(|e| {
        tracing::error!("Failed to load questions: {}", e);
        AppError::from(e)
    })?;

    let screen = state.sessions.mount(identity, questions.into()).await;
    Ok(Json(screen))
}

/// Current screen of the caller's session.
pub async fn current_screen(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, AppError> {
    state
        .sessions
        .screen(&identity)
        .await
        .map(Json)
        .ok_or_else(no_session)
}

pub async fn select_option(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<SelectOptionRequest>,
) -> Result<impl IntoResponse, AppError> {
    transition(&state, &identity, |session| session.select_option(req.slot)).await
}

/// Advances when the current question is answered; otherwise the screen
/// comes back unchanged.
pub async fn next_question(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, AppError> {
    transition(&state, &identity, |session| {
        session.go_next();
    })
    .await
}

pub async fn previous_question(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, AppError> {
    transition(&state, &identity, |session| {
        session.go_previous();
    })
    .await
}

/// Submits the caller's answers.
///
/// * No valid token → 401, nothing is read or written.
/// * A live submission exists → 409, the session stays mounted.
/// * Success ends the session and returns the confirmation redirect.
pub async fn submit(
    State(state): State<AppState>,
    Extension(request_identity): Extension<RequestIdentity>,
) -> Result<impl IntoResponse, AppError> {
    let context = SessionContext::new(Arc::new(request_identity), state.config.quiz_id.clone());

    let identity = context.current_identity();
    let answers = match &identity {
        Some(identity) => state
            .sessions
            .answers(identity)
            .await
            .ok_or_else(no_session)?,
        None => AnswerMap::new(),
    };

    let receipt = context.submit(&state.guard, &answers).await?;

    if let Some(identity) = identity {
        state.sessions.remove(&identity).await;
    }

    Ok(Json(receipt))
}
