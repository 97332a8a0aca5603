// src/handlers/auth.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{
    auth::{AuthForm, AuthOutcome, Authenticator},
    error::AppError,
    models::student::{LoginForm, SignupForm},
};

/// Sign-up answers 201 with the new uid; sign-in answers with a bearer
/// token and the student's quiz page.
impl IntoResponse for AuthOutcome {
    fn into_response(self) -> Response {
        match self {
            AuthOutcome::SignedUp(identity) => (
                StatusCode::CREATED,
                Json(json!({
                    "uid": identity,
                    "message": "You have successfully signed up!"
                })),
            )
                .into_response(),
            AuthOutcome::SignedIn(signed_in) => Json(json!({
                "token": signed_in.token,
                "type": "Bearer",
                "uid": signed_in.identity,
                "redirect": format!("/student/{}", signed_in.identity),
                "message": "You have successfully logged in!"
            }))
            .into_response(),
        }
    }
}

/// Handles either form; the `mode` field selects the schema.
pub async fn authenticate(
    State(auth): State<Arc<dyn Authenticator>>,
    Json(form): Json<AuthForm>,
) -> Result<AuthOutcome, AppError> {
    form.submit(auth.as_ref()).await
}

/// Registers a new student and writes the profile document.
pub async fn signup(
    State(auth): State<Arc<dyn Authenticator>>,
    Json(payload): Json<SignupForm>,
) -> Result<AuthOutcome, AppError> {
    AuthForm::Signup(payload).submit(auth.as_ref()).await
}

/// Authenticates a student and returns a JWT token.
pub async fn login(
    State(auth): State<Arc<dyn Authenticator>>,
    Json(payload): Json<LoginForm>,
) -> Result<AuthOutcome, AppError> {
    AuthForm::Login(payload).submit(auth.as_ref()).await
}
