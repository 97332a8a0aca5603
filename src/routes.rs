// src/routes.rs

use std::path::Path;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::{
    handlers::{auth, profile, quiz},
    state::AppState,
    utils::jwt::{auth_middleware, identity_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, students, quiz).
/// * Serves the question sheet directory under `/Data`.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:5173"),
            HeaderValue::from_static("http://127.0.0.1:5173"),
        ])
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let auth_routes = Router::new()
        .route("/form", post(auth::authenticate))
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login));

    let student_routes = Router::new().route("/{id}", get(profile::get_student));

    let quiz_routes = Router::new()
        .route(
            "/session",
            post(quiz::mount_session).get(quiz::current_screen),
        )
        .route("/session/select", post(quiz::select_option))
        .route("/session/next", post(quiz::next_question))
        .route("/session/previous", post(quiz::previous_question))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        // Submit resolves the identity itself so anonymous callers get a
        // submission error rather than a generic 401.
        .merge(
            Router::new()
                .route("/submit", post(quiz::submit))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    identity_middleware,
                )),
        );

    let sheets = ServeDir::new(Path::new(&state.config.static_dir).join("Data"));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/students", student_routes)
        .nest("/api/quiz", quiz_routes)
        .nest_service("/Data", sheets)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
