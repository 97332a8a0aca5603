use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::{
    error::AppError, quiz::identity::Identity, storage::Store, utils::ids::is_valid_route_id,
};

/// Get a student's display profile (username, roll number).
///
/// The id comes straight from the page route, so its shape is checked
/// before touching the store.
pub async fn get_student(
    State(store): State<Arc<dyn Store>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if !is_valid_route_id(&id) {
        return Err(AppError::NotFound("Invalid student id".to_string()));
    }

    let profile = store
        .get_student(&Identity::new(id))
        .await?
        .ok_or(AppError::NotFound("No such document".to_string()))?;

    Ok(Json(profile))
}
