// src/handlers/classes.rs

use axum::{
    Json,
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::class::{ClassSummary, CreateClassRequest, UpdateClassRequest},
    store::DynStore,
    utils::jwt::Claims,
};

/// Lists all classes with their student counts.
pub async fn list_classes(State(store): State<DynStore>) -> Result<impl IntoResponse, AppError> {
    let classes = store.list_classes().await.map_err(|e| {
        tracing::error!("Failed to list classes: {:?}", e);
        e
    })?;

    Ok(Json(classes))
}

/// Creates a new class.
pub async fn create_class(
    State(store): State<DynStore>,
    Json(payload): Json<CreateClassRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let class = store.create_class(&payload.name, &payload.code).await?;
    tracing::info!("Class created with ID: {}", class.id);

    Ok((StatusCode::CREATED, Json(ClassSummary::new(class, 0))))
}

/// Retrieves a single class by ID.
pub async fn get_class(
    State(store): State<DynStore>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let class = store
        .get_class(id)
        .await?
        .ok_or(AppError::NotFound("Class not found".to_string()))?;
    let student_count = store.count_students(id).await?;

    Ok(Json(ClassSummary::new(class, student_count)))
}

/// Renames a class or changes its code.
pub async fn update_class(
    State(store): State<DynStore>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateClassRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let class = store
        .update_class(id, payload.name, payload.code)
        .await?
        .ok_or(AppError::NotFound("Class not found".to_string()))?;
    let student_count = store.count_students(id).await?;
    tracing::info!("Class updated: {}", id);

    Ok(Json(ClassSummary::new(class, student_count)))
}

/// Deletes a class together with its students, exercises and completions.
pub async fn delete_class(
    State(store): State<DynStore>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !store.delete_class(id).await? {
        return Err(AppError::NotFound("Class not found".to_string()));
    }

    tracing::info!("Class {} deleted by {}", id, claims.username);
    Ok(StatusCode::NO_CONTENT)
}
