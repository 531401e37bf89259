// src/handlers/students.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::student::{CreateStudentRequest, normalize_email},
    store::DynStore,
};

/// Lists the students enrolled in a class.
pub async fn list_students(
    State(store): State<DynStore>,
    Path(class_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    store
        .get_class(class_id)
        .await?
        .ok_or(AppError::NotFound("Class not found".to_string()))?;

    let students = store.list_students(class_id).await?;

    Ok(Json(students))
}

/// Enrolls a student. The email is stored trimmed and lower-cased.
pub async fn create_student(
    State(store): State<DynStore>,
    Path(class_id): Path<i64>,
    Json(mut payload): Json<CreateStudentRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.email = normalize_email(&payload.email);
    payload.name = payload.name.trim().to_string();

    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    store
        .get_class(class_id)
        .await?
        .ok_or(AppError::NotFound("Class not found".to_string()))?;

    let student = store
        .create_student(class_id, &payload.name, &payload.email)
        .await?;
    tracing::info!("Student created with ID: {} in class {}", student.id, class_id);

    Ok((StatusCode::CREATED, Json(student)))
}

/// Removes a student. Their completions stay on record.
pub async fn delete_student(
    State(store): State<DynStore>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !store.delete_student(id).await? {
        return Err(AppError::NotFound("Student not found".to_string()));
    }

    tracing::info!("Student deleted: {}", id);
    Ok(StatusCode::NO_CONTENT)
}
