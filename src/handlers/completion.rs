// src/handlers/completion.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::{SecondsFormat, Utc};
use serde_json::json;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        completion::{CompleteRequest, CompletionTarget, NewCompletion},
        student::normalize_email,
    },
    store::DynStore,
};

/// Describes the exercise behind a completion token.
/// Public: the token itself is the credential.
pub async fn get_target(
    State(store): State<DynStore>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let exercise = store
        .find_exercise_by_token(&token)
        .await?
        .ok_or(AppError::NotFound("Exercise not found".to_string()))?;
    let class = store.get_class(exercise.class_id).await?;

    Ok(Json(CompletionTarget {
        exercise_name: exercise.name,
        class_name: class.map(|c| c.name),
    }))
}

/// Records that a student finished an exercise.
///
/// * Resolves the exercise from the token.
/// * Matches the email against the students of the exercise's class.
/// * Inserts the completion unless one already exists for the pair.
pub async fn submit_completion(
    State(store): State<DynStore>,
    Path(token): Path<String>,
    Json(payload): Json<CompleteRequest>,
) -> Result<impl IntoResponse, AppError> {
    let email = normalize_email(&payload.email);
    let payload = CompleteRequest { email };
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }
    let email = payload.email;

    let prefix: String = token.chars().take(8).collect();
    tracing::info!("Processing completion for token {}...", prefix);

    let exercise = store
        .find_exercise_by_token(&token)
        .await?
        .ok_or_else(|| {
            tracing::warn!("Exercise not found for token {}...", prefix);
            AppError::NotFound("Exercise not found".to_string())
        })?;

    let student = store
        .find_student_by_email(exercise.class_id, &email)
        .await?
        .ok_or_else(|| {
            tracing::warn!("Email not enrolled in class {}", exercise.class_id);
            AppError::NotFound("Email not found in this class".to_string())
        })?;

    let inserted = store
        .insert_completion(NewCompletion {
            student_id: student.id,
            exercise_id: exercise.id,
            student_email: email,
            completed_at: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
        })
        .await?;

    if inserted.is_none() {
        tracing::warn!(
            "Student {} already completed exercise {}",
            student.id,
            exercise.id
        );
        return Err(AppError::Conflict(
            "You have already completed this exercise".to_string(),
        ));
    }

    tracing::info!("Completion recorded for student {}", student.id);

    Ok(Json(json!({
        "success": true,
        "student_name": student.name,
        "exercise_name": exercise.name
    })))
}
