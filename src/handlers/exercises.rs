// src/handlers/exercises.rs

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::{
        completion::CompletionResponse,
        exercise::{CreateExerciseRequest, Exercise, ExerciseResponse},
    },
    store::{ClassStore, DynStore},
    utils::token::{completion_url, generate_qr_token},
};

/// Lists the exercises of a class with their completion counts.
pub async fn list_exercises(
    State(store): State<DynStore>,
    State(config): State<Config>,
    Path(class_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    store
        .get_class(class_id)
        .await?
        .ok_or(AppError::NotFound("Class not found".to_string()))?;

    let exercises: Vec<ExerciseResponse> = store
        .list_exercise_summaries(class_id)
        .await?
        .into_iter()
        .map(|summary| {
            let url = completion_url(&config.public_base_url, &summary.exercise.qr_token);
            ExerciseResponse::new(summary.exercise, url, Some(summary.completion_count))
        })
        .collect();

    Ok(Json(exercises))
}

/// Creates an exercise with a fresh completion token.
///
/// The response carries `qr_url`, the link a front end encodes into the QR
/// code handed to students.
pub async fn create_exercise(
    State(store): State<DynStore>,
    State(config): State<Config>,
    Path(class_id): Path<i64>,
    Json(payload): Json<CreateExerciseRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    store
        .get_class(class_id)
        .await?
        .ok_or(AppError::NotFound("Class not found".to_string()))?;

    let qr_token = generate_qr_token(&mut rand::thread_rng());
    let exercise = store
        .create_exercise(class_id, &payload.name, &qr_token)
        .await?;
    tracing::info!("Exercise created with ID: {} in class {}", exercise.id, class_id);

    let url = completion_url(&config.public_base_url, &exercise.qr_token);
    Ok((
        StatusCode::CREATED,
        Json(ExerciseResponse::new(exercise, url, Some(0))),
    ))
}

/// Retrieves an exercise and its completion link.
pub async fn get_exercise(
    State(store): State<DynStore>,
    State(config): State<Config>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let exercise = find_exercise(store.as_ref(), id).await?;
    let url = completion_url(&config.public_base_url, &exercise.qr_token);

    Ok(Json(ExerciseResponse::new(exercise, url, None)))
}

/// Deletes an exercise and its completions.
pub async fn delete_exercise(
    State(store): State<DynStore>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !store.delete_exercise(id).await? {
        return Err(AppError::NotFound("Exercise not found".to_string()));
    }

    tracing::info!("Exercise deleted: {}", id);
    Ok(StatusCode::NO_CONTENT)
}

/// Lists who completed an exercise and when.
pub async fn list_completions(
    State(store): State<DynStore>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let exercise = find_exercise(store.as_ref(), id).await?;
    let completions = completions_with_names(store.as_ref(), &exercise).await?;

    Ok(Json(completions))
}

pub(crate) async fn find_exercise(store: &dyn ClassStore, id: i64) -> Result<Exercise, AppError> {
    store
        .get_exercise(id)
        .await?
        .ok_or(AppError::NotFound("Exercise not found".to_string()))
}

/// Completions of `exercise` joined with the current names of their students.
/// Students that no longer exist are reported as `Unknown`.
pub(crate) async fn completions_with_names(
    store: &dyn ClassStore,
    exercise: &Exercise,
) -> Result<Vec<CompletionResponse>, AppError> {
    let (completions, students) = tokio::try_join!(
        store.list_completions(exercise.id),
        store.list_students(exercise.class_id),
    )?;

    let names: HashMap<i64, String> = students.into_iter().map(|s| (s.id, s.name)).collect();

    Ok(completions
        .into_iter()
        .map(|c| CompletionResponse {
            student_name: names
                .get(&c.student_id)
                .cloned()
                .unwrap_or_else(|| "Unknown".to_string()),
            id: c.id,
            student_email: c.student_email,
            completed_at: c.completed_at,
        })
        .collect())
}
