// src/export/fetch.rs

use std::{future::Future, time::Duration};

use futures::future::try_join_all;

use crate::{
    error::AppError,
    models::{class::Class, completion::Completion, exercise::Exercise, student::Student},
    store::ClassStore,
};

/// Everything the class report needs, read from the store for one request.
///
/// The reads are independent, so a record created or deleted while they run
/// may or may not be reflected. The report is best-effort, not a
/// point-in-time snapshot.
#[derive(Debug, Clone)]
pub struct ClassSnapshot {
    pub class: Class,
    pub students: Vec<Student>,
    pub exercises: Vec<Exercise>,
    /// `completions[i]` belongs to `exercises[i]`.
    pub completions: Vec<Vec<Completion>>,
}

/// Reads the class, its students, its exercises and their completions.
///
/// Fails with `NotFound` when the class is missing or has no exercises, and
/// with `Timeout` when the reads take longer than `limit`.
pub async fn fetch_class_snapshot(
    store: &dyn ClassStore,
    class_id: i64,
    limit: Duration,
) -> Result<ClassSnapshot, AppError> {
    bounded(limit, fetch(store, class_id)).await
}

async fn fetch(store: &dyn ClassStore, class_id: i64) -> Result<ClassSnapshot, AppError> {
    let (class, students, exercises) = tokio::try_join!(
        store.get_class(class_id),
        store.list_students(class_id),
        store.list_exercises(class_id),
    )?;

    let class = class.ok_or_else(|| AppError::NotFound("Class not found".to_string()))?;

    if exercises.is_empty() {
        return Err(AppError::NotFound(
            "No exercises found for this class".to_string(),
        ));
    }

    let completions =
        try_join_all(exercises.iter().map(|exercise| store.list_completions(exercise.id))).await?;

    Ok(ClassSnapshot {
        class,
        students,
        exercises,
        completions,
    })
}

/// Runs `fut` under a deadline, turning expiry into a retryable error.
pub async fn bounded<T, F>(limit: Duration, fut: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    tokio::time::timeout(limit, fut).await.unwrap_or_else(|_| {
        Err(AppError::Timeout(format!(
            "Data store did not answer within {}s, please retry",
            limit.as_secs_f32()
        )))
    })
}
