// src/models/exercise.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'exercises' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Exercise {
    pub id: i64,
    pub name: String,
    pub class_id: i64,

    /// Unguessable token embedded in the completion URL.
    /// Skipped during serialization; clients receive it only inside `qr_url`.
    #[serde(skip)]
    pub qr_token: String,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// An exercise with its completion count, as listed for a class.
#[derive(Debug, Clone, FromRow)]
pub struct ExerciseSummary {
    #[sqlx(flatten)]
    pub exercise: Exercise,
    pub completion_count: i64,
}

/// Admin-facing view of an exercise.
#[derive(Debug, Serialize)]
pub struct ExerciseResponse {
    pub id: i64,
    pub name: String,
    pub class_id: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,

    /// Completion link to encode into the QR code.
    pub qr_url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_count: Option<i64>,
}

impl ExerciseResponse {
    pub fn new(exercise: Exercise, qr_url: String, completion_count: Option<i64>) -> Self {
        Self {
            id: exercise.id,
            name: exercise.name,
            class_id: exercise.class_id,
            created_at: exercise.created_at,
            qr_url,
            completion_count,
        }
    }
}

/// DTO for creating an exercise.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateExerciseRequest {
    #[validate(length(min = 1, max = 200, message = "Exercise name must be between 1 and 200 characters."))]
    pub name: String,
}
