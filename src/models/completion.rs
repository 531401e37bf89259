// src/models/completion.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'completions' table in the database.
///
/// `student_id` carries no foreign key: a completion outlives the student
/// it belongs to and is then reported as orphaned.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Completion {
    pub id: i64,
    pub student_id: i64,
    pub exercise_id: i64,

    /// Email as submitted, kept even if the student record changes.
    pub student_email: String,

    /// ISO-8601 timestamp exactly as stored.
    pub completed_at: String,
}

/// Values for a completion that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewCompletion {
    pub student_id: i64,
    pub exercise_id: i64,
    pub student_email: String,
    pub completed_at: String,
}

/// Admin-facing completion row, joined with the student's current name.
#[derive(Debug, Serialize)]
pub struct CompletionResponse {
    pub id: i64,
    pub student_email: String,
    pub student_name: String,
    pub completed_at: String,
}

/// DTO for the public completion form.
#[derive(Debug, Deserialize, Validate)]
pub struct CompleteRequest {
    #[validate(length(min = 1, max = 254, message = "Email is required."))]
    pub email: String,
}

/// Public description of the exercise behind a completion token.
#[derive(Debug, Serialize)]
pub struct CompletionTarget {
    pub exercise_name: String,
    pub class_name: Option<String>,
}
