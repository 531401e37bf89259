// src/models/student.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'students' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,

    /// Lower-cased address, unique within the class.
    pub email: String,

    pub name: String,
    pub class_id: i64,
}

/// DTO for enrolling a student in a class.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateStudentRequest {
    #[validate(length(min = 1, max = 100, message = "Student name must be between 1 and 100 characters."))]
    pub name: String,
    #[validate(email(message = "Invalid email address."))]
    pub email: String,
}

/// Canonical form used both when enrolling and when matching a submission.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
