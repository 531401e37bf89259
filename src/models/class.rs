// src/models/class.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'classes' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Class {
    pub id: i64,
    pub name: String,

    /// Short course code shown next to the name (e.g. "MATH-101").
    pub code: String,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A class together with its current head count, as listed in the dashboard.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ClassSummary {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub student_count: i64,
}

impl ClassSummary {
    pub fn new(class: Class, student_count: i64) -> Self {
        Self {
            id: class.id,
            name: class.name,
            code: class.code,
            student_count,
        }
    }
}

/// DTO for creating a class.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateClassRequest {
    #[validate(length(min = 1, max = 100, message = "Class name must be between 1 and 100 characters."))]
    pub name: String,
    #[validate(length(min = 1, max = 50, message = "Class code must be between 1 and 50 characters."))]
    pub code: String,
}

/// DTO for updating a class. Fields are optional.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateClassRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub code: Option<String>,
}
