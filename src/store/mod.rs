// src/store/mod.rs

//! Persistence seam for the tracker.
//!
//! Every list operation returns its records in insertion (id) order and never
//! fails on an empty result; absence of a single record is `Ok(None)`.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{
        admin::Admin,
        class::{Class, ClassSummary},
        completion::{Completion, NewCompletion},
        exercise::{Exercise, ExerciseSummary},
        student::Student,
    },
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Shared handle used by the router state.
pub type DynStore = Arc<dyn ClassStore>;

#[async_trait]
pub trait ClassStore: Send + Sync {
    async fn find_admin(&self, username: &str) -> Result<Option<Admin>, AppError>;

    /// Creates the admin or replaces its password hash. Returns `true` when created.
    async fn upsert_admin(&self, username: &str, password_hash: &str) -> Result<bool, AppError>;

    async fn list_classes(&self) -> Result<Vec<ClassSummary>, AppError>;

    async fn get_class(&self, id: i64) -> Result<Option<Class>, AppError>;

    async fn create_class(&self, name: &str, code: &str) -> Result<Class, AppError>;

    async fn update_class(
        &self,
        id: i64,
        name: Option<String>,
        code: Option<String>,
    ) -> Result<Option<Class>, AppError>;

    /// Removes the class with its students, exercises and their completions.
    async fn delete_class(&self, id: i64) -> Result<bool, AppError>;

    async fn count_students(&self, class_id: i64) -> Result<i64, AppError>;

    async fn list_students(&self, class_id: i64) -> Result<Vec<Student>, AppError>;

    async fn find_student_by_email(
        &self,
        class_id: i64,
        email: &str,
    ) -> Result<Option<Student>, AppError>;

    /// Fails with `Conflict` when the email is already enrolled in the class.
    async fn create_student(
        &self,
        class_id: i64,
        name: &str,
        email: &str,
    ) -> Result<Student, AppError>;

    /// Leaves the student's completions in place.
    async fn delete_student(&self, id: i64) -> Result<bool, AppError>;

    async fn list_exercises(&self, class_id: i64) -> Result<Vec<Exercise>, AppError>;

    async fn list_exercise_summaries(&self, class_id: i64) -> Result<Vec<ExerciseSummary>, AppError>;

    async fn get_exercise(&self, id: i64) -> Result<Option<Exercise>, AppError>;

    async fn find_exercise_by_token(&self, qr_token: &str) -> Result<Option<Exercise>, AppError>;

    async fn create_exercise(
        &self,
        class_id: i64,
        name: &str,
        qr_token: &str,
    ) -> Result<Exercise, AppError>;

    /// Removes the exercise and its completions.
    async fn delete_exercise(&self, id: i64) -> Result<bool, AppError>;

    async fn list_completions(&self, exercise_id: i64) -> Result<Vec<Completion>, AppError>;

    /// Inserts unless the (student, exercise) pair already has a completion,
    /// in which case `Ok(None)` is returned and nothing is written.
    async fn insert_completion(&self, new: NewCompletion) -> Result<Option<Completion>, AppError>;
}
