// src/store/postgres.rs

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::ClassStore;
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

/// `ClassStore` backed by the Postgres schema in `migrations/`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

#[async_trait]
impl ClassStore for PgStore {
    async fn find_admin(&self, username: &str) -> Result<Option<Admin>, AppError> {
        let admin = sqlx::query_as::<_, Admin>(
            "SELECT id, username, password_hash FROM admins WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(admin)
    }

    async fn upsert_admin(&self, username: &str, password_hash: &str) -> Result<bool, AppError> {
        let updated = sqlx::query("UPDATE admins SET password_hash = $1 WHERE username = $2")
            .bind(password_hash)
            .bind(username)
            .execute(&self.pool)
            .await?;

        if updated.rows_affected() > 0 {
            return Ok(false);
        }

        sqlx::query("INSERT INTO admins (username, password_hash) VALUES ($1, $2)")
            .bind(username)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;

        Ok(true)
    }

    async fn list_classes(&self) -> Result<Vec<ClassSummary>, AppError> {
        let classes = sqlx::query_as::<_, ClassSummary>(
            r#"
            SELECT c.id, c.name, c.code, COUNT(s.id) AS student_count
            FROM classes c
            LEFT JOIN students s ON s.class_id = c.id
            GROUP BY c.id
            ORDER BY c.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(classes)
    }

    async fn get_class(&self, id: i64) -> Result<Option<Class>, AppError> {
        let class = sqlx::query_as::<_, Class>(
            "SELECT id, name, code, created_at FROM classes WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(class)
    }

    async fn create_class(&self, name: &str, code: &str) -> Result<Class, AppError> {
        let class = sqlx::query_as::<_, Class>(
            r#"
            INSERT INTO classes (name, code)
            VALUES ($1, $2)
            RETURNING id, name, code, created_at
            "#,
        )
        .bind(name)
        .bind(code)
        .fetch_one(&self.pool)
        .await?;

        Ok(class)
    }

    async fn update_class(
        &self,
        id: i64,
        name: Option<String>,
        code: Option<String>,
    ) -> Result<Option<Class>, AppError> {
        if name.is_none() && code.is_none() {
            return self.get_class(id).await;
        }

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE classes SET ");
        let mut separated = builder.separated(", ");

        if let Some(name) = name {
            separated.push("name = ");
            separated.push_bind_unseparated(name);
        }

        if let Some(code) = code {
            separated.push("code = ");
            separated.push_bind_unseparated(code);
        }

        builder.push(" WHERE id = ");
        builder.push_bind(id);
        builder.push(" RETURNING id, name, code, created_at");

        let class = builder
            .build_query_as::<Class>()
            .fetch_optional(&self.pool)
            .await?;

        Ok(class)
    }

    async fn delete_class(&self, id: i64) -> Result<bool, AppError> {
        // students and exercises cascade; completions cascade from exercises
        let result = sqlx::query("DELETE FROM classes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_students(&self, class_id: i64) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM students WHERE class_id = $1")
            .bind(class_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn list_students(&self, class_id: i64) -> Result<Vec<Student>, AppError> {
        let students = sqlx::query_as::<_, Student>(
            "SELECT id, email, name, class_id FROM students WHERE class_id = $1 ORDER BY id",
        )
        .bind(class_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(students)
    }

    async fn find_student_by_email(
        &self,
        class_id: i64,
        email: &str,
    ) -> Result<Option<Student>, AppError> {
        let student = sqlx::query_as::<_, Student>(
            "SELECT id, email, name, class_id FROM students WHERE class_id = $1 AND email = $2",
        )
        .bind(class_id)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(student)
    }

    async fn create_student(
        &self,
        class_id: i64,
        name: &str,
        email: &str,
    ) -> Result<Student, AppError> {
        sqlx::query_as::<_, Student>(
            r#"
            INSERT INTO students (email, name, class_id)
            VALUES ($1, $2, $3)
            RETURNING id, email, name, class_id
            "#,
        )
        .bind(email)
        .bind(name)
        .bind(class_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!("Email '{}' is already enrolled in this class", email))
            } else {
                tracing::error!("Failed to create student: {:?}", e);
                AppError::from(e)
            }
        })
    }

    async fn delete_student(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_exercises(&self, class_id: i64) -> Result<Vec<Exercise>, AppError> {
        let exercises = sqlx::query_as::<_, Exercise>(
            r#"
            SELECT id, name, class_id, qr_token, created_at
            FROM exercises
            WHERE class_id = $1
            ORDER BY id
            "#,
        )
        .bind(class_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(exercises)
    }

    async fn list_exercise_summaries(&self, class_id: i64) -> Result<Vec<ExerciseSummary>, AppError> {
        let exercises = sqlx::query_as::<_, ExerciseSummary>(
            r#"
            SELECT e.id, e.name, e.class_id, e.qr_token, e.created_at,
                   COUNT(c.id) AS completion_count
            FROM exercises e
            LEFT JOIN completions c ON c.exercise_id = e.id
            WHERE e.class_id = $1
            GROUP BY e.id
            ORDER BY e.id
            "#,
        )
        .bind(class_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(exercises)
    }

    async fn get_exercise(&self, id: i64) -> Result<Option<Exercise>, AppError> {
        let exercise = sqlx::query_as::<_, Exercise>(
            "SELECT id, name, class_id, qr_token, created_at FROM exercises WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(exercise)
    }

    async fn find_exercise_by_token(&self, qr_token: &str) -> Result<Option<Exercise>, AppError> {
        let exercise = sqlx::query_as::<_, Exercise>(
            "SELECT id, name, class_id, qr_token, created_at FROM exercises WHERE qr_token = $1",
        )
        .bind(qr_token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(exercise)
    }

    async fn create_exercise(
        &self,
        class_id: i64,
        name: &str,
        qr_token: &str,
    ) -> Result<Exercise, AppError> {
        let exercise = sqlx::query_as::<_, Exercise>(
            r#"
            INSERT INTO exercises (name, class_id, qr_token)
            VALUES ($1, $2, $3)
            RETURNING id, name, class_id, qr_token, created_at
            "#,
        )
        .bind(name)
        .bind(class_id)
        .bind(qr_token)
        .fetch_one(&self.pool)
        .await?;

        Ok(exercise)
    }

    async fn delete_exercise(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM exercises WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_completions(&self, exercise_id: i64) -> Result<Vec<Completion>, AppError> {
        let completions = sqlx::query_as::<_, Completion>(
            r#"
            SELECT id, student_id, exercise_id, student_email, completed_at
            FROM completions
            WHERE exercise_id = $1
            ORDER BY id
            "#,
        )
        .bind(exercise_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(completions)
    }

    async fn insert_completion(&self, new: NewCompletion) -> Result<Option<Completion>, AppError> {
        let completion = sqlx::query_as::<_, Completion>(
            r#"
            INSERT INTO completions (student_id, exercise_id, student_email, completed_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (student_id, exercise_id) DO NOTHING
            RETURNING id, student_id, exercise_id, student_email, completed_at
            "#,
        )
        .bind(new.student_id)
        .bind(new.exercise_id)
        .bind(&new.student_email)
        .bind(&new.completed_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(completion)
    }
}
