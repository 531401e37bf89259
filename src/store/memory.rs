// src/store/memory.rs

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

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

#[derive(Default)]
struct Tables {
    next_id: i64,
    admins: Vec<Admin>,
    classes: Vec<Class>,
    students: Vec<Student>,
    exercises: Vec<Exercise>,
    completions: Vec<Completion>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-process `ClassStore` with the same cascade and uniqueness rules as the
/// Postgres schema. Used by the test suites.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClassStore for MemoryStore {
    async fn find_admin(&self, username: &str) -> Result<Option<Admin>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.admins.iter().find(|a| a.username == username).cloned())
    }

    async fn upsert_admin(&self, username: &str, password_hash: &str) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;

        if let Some(admin) = tables.admins.iter_mut().find(|a| a.username == username) {
            admin.password_hash = password_hash.to_owned();
            return Ok(false);
        }

        let id = tables.next_id();
        tables.admins.push(Admin {
            id,
            username: username.to_owned(),
            password_hash: password_hash.to_owned(),
        });
        Ok(true)
    }

    async fn list_classes(&self) -> Result<Vec<ClassSummary>, AppError> {
        let tables = self.tables.read().await;

        Ok(tables
            .classes
            .iter()
            .map(|c| {
                let count = tables.students.iter().filter(|s| s.class_id == c.id).count();
                ClassSummary::new(c.clone(), count as i64)
            })
            .collect())
    }

    async fn get_class(&self, id: i64) -> Result<Option<Class>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.classes.iter().find(|c| c.id == id).cloned())
    }

    async fn create_class(&self, name: &str, code: &str) -> Result<Class, AppError> {
        let mut tables = self.tables.write().await;
        let class = Class {
            id: tables.next_id(),
            name: name.to_owned(),
            code: code.to_owned(),
            created_at: Utc::now(),
        };
        tables.classes.push(class.clone());
        Ok(class)
    }

    async fn update_class(
        &self,
        id: i64,
        name: Option<String>,
        code: Option<String>,
    ) -> Result<Option<Class>, AppError> {
        let mut tables = self.tables.write().await;

        let Some(class) = tables.classes.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        if let Some(name) = name {
            class.name = name;
        }
        if let Some(code) = code {
            class.code = code;
        }
        Ok(Some(class.clone()))
    }

    async fn delete_class(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;

        let before = tables.classes.len();
        tables.classes.retain(|c| c.id != id);
        if tables.classes.len() == before {
            return Ok(false);
        }

        let exercise_ids: Vec<i64> = tables
            .exercises
            .iter()
            .filter(|e| e.class_id == id)
            .map(|e| e.id)
            .collect();
        tables.students.retain(|s| s.class_id != id);
        tables.exercises.retain(|e| e.class_id != id);
        tables
            .completions
            .retain(|c| !exercise_ids.contains(&c.exercise_id));
        Ok(true)
    }

    async fn count_students(&self, class_id: i64) -> Result<i64, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.students.iter().filter(|s| s.class_id == class_id).count() as i64)
    }

    async fn list_students(&self, class_id: i64) -> Result<Vec<Student>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .students
            .iter()
            .filter(|s| s.class_id == class_id)
            .cloned()
            .collect())
    }

    async fn find_student_by_email(
        &self,
        class_id: i64,
        email: &str,
    ) -> Result<Option<Student>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .students
            .iter()
            .find(|s| s.class_id == class_id && s.email == email)
            .cloned())
    }

    async fn create_student(
        &self,
        class_id: i64,
        name: &str,
        email: &str,
    ) -> Result<Student, AppError> {
        let mut tables = self.tables.write().await;

        if !tables.classes.iter().any(|c| c.id == class_id) {
            return Err(AppError::NotFound("Class not found".to_string()));
        }
        if tables
            .students
            .iter()
            .any(|s| s.class_id == class_id && s.email == email)
        {
            return Err(AppError::Conflict(format!(
                "Email '{}' is already enrolled in this class",
                email
            )));
        }

        let student = Student {
            id: tables.next_id(),
            email: email.to_owned(),
            name: name.to_owned(),
            class_id,
        };
        tables.students.push(student.clone());
        Ok(student)
    }

    async fn delete_student(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        let before = tables.students.len();
        tables.students.retain(|s| s.id != id);
        Ok(tables.students.len() != before)
    }

    async fn list_exercises(&self, class_id: i64) -> Result<Vec<Exercise>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .exercises
            .iter()
            .filter(|e| e.class_id == class_id)
            .cloned()
            .collect())
    }

    async fn list_exercise_summaries(&self, class_id: i64) -> Result<Vec<ExerciseSummary>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .exercises
            .iter()
            .filter(|e| e.class_id == class_id)
            .map(|e| ExerciseSummary {
                exercise: e.clone(),
                completion_count: tables
                    .completions
                    .iter()
                    .filter(|c| c.exercise_id == e.id)
                    .count() as i64,
            })
            .collect())
    }

    async fn get_exercise(&self, id: i64) -> Result<Option<Exercise>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.exercises.iter().find(|e| e.id == id).cloned())
    }

    async fn find_exercise_by_token(&self, qr_token: &str) -> Result<Option<Exercise>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.exercises.iter().find(|e| e.qr_token == qr_token).cloned())
    }

    async fn create_exercise(
        &self,
        class_id: i64,
        name: &str,
        qr_token: &str,
    ) -> Result<Exercise, AppError> {
        let mut tables = self.tables.write().await;

        if !tables.classes.iter().any(|c| c.id == class_id) {
            return Err(AppError::NotFound("Class not found".to_string()));
        }
        if tables.exercises.iter().any(|e| e.qr_token == qr_token) {
            return Err(AppError::Conflict("QR token already in use".to_string()));
        }

        let exercise = Exercise {
            id: tables.next_id(),
            name: name.to_owned(),
            class_id,
            qr_token: qr_token.to_owned(),
            created_at: Utc::now(),
        };
        tables.exercises.push(exercise.clone());
        Ok(exercise)
    }

    async fn delete_exercise(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        let before = tables.exercises.len();
        tables.exercises.retain(|e| e.id != id);
        if tables.exercises.len() == before {
            return Ok(false);
        }
        tables.completions.retain(|c| c.exercise_id != id);
        Ok(true)
    }

    async fn list_completions(&self, exercise_id: i64) -> Result<Vec<Completion>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .completions
            .iter()
            .filter(|c| c.exercise_id == exercise_id)
            .cloned()
            .collect())
    }

    async fn insert_completion(&self, new: NewCompletion) -> Result<Option<Completion>, AppError> {
        let mut tables = self.tables.write().await;

        if !tables.exercises.iter().any(|e| e.id == new.exercise_id) {
            return Err(AppError::NotFound("Exercise not found".to_string()));
        }
        if tables
            .completions
            .iter()
            .any(|c| c.student_id == new.student_id && c.exercise_id == new.exercise_id)
        {
            return Ok(None);
        }

        let completion = Completion {
            id: tables.next_id(),
            student_id: new.student_id,
            exercise_id: new.exercise_id,
            student_email: new.student_email,
            completed_at: new.completed_at,
        };
        tables.completions.push(completion.clone());
        Ok(Some(completion))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completion(student_id: i64, exercise_id: i64) -> NewCompletion {
        NewCompletion {
            student_id,
            exercise_id,
            student_email: "a@x.com".to_string(),
            completed_at: "2024-01-05T10:00:00Z".to_string(),
        }
    }

    #[tokio::test]
    async fn second_completion_for_same_pair_is_rejected() {
        let store = MemoryStore::new();
        let class = store.create_class("Math101", "M1").await.unwrap();
        let student = store.create_student(class.id, "Alice", "a@x.com").await.unwrap();
        let exercise = store.create_exercise(class.id, "HW1", "tok").await.unwrap();

        let first = store.insert_completion(completion(student.id, exercise.id)).await.unwrap();
        let second = store.insert_completion(completion(student.id, exercise.id)).await.unwrap();

        assert!(first.is_some());
        assert!(second.is_none());
        assert_eq!(store.list_completions(exercise.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn deleting_student_keeps_completions() {
        let store = MemoryStore::new();
        let class = store.create_class("Math101", "M1").await.unwrap();
        let student = store.create_student(class.id, "Alice", "a@x.com").await.unwrap();
        let exercise = store.create_exercise(class.id, "HW1", "tok").await.unwrap();
        store.insert_completion(completion(student.id, exercise.id)).await.unwrap();

        assert!(store.delete_student(student.id).await.unwrap());
        assert_eq!(store.list_completions(exercise.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn deleting_class_cascades() {
        let store = MemoryStore::new();
        let class = store.create_class("Math101", "M1").await.unwrap();
        let student = store.create_student(class.id, "Alice", "a@x.com").await.unwrap();
        let exercise = store.create_exercise(class.id, "HW1", "tok").await.unwrap();
        store.insert_completion(completion(student.id, exercise.id)).await.unwrap();

        assert!(store.delete_class(class.id).await.unwrap());
        assert!(store.list_students(class.id).await.unwrap().is_empty());
        assert!(store.get_exercise(exercise.id).await.unwrap().is_none());
        assert!(store.list_completions(exercise.id).await.unwrap().is_empty());
        assert!(!store.delete_class(class.id).await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_email_in_class_conflicts() {
        let store = MemoryStore::new();
        let class = store.create_class("Math101", "M1").await.unwrap();
        let other = store.create_class("Bio", "B1").await.unwrap();
        store.create_student(class.id, "Alice", "a@x.com").await.unwrap();

        let dup = store.create_student(class.id, "Alice 2", "a@x.com").await;
        assert!(matches!(dup, Err(AppError::Conflict(_))));

        // same address in another class is fine
        store.create_student(other.id, "Alice", "a@x.com").await.unwrap();
    }

    #[tokio::test]
    async fn upsert_admin_replaces_hash() {
        let store = MemoryStore::new();
        assert!(store.upsert_admin("admin", "h1").await.unwrap());
        assert!(!store.upsert_admin("admin", "h2").await.unwrap());

        let admin = store.find_admin("admin").await.unwrap().unwrap();
        assert_eq!(admin.password_hash, "h2");
    }
}
