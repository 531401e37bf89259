// src/export/matrix.rs

use std::collections::HashMap;

use super::fetch::ClassSnapshot;

/// One student's line in the class report.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixRow {
    pub student_id: i64,
    pub name: String,
    pub email: String,
    /// Stored completion timestamp per exercise name.
    pub completions: HashMap<String, String>,
    pub completed_count: usize,
    pub completion_rate: String,
}

impl MatrixRow {
    /// Timestamp recorded for `exercise_name`, if any.
    pub fn completed_at(&self, exercise_name: &str) -> Option<&str> {
        self.completions
            .get(exercise_name)
            .map(String::as_str)
            .filter(|ts| !ts.is_empty())
    }
}

/// Students pivoted against the exercises of a class.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionMatrix {
    pub class_name: String,
    /// Exercise names in column order.
    pub columns: Vec<String>,
    pub rows: Vec<MatrixRow>,
    pub total_students: usize,
    pub total_exercises: usize,
}

/// Builds the per-student completion matrix.
///
/// Columns follow the exercise order of the snapshot and rows follow the
/// student order. Completions whose student is not in the class are dropped.
/// Exercises are joined by name: when two exercises share a name, the one
/// later in the snapshot overwrites the earlier one's timestamp and both
/// columns show that value.
pub fn build_matrix(snapshot: &ClassSnapshot) -> CompletionMatrix {
    let mut rows: Vec<MatrixRow> = Vec::with_capacity(snapshot.students.len());
    let mut row_index: HashMap<i64, usize> = HashMap::with_capacity(snapshot.students.len());

    for student in &snapshot.students {
        if row_index.contains_key(&student.id) {
            continue;
        }
        row_index.insert(student.id, rows.len());
        rows.push(MatrixRow {
            student_id: student.id,
            name: student.name.clone(),
            email: student.email.clone(),
            completions: HashMap::new(),
            completed_count: 0,
            completion_rate: String::new(),
        });
    }

    for (exercise, completions) in snapshot.exercises.iter().zip(&snapshot.completions) {
        for completion in completions {
            let Some(&idx) = row_index.get(&completion.student_id) else {
                continue;
            };
            rows[idx]
                .completions
                .insert(exercise.name.clone(), completion.completed_at.clone());
        }
    }

    let columns: Vec<String> = snapshot.exercises.iter().map(|e| e.name.clone()).collect();
    let total_exercises = columns.len();

    for row in &mut rows {
        row.completed_count = columns
            .iter()
            .filter(|name| row.completed_at(name).is_some())
            .count();
        row.completion_rate = completion_rate(row.completed_count, total_exercises);
    }

    CompletionMatrix {
        class_name: snapshot.class.name.clone(),
        total_students: rows.len(),
        total_exercises,
        columns,
        rows,
    }
}

/// `completed / total` as a one-decimal percentage, or `"0%"` without exercises.
pub fn completion_rate(completed: usize, total: usize) -> String {
    if total == 0 {
        return "0%".to_string();
    }
    format!("{:.1}%", completed as f64 / total as f64 * 100.0)
}
