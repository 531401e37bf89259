// src/export/mod.rs

//! Class-wide completion report.
//!
//! `fetch` gathers the records for one class, `matrix` pivots them into one
//! row per student, and `render` turns the result into CSV text.

pub mod fetch;
pub mod matrix;
pub mod render;

pub use fetch::{ClassSnapshot, fetch_class_snapshot};
pub use matrix::{CompletionMatrix, MatrixRow, build_matrix};
pub use render::{render_class_report, render_exercise_report};
