// src/handlers/mod.rs

pub mod auth;
pub mod classes;
pub mod completion;
pub mod exercises;
pub mod export;
pub mod students;
