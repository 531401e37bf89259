// src/models/mod.rs

pub mod admin;
pub mod class;
pub mod completion;
pub mod exercise;
pub mod student;
