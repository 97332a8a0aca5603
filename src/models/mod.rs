// src/models/mod.rs

pub mod question;
pub mod student;
pub mod submission;
