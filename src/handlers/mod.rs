// src/handlers/mod.rs

pub mod admin;
pub mod auth;
pub mod candidates;
pub mod exams;
pub mod interviews;
pub mod questions;
pub mod results;
