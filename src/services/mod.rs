// src/services/mod.rs

pub mod analytics;
pub mod exam_service;
pub mod generator;
pub mod grading;
pub mod scheduling;

pub use exam_service::ExamService;
pub use generator::{GenerationRequest, QuestionGenerator, TemplateGenerator};
