// src/repository/mod.rs
//
// Thin data-access objects over the SQLite pool. Each repository borrows the pool
// and returns domain types; row structs never leave this layer.

pub mod candidates;
pub mod exams;
pub mod interviews;
pub mod questions;
pub mod results;
pub mod users;

pub use candidates::CandidateRepository;
pub use exams::ExamRepository;
pub use interviews::InterviewRepository;
pub use questions::QuestionRepository;
pub use results::ResultRepository;
pub use users::UserRepository;
