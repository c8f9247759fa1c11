//! MCQ generation through the aptitude RAG script.

pub mod handlers;
