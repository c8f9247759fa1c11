//! ATS scoring of uploaded resumes against an optional job description.

pub mod handlers;
