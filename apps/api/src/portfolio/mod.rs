//! Portfolio builder: resume parsing, deployment, public pages.

pub mod data;
pub mod extract;
pub mod handlers;
pub mod llm_parse;
pub mod publish;
pub mod store;
