//! Job search through SearchAPI with local filtering.

pub mod filters;
pub mod handlers;
pub mod search;
