//! Job application tracking.

pub mod handlers;
pub mod store;
