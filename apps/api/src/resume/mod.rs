//! Resume building: validation, rendering, versioned storage.

pub mod data;
pub mod handlers;
pub mod pdf;
pub mod store;
pub mod validation;
