pub mod application;
pub mod portfolio;
pub mod resume;
pub mod user;
