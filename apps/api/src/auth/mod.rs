//! Accounts: registration, login, JWT bearer auth and OTP password reset.

pub mod handlers;
pub mod mailer;
pub mod otp;
pub mod password;
pub mod store;
pub mod token;
pub mod username;

pub use token::AuthUser;
