//! Token and credential models returned by the directory.

pub mod secret;
pub mod tokens;
