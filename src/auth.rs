//! Credential model: redacted token secrets plus the credential value and its builder.

pub mod credential;
pub mod secret;

pub use credential::*;
pub use secret::*;
