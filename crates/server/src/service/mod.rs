//! Business logic sitting between the HTTP handlers and the repositories.

pub mod user;

pub use user::{SignInInput, SignUpInput, UserError, UserService};
