// File: ./src/client/mod.rs
pub mod auth;
pub mod core;
pub mod query;
pub mod transport;

pub use auth::{AccessHandle, Authenticator, Token, TASKS_READONLY_SCOPE, TASKS_SCOPE};
pub use core::TasqClient;
pub use query::{Filter, ListTasksQuery, Sort};
pub use transport::{FetchOutcome, HttpTransport, Transport, DEFAULT_BASE_URL};
