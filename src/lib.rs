// Crate root library declaration and module exports.
pub mod client;
pub mod config;
pub mod error;
pub mod model;

pub use client::{
    AccessHandle, Authenticator, FetchOutcome, Filter, HttpTransport, ListTasksQuery, Sort,
    TasqClient, Transport,
};
pub use error::{Error, Result};
pub use model::{Task, TaskCollection, TaskList, TaskStatus};
