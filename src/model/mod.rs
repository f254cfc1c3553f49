// File: ./src/model/mod.rs
pub mod item;
pub mod pipeline;

pub use item::{Task, TaskCollection, TaskList, TaskListPage, TaskPage, TaskStatus};
