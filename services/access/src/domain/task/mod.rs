//! 任务领域模块

#![allow(clippy::module_inception)]

pub mod repository;
pub mod task;

pub use repository::TaskRepository;
pub use task::{Task, TaskStatus};
