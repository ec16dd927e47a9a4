//! 任务分配

pub mod commands;
pub mod handlers;

pub use commands::*;
pub use handlers::TaskCommandHandler;
