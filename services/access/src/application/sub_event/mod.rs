//! 子活动、团队负责人与日程

pub mod commands;
pub mod handlers;

pub use commands::*;
pub use handlers::SubEventCommandHandler;
