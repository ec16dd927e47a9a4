//! 活动管理

pub mod commands;
pub mod handlers;
pub mod service;

pub use commands::*;
pub use handlers::EventCommandHandler;
pub use service::{AuthorizationService, EventResourceCheck};
