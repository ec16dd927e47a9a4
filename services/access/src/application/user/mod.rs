//! 用户账户管理

pub mod commands;
pub mod handlers;
pub mod queries;

pub use commands::*;
pub use handlers::UserCommandHandler;
pub use queries::UserQueryHandler;
