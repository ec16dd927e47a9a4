//! 志愿者申请与指派

pub mod commands;
pub mod handlers;

pub use commands::*;
pub use handlers::VolunteerCommandHandler;
