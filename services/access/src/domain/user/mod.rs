//! 用户领域模块

#![allow(clippy::module_inception)]

pub mod repository;
pub mod user;

pub use repository::UserRepository;
pub use user::{Role, User, UserStatus};
