//! 通知领域模块

#![allow(clippy::module_inception)]

pub mod notification;
pub mod repository;

pub use notification::{Notification, NotificationKind};
pub use repository::NotificationRepository;
