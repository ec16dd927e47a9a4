//! 本人通知的读取与标记

pub mod handlers;

pub use handlers::{ListNotificationsQuery, NotificationHandler};
