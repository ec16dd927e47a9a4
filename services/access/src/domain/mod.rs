//! 领域层

pub mod event;
pub mod notification;
pub mod policy;
pub mod task;
pub mod unit_of_work;
pub mod user;
pub mod volunteer;

pub use unit_of_work::{UnitOfWork, UnitOfWorkFactory};
