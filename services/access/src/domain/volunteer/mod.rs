//! 志愿者申请领域模块

pub mod application;
pub mod repository;

pub use application::{ApplicationRole, ApplicationStatus, VolunteerApplication};
pub use repository::VolunteerRepository;
