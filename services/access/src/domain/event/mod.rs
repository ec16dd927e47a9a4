//! 活动与子活动领域模块

#![allow(clippy::module_inception)]

pub mod event;
pub mod repository;
pub mod sub_event;

pub use event::Event;
pub use repository::{EventRepository, SubEventRepository};
pub use sub_event::{Schedule, ScheduleProposal, SubEvent};
