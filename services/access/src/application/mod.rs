//! 应用层模块

pub mod event;
pub mod guard;
mod lookup;
pub mod notification;
pub mod side_effects;
pub mod sub_event;
pub mod task;
pub mod user;
pub mod volunteer;

pub use event::{AuthorizationService, EventCommandHandler, EventResourceCheck};
pub use guard::{Grant, authorize};
pub use notification::{ListNotificationsQuery, NotificationHandler};
pub use sub_event::SubEventCommandHandler;
pub use task::TaskCommandHandler;
pub use user::{UserCommandHandler, UserQueryHandler};
pub use volunteer::VolunteerCommandHandler;
