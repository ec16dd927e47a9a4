//! 所有权事实
//!
//! 由持久化层在评估前查询，评估器只消费这些快照，不做任何 I/O。

use eventrax_common::{ApplicationId, EventId, NotificationId, SubEventId, TaskId, UserId};

use crate::domain::user::{Role, UserStatus};
use crate::domain::volunteer::ApplicationRole;

/// 目标用户
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserFacts {
    pub id: UserId,
    pub role: Role,
    pub status: UserStatus,
}

/// 活动所有权链
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventOwnership {
    pub event_id: EventId,
    pub creator_id: UserId,
    pub assigned_creator_id: Option<UserId>,
}

impl EventOwnership {
    /// 原始创建者或当前指派的创建者
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        self.creator_id == *user_id || self.assigned_creator_id.as_ref() == Some(user_id)
    }
}

/// 子活动所有权链，经由父活动解析
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubEventOwnership {
    pub sub_event_id: SubEventId,
    pub event: EventOwnership,
    pub team_lead_id: Option<UserId>,
}

impl SubEventOwnership {
    pub fn is_led_by(&self, user_id: &UserId) -> bool {
        self.team_lead_id.as_ref() == Some(user_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskFacts {
    pub task_id: TaskId,
    pub assigned_to: UserId,
    pub assigned_by: UserId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplicationFacts {
    pub application_id: ApplicationId,
    pub student_id: UserId,
    pub role: ApplicationRole,
    pub sub_event: SubEventOwnership,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationFacts {
    pub notification_id: NotificationId,
    pub user_id: UserId,
}
