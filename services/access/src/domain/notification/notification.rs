//! 通知实体

use chrono::{DateTime, Utc};
use eventrax_common::{ApplicationId, EventId, NotificationId, SubEventId, TaskId, UserId};
use serde::{Deserialize, Serialize};

use crate::domain::user::Role;

/// 通知类型
///
/// 通知只由授权决策的副作用产生，每种类型携带关联资源的 ID。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationKind {
    RegistrationApproved,
    RoleChanged { role: Role },
    ApplicationApproved { application_id: ApplicationId, sub_event_id: SubEventId },
    ApplicationRejected { application_id: ApplicationId, sub_event_id: SubEventId },
    VolunteerAssigned { sub_event_id: SubEventId },
    VolunteerRemoved { sub_event_id: SubEventId },
    TeamLeadAssigned { sub_event_id: SubEventId },
    TeamLeadRemoved { sub_event_id: SubEventId },
    EventCreatorAssigned { event_id: EventId },
    EventCreatorRemoved { event_id: EventId },
    ScheduleProposed { sub_event_id: SubEventId },
    ScheduleFinalized { sub_event_id: SubEventId },
    TaskAssigned { task_id: TaskId },
}

impl NotificationKind {
    pub fn type_code(&self) -> &'static str {
        match self {
            NotificationKind::RegistrationApproved => "registration_approved",
            NotificationKind::RoleChanged { .. } => "role_changed",
            NotificationKind::ApplicationApproved { .. } => "application_approved",
            NotificationKind::ApplicationRejected { .. } => "application_rejected",
            NotificationKind::VolunteerAssigned { .. } => "volunteer_assigned",
            NotificationKind::VolunteerRemoved { .. } => "volunteer_removed",
            NotificationKind::TeamLeadAssigned { .. } => "team_lead_assigned",
            NotificationKind::TeamLeadRemoved { .. } => "team_lead_removed",
            NotificationKind::EventCreatorAssigned { .. } => "event_creator_assigned",
            NotificationKind::EventCreatorRemoved { .. } => "event_creator_removed",
            NotificationKind::ScheduleProposed { .. } => "schedule_proposed",
            NotificationKind::ScheduleFinalized { .. } => "schedule_finalized",
            NotificationKind::TaskAssigned { .. } => "task_assigned",
        }
    }

    pub fn message(&self) -> String {
        match self {
            NotificationKind::RegistrationApproved => {
                "Your registration has been approved".to_string()
            }
            NotificationKind::RoleChanged { role } => format!("Your role has been changed to {}", role),
            NotificationKind::ApplicationApproved { .. } => {
                "Your volunteer application has been approved".to_string()
            }
            NotificationKind::ApplicationRejected { .. } => {
                "Your volunteer application has been rejected".to_string()
            }
            NotificationKind::VolunteerAssigned { .. } => {
                "You have been assigned as a volunteer".to_string()
            }
            NotificationKind::VolunteerRemoved { .. } => {
                "You have been removed from a sub-event's volunteers".to_string()
            }
            NotificationKind::TeamLeadAssigned { .. } => {
                "You have been assigned as team lead".to_string()
            }
            NotificationKind::TeamLeadRemoved { .. } => {
                "You have been removed as team lead".to_string()
            }
            NotificationKind::EventCreatorAssigned { .. } => {
                "You have been assigned to manage an event".to_string()
            }
            NotificationKind::EventCreatorRemoved { .. } => {
                "You are no longer assigned to manage an event".to_string()
            }
            NotificationKind::ScheduleProposed { .. } => {
                "A schedule proposal is waiting for your confirmation".to_string()
            }
            NotificationKind::ScheduleFinalized { .. } => {
                "Your proposed schedule has been finalized".to_string()
            }
            NotificationKind::TaskAssigned { .. } => "A new task has been assigned to you".to_string(),
        }
    }
}

/// 通知实体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub kind: NotificationKind,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(user_id: UserId, kind: NotificationKind) -> Self {
        Self {
            id: NotificationId::new(),
            user_id,
            message: kind.message(),
            kind,
            is_read: false,
            created_at: Utc::now(),
        }
    }

    pub fn mark_read(&mut self) {
        self.is_read = true;
    }
}
