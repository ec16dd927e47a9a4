//! 受控操作
//!
//! 每个变体携带评估所需的事实；事实为 `None` 表示引用的资源不存在。

use eventrax_common::TaskId;

use super::facts::{
    ApplicationFacts, EventOwnership, NotificationFacts, SubEventOwnership, TaskFacts, UserFacts,
};
use crate::domain::user::Role;
use crate::domain::volunteer::ApplicationRole;

/// 挂在活动下的附属资源，统一适用活动所有权规则
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResource {
    Expense,
    Prize,
    Announcement,
}

impl EventResource {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventResource::Expense => "expense",
            EventResource::Prize => "prize",
            EventResource::Announcement => "announcement",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceAction {
    Create,
    Edit,
    Delete,
}

impl ResourceAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceAction::Create => "create",
            ResourceAction::Edit => "edit",
            ResourceAction::Delete => "delete",
        }
    }
}

/// 任务归属范围
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskScope {
    /// 不挂在任何子活动下
    Unscoped,
    SubEvent(Option<SubEventOwnership>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    ReadOwnProfile,
    ReadNotifications,
    MarkNotificationRead {
        notification: Option<NotificationFacts>,
    },

    ReviewRegistration {
        target: Option<UserFacts>,
        approve: bool,
    },
    ChangeUserRole {
        target: Option<UserFacts>,
        new_role: Role,
    },
    SuspendUser {
        target: Option<UserFacts>,
    },
    ReactivateUser {
        target: Option<UserFacts>,
    },
    DeleteUser {
        target: Option<UserFacts>,
    },

    CreateEvent,
    EditEvent {
        event: Option<EventOwnership>,
    },
    DeleteEvent {
        event: Option<EventOwnership>,
    },
    AssignEventCreator {
        event: Option<EventOwnership>,
        new_creator: Option<UserFacts>,
    },
    UnassignEventCreator {
        event: Option<EventOwnership>,
    },
    ManageEventResource {
        resource: EventResource,
        action: ResourceAction,
        event: Option<EventOwnership>,
    },

    CreateSubEvent {
        event: Option<EventOwnership>,
    },
    EditSubEvent {
        sub_event: Option<SubEventOwnership>,
    },
    DeleteSubEvent {
        sub_event: Option<SubEventOwnership>,
    },
    AssignTeamLead {
        sub_event: Option<SubEventOwnership>,
        new_lead: Option<UserFacts>,
    },
    UnassignTeamLead {
        sub_event: Option<SubEventOwnership>,
    },
    ProposeSchedule {
        sub_event: Option<SubEventOwnership>,
    },
    FinalizeSchedule {
        sub_event: Option<SubEventOwnership>,
    },

    ApplyAsVolunteer {
        sub_event: Option<SubEventOwnership>,
        role: ApplicationRole,
    },
    ReviewApplication {
        application: Option<ApplicationFacts>,
        approve: bool,
    },
    RemoveVolunteer {
        application: Option<ApplicationFacts>,
    },
    AssignVolunteer {
        sub_event: Option<SubEventOwnership>,
        student: Option<UserFacts>,
    },

    CreateTask {
        task_id: TaskId,
        assignee: Option<UserFacts>,
        scope: TaskScope,
    },
    UpdateTaskStatus {
        task: Option<TaskFacts>,
    },
    EditTask {
        task: Option<TaskFacts>,
    },
    DeleteTask {
        task: Option<TaskFacts>,
    },
}

impl Operation {
    /// 稳定的操作名，用于日志与指标标签
    pub fn name(&self) -> &'static str {
        match self {
            Operation::ReadOwnProfile => "read_own_profile",
            Operation::ReadNotifications => "read_notifications",
            Operation::MarkNotificationRead { .. } => "mark_notification_read",
            Operation::ReviewRegistration { .. } => "review_registration",
            Operation::ChangeUserRole { .. } => "change_user_role",
            Operation::SuspendUser { .. } => "suspend_user",
            Operation::ReactivateUser { .. } => "reactivate_user",
            Operation::DeleteUser { .. } => "delete_user",
            Operation::CreateEvent => "create_event",
            Operation::EditEvent { .. } => "edit_event",
            Operation::DeleteEvent { .. } => "delete_event",
            Operation::AssignEventCreator { .. } => "assign_event_creator",
            Operation::UnassignEventCreator { .. } => "unassign_event_creator",
            Operation::ManageEventResource { .. } => "manage_event_resource",
            Operation::CreateSubEvent { .. } => "create_sub_event",
            Operation::EditSubEvent { .. } => "edit_sub_event",
            Operation::DeleteSubEvent { .. } => "delete_sub_event",
            Operation::AssignTeamLead { .. } => "assign_team_lead",
            Operation::UnassignTeamLead { .. } => "unassign_team_lead",
            Operation::ProposeSchedule { .. } => "propose_schedule",
            Operation::FinalizeSchedule { .. } => "finalize_schedule",
            Operation::ApplyAsVolunteer { .. } => "apply_as_volunteer",
            Operation::ReviewApplication { .. } => "review_application",
            Operation::RemoveVolunteer { .. } => "remove_volunteer",
            Operation::AssignVolunteer { .. } => "assign_volunteer",
            Operation::CreateTask { .. } => "create_task",
            Operation::UpdateTaskStatus { .. } => "update_task_status",
            Operation::EditTask { .. } => "edit_task",
            Operation::DeleteTask { .. } => "delete_task",
        }
    }

    /// 未激活账户也可执行的只读操作
    pub fn is_self_read(&self) -> bool {
        matches!(self, Operation::ReadOwnProfile | Operation::ReadNotifications)
    }
}
