//! 子活动相关命令定义

use chrono::{DateTime, Utc};
use eventrax_common::{EventId, SubEventId, UserId};

/// 创建子活动命令
#[derive(Debug, Clone)]
pub struct CreateSubEventCommand {
    pub event_id: EventId,
    pub title: String,
    pub description: Option<String>,
}

/// 更新子活动命令
#[derive(Debug, Clone)]
pub struct UpdateSubEventCommand {
    pub sub_event_id: SubEventId,
    pub title: String,
    pub description: Option<String>,
    /// 客户端读取时的版本，`None` 表示不做额外校验
    pub expected_version: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct DeleteSubEventCommand {
    pub sub_event_id: SubEventId,
}

/// 指派团队负责人命令
#[derive(Debug, Clone)]
pub struct AssignTeamLeadCommand {
    pub sub_event_id: SubEventId,
    pub team_lead_id: UserId,
    pub expected_version: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct UnassignTeamLeadCommand {
    pub sub_event_id: SubEventId,
    pub expected_version: Option<i64>,
}

/// 提交日程提案命令
#[derive(Debug, Clone)]
pub struct ProposeScheduleCommand {
    pub sub_event_id: SubEventId,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub venue: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FinalizeScheduleCommand {
    pub sub_event_id: SubEventId,
}
