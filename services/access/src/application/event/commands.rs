//! 活动相关命令定义

use eventrax_common::{EventId, UserId};

/// 创建活动命令
#[derive(Debug, Clone)]
pub struct CreateEventCommand {
    pub title: String,
    pub description: Option<String>,
}

/// 更新活动命令
#[derive(Debug, Clone)]
pub struct UpdateEventCommand {
    pub event_id: EventId,
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DeleteEventCommand {
    pub event_id: EventId,
}

/// 指派负责创建者命令
#[derive(Debug, Clone)]
pub struct AssignEventCreatorCommand {
    pub event_id: EventId,
    pub creator_id: UserId,
}

#[derive(Debug, Clone)]
pub struct UnassignEventCreatorCommand {
    pub event_id: EventId,
}
