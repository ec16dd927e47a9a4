//! 志愿者相关命令定义

use eventrax_common::{ApplicationId, SubEventId, UserId};

use crate::domain::volunteer::ApplicationRole;

/// 提交申请命令
#[derive(Debug, Clone)]
pub struct ApplyCommand {
    pub sub_event_id: SubEventId,
    pub role: ApplicationRole,
    pub motivation: Option<String>,
}

/// 审核申请命令
#[derive(Debug, Clone)]
pub struct ReviewApplicationCommand {
    pub application_id: ApplicationId,
    pub approve: bool,
}

#[derive(Debug, Clone)]
pub struct RemoveVolunteerCommand {
    pub application_id: ApplicationId,
}

/// 直接指派志愿者命令
#[derive(Debug, Clone)]
pub struct AssignVolunteerCommand {
    pub sub_event_id: SubEventId,
    pub student_id: UserId,
}
