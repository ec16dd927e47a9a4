//! 活动实体

use eventrax_common::{AuditInfo, EventId, UserId};
use serde::{Deserialize, Serialize};

use crate::domain::policy::EventOwnership;

/// 活动实体
///
/// `creator_id` 为原始创建者，创建后不可变；`assigned_creator_id` 可由管理员重新指派。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub description: Option<String>,
    pub creator_id: UserId,
    pub assigned_creator_id: Option<UserId>,
    pub audit_info: AuditInfo,
}

impl Event {
    pub fn new(title: String, description: Option<String>, creator_id: UserId) -> Self {
        Self {
            id: EventId::new(),
            title,
            description,
            creator_id,
            assigned_creator_id: None,
            audit_info: AuditInfo::new(Some(creator_id)),
        }
    }

    pub fn ownership(&self) -> EventOwnership {
        EventOwnership {
            event_id: self.id,
            creator_id: self.creator_id,
            assigned_creator_id: self.assigned_creator_id,
        }
    }

    pub fn update_details(&mut self, title: String, description: Option<String>, by: UserId) {
        self.title = title;
        self.description = description;
        self.audit_info.update(Some(by));
    }

    /// 指派（或取消指派）负责创建者，返回之前的指派对象
    pub fn assign_creator(&mut self, creator: Option<UserId>, by: UserId) -> Option<UserId> {
        let previous = self.assigned_creator_id;
        self.assigned_creator_id = creator;
        self.audit_info.update(Some(by));
        previous
    }
}
