//! 子活动实体

use chrono::{DateTime, Utc};
use eventrax_common::{AuditInfo, EventId, SubEventId, UserId};
use eventrax_errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::domain::policy::{EventOwnership, SubEventOwnership};

/// 日程提案
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleProposal {
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub venue: Option<String>,
    pub proposed_by: UserId,
}

impl ScheduleProposal {
    pub fn new(
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
        venue: Option<String>,
        proposed_by: UserId,
    ) -> AppResult<Self> {
        if starts_at >= ends_at {
            return Err(AppError::validation(
                "Schedule must start before it ends",
            ));
        }
        Ok(Self {
            starts_at,
            ends_at,
            venue,
            proposed_by,
        })
    }
}

/// 子活动日程
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "proposal", rename_all = "lowercase")]
pub enum Schedule {
    /// 团队负责人已提交，等待活动所有者确认
    Proposed(ScheduleProposal),
    /// 已由活动所有者确认
    Finalized(ScheduleProposal),
}

impl Schedule {
    pub fn proposal(&self) -> &ScheduleProposal {
        match self {
            Schedule::Proposed(p) | Schedule::Finalized(p) => p,
        }
    }

    pub fn status_str(&self) -> &'static str {
        match self {
            Schedule::Proposed(_) => "proposed",
            Schedule::Finalized(_) => "finalized",
        }
    }

    pub fn is_finalized(&self) -> bool {
        matches!(self, Schedule::Finalized(_))
    }
}

/// 子活动实体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubEvent {
    pub id: SubEventId,
    pub event_id: EventId,
    pub title: String,
    pub description: Option<String>,
    pub team_lead_id: Option<UserId>,
    pub schedule: Option<Schedule>,
    /// 乐观锁版本号
    pub version: i64,
    pub audit_info: AuditInfo,
}

impl SubEvent {
    pub fn new(event_id: EventId, title: String, description: Option<String>, by: UserId) -> Self {
        Self {
            id: SubEventId::new(),
            event_id,
            title,
            description,
            team_lead_id: None,
            schedule: None,
            version: 0,
            audit_info: AuditInfo::new(Some(by)),
        }
    }

    /// 结合父活动的所有权构造子活动所有权事实
    pub fn ownership(&self, event: EventOwnership) -> SubEventOwnership {
        SubEventOwnership {
            sub_event_id: self.id,
            event,
            team_lead_id: self.team_lead_id,
        }
    }

    pub fn update_details(&mut self, title: String, description: Option<String>, by: UserId) {
        self.title = title;
        self.description = description;
        self.audit_info.update(Some(by));
    }

    /// 设置团队负责人，返回之前的负责人
    pub fn assign_team_lead(&mut self, lead: Option<UserId>, by: UserId) -> Option<UserId> {
        let previous = self.team_lead_id;
        self.team_lead_id = lead;
        self.audit_info.update(Some(by));
        previous
    }

    /// 提交日程提案，已确认的日程不可再修改
    pub fn propose_schedule(&mut self, proposal: ScheduleProposal) -> AppResult<()> {
        if self.schedule.as_ref().is_some_and(Schedule::is_finalized) {
            return Err(AppError::failed_precondition(
                "Schedule has already been finalized",
            ));
        }
        let by = proposal.proposed_by;
        self.schedule = Some(Schedule::Proposed(proposal));
        self.audit_info.update(Some(by));
        Ok(())
    }

    /// 确认日程提案
    pub fn finalize_schedule(&mut self, by: UserId) -> AppResult<()> {
        match self.schedule.take() {
            Some(Schedule::Proposed(proposal)) => {
                self.schedule = Some(Schedule::Finalized(proposal));
                self.audit_info.update(Some(by));
                Ok(())
            }
            other => {
                self.schedule = other;
                Err(AppError::failed_precondition(
                    "No pending schedule proposal to finalize",
                ))
            }
        }
    }
}
