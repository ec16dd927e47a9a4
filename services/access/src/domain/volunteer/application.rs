//! 志愿者申请实体

use chrono::{DateTime, Utc};
use eventrax_common::{ApplicationId, SubEventId, UserId};
use eventrax_errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::domain::policy::{ApplicationFacts, SubEventOwnership};

/// 申请角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationRole {
    Volunteer,
    #[serde(rename = "Team Lead")]
    TeamLead,
}

impl ApplicationRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationRole::Volunteer => "Volunteer",
            ApplicationRole::TeamLead => "Team Lead",
        }
    }
}

impl std::fmt::Display for ApplicationRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ApplicationRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Volunteer" => Ok(ApplicationRole::Volunteer),
            "Team Lead" | "TeamLead" => Ok(ApplicationRole::TeamLead),
            _ => Err(format!("Unknown application role: {}", s)),
        }
    }
}

/// 申请状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
    Removed,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Removed => "removed",
        }
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApplicationStatus::Pending),
            "approved" => Ok(ApplicationStatus::Approved),
            "rejected" => Ok(ApplicationStatus::Rejected),
            "removed" => Ok(ApplicationStatus::Removed),
            _ => Err(format!("Unknown application status: {}", s)),
        }
    }
}

/// 志愿者申请
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolunteerApplication {
    pub id: ApplicationId,
    pub student_id: UserId,
    pub sub_event_id: SubEventId,
    pub role: ApplicationRole,
    pub status: ApplicationStatus,
    pub motivation: Option<String>,
    pub applied_at: DateTime<Utc>,
    pub reviewed_by: Option<UserId>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl VolunteerApplication {
    pub fn submit(
        student_id: UserId,
        sub_event_id: SubEventId,
        role: ApplicationRole,
        motivation: Option<String>,
    ) -> Self {
        Self {
            id: ApplicationId::new(),
            student_id,
            sub_event_id,
            role,
            status: ApplicationStatus::Pending,
            motivation,
            applied_at: Utc::now(),
            reviewed_by: None,
            reviewed_at: None,
        }
    }

    /// 直接指派产生的已批准记录（不经过申请流程）
    pub fn assigned(
        user_id: UserId,
        sub_event_id: SubEventId,
        role: ApplicationRole,
        by: UserId,
    ) -> Self {
        let mut application = Self::submit(user_id, sub_event_id, role, None);
        application.status = ApplicationStatus::Approved;
        application.reviewed_by = Some(by);
        application.reviewed_at = Some(application.applied_at);
        application
    }

    pub fn facts(&self, sub_event: SubEventOwnership) -> ApplicationFacts {
        ApplicationFacts {
            application_id: self.id,
            student_id: self.student_id,
            role: self.role,
            sub_event,
        }
    }

    /// 未被移除的申请参与唯一性约束
    pub fn is_active(&self) -> bool {
        self.status != ApplicationStatus::Removed
    }

    pub fn approve(&mut self, by: UserId) -> AppResult<()> {
        self.review(ApplicationStatus::Approved, by)
    }

    pub fn reject(&mut self, by: UserId) -> AppResult<()> {
        self.review(ApplicationStatus::Rejected, by)
    }

    fn review(&mut self, outcome: ApplicationStatus, by: UserId) -> AppResult<()> {
        if self.status != ApplicationStatus::Pending {
            return Err(AppError::failed_precondition(format!(
                "Application {} has already been reviewed (status: {})",
                self.id, self.status
            )));
        }
        self.status = outcome;
        self.reviewed_by = Some(by);
        self.reviewed_at = Some(Utc::now());
        Ok(())
    }

    /// approved -> removed
    pub fn remove(&mut self, by: UserId) -> AppResult<()> {
        if self.status != ApplicationStatus::Approved {
            return Err(AppError::failed_precondition(format!(
                "Only approved applications can be removed (status: {})",
                self.status
            )));
        }
        self.status = ApplicationStatus::Removed;
        self.reviewed_by = Some(by);
        self.reviewed_at = Some(Utc::now());
        Ok(())
    }

    /// 将现有申请转为已批准的团队负责人记录
    pub fn promote_to_team_lead(&mut self, by: UserId) {
        self.role = ApplicationRole::TeamLead;
        self.status = ApplicationStatus::Approved;
        self.reviewed_by = Some(by);
        self.reviewed_at = Some(Utc::now());
    }
}
