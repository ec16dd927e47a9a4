//! 用户实体

use eventrax_common::{AuditInfo, UserId};
use eventrax_errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::domain::policy::UserFacts;

/// 用户角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Creator,
    #[serde(rename = "teamlead")]
    TeamLead,
    Student,
}

impl Role {
    /// 角色层级: 该角色可以向哪些角色分配任务/职位
    ///
    /// 团队负责人对学生的分配额外受限于其当前负责的子活动，由策略评估器校验。
    pub fn assignable_targets(&self) -> &'static [Role] {
        match self {
            Role::Admin => &[Role::Creator, Role::TeamLead],
            Role::Creator => &[Role::TeamLead, Role::Student],
            Role::TeamLead => &[Role::Student],
            Role::Student => &[],
        }
    }

    pub fn may_assign_to(&self, target: Role) -> bool {
        self.assignable_targets().contains(&target)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Creator => "creator",
            Role::TeamLead => "teamlead",
            Role::Student => "student",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "creator" => Ok(Role::Creator),
            "teamlead" | "team_lead" => Ok(Role::TeamLead),
            "student" => Ok(Role::Student),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// 用户状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Pending,
    Active,
    Suspended,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Pending => "pending",
            UserStatus::Active => "active",
            UserStatus::Suspended => "suspended",
        }
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(UserStatus::Pending),
            "active" => Ok(UserStatus::Active),
            "suspended" => Ok(UserStatus::Suspended),
            _ => Err(format!("Unknown user status: {}", s)),
        }
    }
}

/// 用户实体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub status: UserStatus,
    pub audit_info: AuditInfo,
}

impl User {
    /// 新注册用户，等待审核
    pub fn register(name: String, email: String, role: Role) -> Self {
        Self {
            id: UserId::new(),
            name,
            email,
            role,
            status: UserStatus::Pending,
            audit_info: AuditInfo::default(),
        }
    }

    pub fn facts(&self) -> UserFacts {
        UserFacts {
            id: self.id,
            role: self.role,
            status: self.status,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }

    pub fn is_pending(&self) -> bool {
        self.status == UserStatus::Pending
    }

    /// 审核通过: pending -> active
    pub fn approve(&mut self, by: UserId) -> AppResult<()> {
        self.ensure_pending()?;
        self.status = UserStatus::Active;
        self.audit_info.update(Some(by));
        Ok(())
    }

    pub fn ensure_pending(&self) -> AppResult<()> {
        if !self.is_pending() {
            return Err(AppError::failed_precondition(format!(
                "User {} is not pending approval (status: {})",
                self.id, self.status
            )));
        }
        Ok(())
    }

    /// 停用: active -> suspended
    pub fn suspend(&mut self, by: UserId) -> AppResult<()> {
        if self.status != UserStatus::Active {
            return Err(AppError::failed_precondition(format!(
                "Only active users can be suspended (status: {})",
                self.status
            )));
        }
        self.status = UserStatus::Suspended;
        self.audit_info.update(Some(by));
        Ok(())
    }

    /// 恢复: suspended -> active
    pub fn reactivate(&mut self, by: UserId) -> AppResult<()> {
        if self.status != UserStatus::Suspended {
            return Err(AppError::failed_precondition(format!(
                "Only suspended users can be reactivated (status: {})",
                self.status
            )));
        }
        self.status = UserStatus::Active;
        self.audit_info.update(Some(by));
        Ok(())
    }

    pub fn change_role(&mut self, role: Role, by: UserId) {
        self.role = role;
        self.audit_info.update(Some(by));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending_student() -> User {
        User::register(
            "Asha".to_string(),
            "asha@campus.edu".to_string(),
            Role::Student,
        )
    }

    #[test]
    fn test_role_hierarchy() {
        assert!(Role::Admin.may_assign_to(Role::Creator));
        assert!(Role::Admin.may_assign_to(Role::TeamLead));
        assert!(!Role::Admin.may_assign_to(Role::Student));
        assert!(Role::Creator.may_assign_to(Role::TeamLead));
        assert!(Role::Creator.may_assign_to(Role::Student));
        assert!(!Role::Creator.may_assign_to(Role::Admin));
        assert!(Role::TeamLead.may_assign_to(Role::Student));
        assert!(!Role::TeamLead.may_assign_to(Role::TeamLead));
        assert!(Role::Student.assignable_targets().is_empty());
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("teamlead".parse::<Role>().unwrap(), Role::TeamLead);
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("owner".parse::<Role>().is_err());
        assert_eq!(Role::TeamLead.to_string(), "teamlead");
    }

    #[test]
    fn test_approve_pending_user() {
        let mut user = pending_student();
        let admin = UserId::new();

        user.approve(admin).unwrap();
        assert!(user.is_active());
        assert_eq!(user.audit_info.updated_by, Some(admin));

        // 已激活用户不能再次审核
        assert!(user.approve(admin).is_err());
    }

    #[test]
    fn test_suspend_and_reactivate() {
        let mut user = pending_student();
        let admin = UserId::new();

        assert!(user.suspend(admin).is_err());

        user.approve(admin).unwrap();
        user.suspend(admin).unwrap();
        assert_eq!(user.status, UserStatus::Suspended);

        user.reactivate(admin).unwrap();
        assert!(user.is_active());
        assert!(user.reactivate(admin).is_err());
    }
}
