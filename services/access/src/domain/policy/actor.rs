//! 操作者上下文

use eventrax_common::UserId;
use serde::{Deserialize, Serialize};

use crate::domain::user::{Role, UserStatus};

/// 当前请求的操作者，由会话层提供并视为可信输入
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: UserId,
    pub role: Role,
    pub status: UserStatus,
}

impl Actor {
    pub fn new(id: UserId, role: Role, status: UserStatus) -> Self {
        Self { id, role, status }
    }

    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
