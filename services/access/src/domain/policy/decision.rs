//! 授权决策

use eventrax_common::{SubEventId, UserId};
use serde::{Deserialize, Serialize};

use crate::domain::notification::NotificationKind;

/// 拒绝原因
///
/// 核心层只返回原因，不关心传输层状态码。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// 没有有效的操作者上下文
    Unauthenticated,
    /// 已认证但账户未激活
    ForbiddenStatus,
    InsufficientOwnership,
    /// 该角色可对部分目标执行此类操作，但不包括当前目标角色
    RoleScopeViolation,
    SelfModificationDenied,
    AdminImmune,
    /// 引用的资源不存在
    NotFound,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Unauthenticated => "Unauthenticated",
            ErrorKind::ForbiddenStatus => "ForbiddenStatus",
            ErrorKind::InsufficientOwnership => "InsufficientOwnership",
            ErrorKind::RoleScopeViolation => "RoleScopeViolation",
            ErrorKind::SelfModificationDenied => "SelfModificationDenied",
            ErrorKind::AdminImmune => "AdminImmune",
            ErrorKind::NotFound => "NotFound",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 允许时必须与主写操作在同一事务中完成的附加写入
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SideEffect {
    /// 为用户插入一条系统通知
    #[serde(rename_all = "camelCase")]
    Notify {
        user_id: UserId,
        kind: NotificationKind,
    },
    /// 已批准的团队负责人申请转为 removed，并删除其负责人成员关系
    #[serde(rename_all = "camelCase")]
    DemoteTeamLead {
        user_id: UserId,
        sub_event_id: SubEventId,
    },
    /// 为新负责人写入已批准的团队负责人申请与成员关系
    #[serde(rename_all = "camelCase")]
    PromoteTeamLead {
        user_id: UserId,
        sub_event_id: SubEventId,
    },
}

impl SideEffect {
    pub fn notify(user_id: UserId, kind: NotificationKind) -> Self {
        SideEffect::Notify { user_id, kind }
    }
}

/// 评估结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub allowed: bool,
    pub reason: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub side_effects: Vec<SideEffect>,
}

impl Decision {
    pub fn allow() -> Self {
        Self::allow_with(Vec::new())
    }

    pub fn allow_with(side_effects: Vec<SideEffect>) -> Self {
        Self {
            allowed: true,
            reason: None,
            message: None,
            side_effects,
        }
    }

    pub fn deny(reason: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
            message: Some(message.into()),
            side_effects: Vec::new(),
        }
    }

    pub fn is_denied_with(&self, kind: ErrorKind) -> bool {
        !self.allowed && self.reason == Some(kind)
    }
}
