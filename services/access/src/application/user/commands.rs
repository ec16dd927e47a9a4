//! 用户相关命令定义

use eventrax_common::UserId;

use crate::domain::user::Role;

/// 审核注册申请命令
#[derive(Debug, Clone)]
pub struct ReviewRegistrationCommand {
    pub user_id: UserId,
    pub approve: bool,
}

/// 变更角色命令
#[derive(Debug, Clone)]
pub struct ChangeUserRoleCommand {
    pub user_id: UserId,
    pub role: Role,
}

#[derive(Debug, Clone)]
pub struct SuspendUserCommand {
    pub user_id: UserId,
}

#[derive(Debug, Clone)]
pub struct ReactivateUserCommand {
    pub user_id: UserId,
}

#[derive(Debug, Clone)]
pub struct DeleteUserCommand {
    pub user_id: UserId,
}
