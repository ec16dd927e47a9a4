//! 用户命令处理器

use std::sync::Arc;

use eventrax_errors::{AppError, AppResult};
use tracing::info;

use super::commands::*;
use crate::application::guard::authorize;
use crate::application::side_effects::apply_side_effects;
use crate::domain::UnitOfWorkFactory;
use crate::domain::policy::{Actor, Operation};
use crate::domain::user::User;

/// 用户命令处理器
pub struct UserCommandHandler {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
}

impl UserCommandHandler {
    pub fn new(uow_factory: Arc<dyn UnitOfWorkFactory>) -> Self {
        Self { uow_factory }
    }

    /// 审核注册
    ///
    /// 批准返回激活后的用户；拒绝会删除待审核的用户记录并返回 `None`。
    pub async fn handle_review_registration(
        &self,
        actor: Option<&Actor>,
        cmd: ReviewRegistrationCommand,
    ) -> AppResult<Option<User>> {
        let uow = self.uow_factory.begin().await?;

        let target = uow.users().find_by_id(&cmd.user_id).await?;
        let grant = authorize(
            actor,
            &Operation::ReviewRegistration {
                target: target.as_ref().map(User::facts),
                approve: cmd.approve,
            },
        )?;
        let mut user = target.ok_or_else(|| AppError::not_found("User not found"))?;

        if !cmd.approve {
            user.ensure_pending()?;
            uow.users().delete(&user.id).await?;
            apply_side_effects(&*uow, &grant.side_effects, grant.actor.id).await?;
            uow.commit().await?;
            info!(user_id = %user.id, reviewed_by = %grant.actor.id, "Registration rejected");
            return Ok(None);
        }

        user.approve(grant.actor.id)?;
        uow.users().update(&user).await?;
        apply_side_effects(&*uow, &grant.side_effects, grant.actor.id).await?;
        uow.commit().await?;

        info!(user_id = %user.id, reviewed_by = %grant.actor.id, "Registration approved");
        Ok(Some(user))
    }

    /// 变更用户角色
    pub async fn handle_change_role(
        &self,
        actor: Option<&Actor>,
        cmd: ChangeUserRoleCommand,
    ) -> AppResult<User> {
        let uow = self.uow_factory.begin().await?;

        let target = uow.users().find_by_id(&cmd.user_id).await?;
        let grant = authorize(
            actor,
            &Operation::ChangeUserRole {
                target: target.as_ref().map(User::facts),
                new_role: cmd.role,
            },
        )?;
        let mut user = target.ok_or_else(|| AppError::not_found("User not found"))?;

        let previous = user.role;
        user.change_role(cmd.role, grant.actor.id);
        uow.users().update(&user).await?;
        apply_side_effects(&*uow, &grant.side_effects, grant.actor.id).await?;
        uow.commit().await?;

        info!(
            user_id = %user.id,
            from = %previous,
            to = %user.role,
            "User role changed"
        );
        Ok(user)
    }

    /// 停用账户
    pub async fn handle_suspend(
        &self,
        actor: Option<&Actor>,
        cmd: SuspendUserCommand,
    ) -> AppResult<User> {
        let uow = self.uow_factory.begin().await?;

        let target = uow.users().find_by_id(&cmd.user_id).await?;
        let grant = authorize(
            actor,
            &Operation::SuspendUser {
                target: target.as_ref().map(User::facts),
            },
        )?;
        let mut user = target.ok_or_else(|| AppError::not_found("User not found"))?;

        user.suspend(grant.actor.id)?;
        uow.users().update(&user).await?;
        uow.commit().await?;

        info!(user_id = %user.id, suspended_by = %grant.actor.id, "User suspended");
        Ok(user)
    }

    /// 恢复账户
    pub async fn handle_reactivate(
        &self,
        actor: Option<&Actor>,
        cmd: ReactivateUserCommand,
    ) -> AppResult<User> {
        let uow = self.uow_factory.begin().await?;

        let target = uow.users().find_by_id(&cmd.user_id).await?;
        let grant = authorize(
            actor,
            &Operation::ReactivateUser {
                target: target.as_ref().map(User::facts),
            },
        )?;
        let mut user = target.ok_or_else(|| AppError::not_found("User not found"))?;

        user.reactivate(grant.actor.id)?;
        uow.users().update(&user).await?;
        uow.commit().await?;

        info!(user_id = %user.id, "User reactivated");
        Ok(user)
    }

    /// 删除账户
    pub async fn handle_delete(&self, actor: Option<&Actor>, cmd: DeleteUserCommand) -> AppResult<()> {
        let uow = self.uow_factory.begin().await?;

        let target = uow.users().find_by_id(&cmd.user_id).await?;
        let grant = authorize(
            actor,
            &Operation::DeleteUser {
                target: target.as_ref().map(User::facts),
            },
        )?;

        uow.users().delete(&cmd.user_id).await?;
        uow.commit().await?;

        info!(user_id = %cmd.user_id, deleted_by = %grant.actor.id, "User deleted");
        Ok(())
    }
}
