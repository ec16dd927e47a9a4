//! 用户查询

use std::sync::Arc;

use eventrax_errors::{AppError, AppResult};

use crate::application::guard::authorize;
use crate::domain::UnitOfWorkFactory;
use crate::domain::policy::{Actor, Operation};
use crate::domain::user::User;

pub struct UserQueryHandler {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
}

impl UserQueryHandler {
    pub fn new(uow_factory: Arc<dyn UnitOfWorkFactory>) -> Self {
        Self { uow_factory }
    }

    /// 读取本人资料（未激活账户同样可读）
    pub async fn get_profile(&self, actor: Option<&Actor>) -> AppResult<User> {
        let grant = authorize(actor, &Operation::ReadOwnProfile)?;
        let uow = self.uow_factory.begin().await?;
        let user = uow
            .users()
            .find_by_id(&grant.actor.id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;
        uow.rollback().await?;
        Ok(user)
    }
}
