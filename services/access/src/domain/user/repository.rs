//! 用户仓储接口

use async_trait::async_trait;
use eventrax_common::UserId;
use eventrax_errors::AppResult;

use super::user::User;

/// 用户仓储接口
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// 根据 ID 查找用户
    async fn find_by_id(&self, id: &UserId) -> AppResult<Option<User>>;

    /// 更新用户角色与状态
    async fn update(&self, user: &User) -> AppResult<()>;

    /// 删除用户
    async fn delete(&self, id: &UserId) -> AppResult<()>;
}
