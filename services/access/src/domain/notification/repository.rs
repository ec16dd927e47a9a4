//! 通知仓储接口

use async_trait::async_trait;
use eventrax_common::{NotificationId, Pagination, UserId};
use eventrax_errors::AppResult;

use super::notification::Notification;

/// 通知仓储接口
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn create(&self, notification: &Notification) -> AppResult<()>;

    async fn find_by_id(&self, id: &NotificationId) -> AppResult<Option<Notification>>;

    /// 按创建时间倒序列出用户的通知
    async fn list_for_user(
        &self,
        user_id: &UserId,
        unread_only: bool,
        pagination: &Pagination,
    ) -> AppResult<(Vec<Notification>, u64)>;

    async fn mark_read(&self, id: &NotificationId) -> AppResult<()>;
}
