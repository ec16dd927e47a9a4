//! 通知处理器

use std::sync::Arc;

use eventrax_common::{NotificationId, PagedResult, Pagination};
use eventrax_errors::{AppError, AppResult};

use crate::application::guard::authorize;
use crate::domain::UnitOfWorkFactory;
use crate::domain::notification::Notification;
use crate::domain::policy::{Actor, NotificationFacts, Operation};

/// 列出本人通知
#[derive(Debug, Clone, Default)]
pub struct ListNotificationsQuery {
    pub unread_only: bool,
    pub pagination: Pagination,
}

pub struct NotificationHandler {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
}

impl NotificationHandler {
    pub fn new(uow_factory: Arc<dyn UnitOfWorkFactory>) -> Self {
        Self { uow_factory }
    }

    /// 列出本人通知（未激活账户同样可读）
    pub async fn list(
        &self,
        actor: Option<&Actor>,
        query: ListNotificationsQuery,
    ) -> AppResult<PagedResult<Notification>> {
        let grant = authorize(actor, &Operation::ReadNotifications)?;

        let uow = self.uow_factory.begin().await?;
        let (items, total) = uow
            .notifications()
            .list_for_user(&grant.actor.id, query.unread_only, &query.pagination)
            .await?;
        uow.rollback().await?;

        Ok(PagedResult::new(items, total, &query.pagination))
    }

    /// 标记通知为已读
    pub async fn mark_read(
        &self,
        actor: Option<&Actor>,
        notification_id: NotificationId,
    ) -> AppResult<Notification> {
        let uow = self.uow_factory.begin().await?;

        let notification = uow.notifications().find_by_id(&notification_id).await?;
        authorize(
            actor,
            &Operation::MarkNotificationRead {
                notification: notification.as_ref().map(|n| NotificationFacts {
                    notification_id: n.id,
                    user_id: n.user_id,
                }),
            },
        )?;
        let mut notification =
            notification.ok_or_else(|| AppError::not_found("Notification not found"))?;

        if !notification.is_read {
            notification.mark_read();
            uow.notifications().mark_read(&notification.id).await?;
        }
        uow.commit().await?;

        Ok(notification)
    }
}
