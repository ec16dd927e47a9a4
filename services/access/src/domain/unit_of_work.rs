//! Unit of Work 模式
//!
//! 授权允许后，主写操作与决策产生的副作用（降级、提升、通知）
//! 必须在同一个事务中完成，要么全部生效，要么全部回滚。

use async_trait::async_trait;
use eventrax_errors::AppResult;

use crate::domain::event::{EventRepository, SubEventRepository};
use crate::domain::notification::NotificationRepository;
use crate::domain::task::TaskRepository;
use crate::domain::user::UserRepository;
use crate::domain::volunteer::VolunteerRepository;

/// Unit of Work trait
///
/// 协调多个 Repository 在同一事务中的操作。未提交即被丢弃时回滚。
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    fn users(&self) -> &dyn UserRepository;

    fn events(&self) -> &dyn EventRepository;

    fn sub_events(&self) -> &dyn SubEventRepository;

    fn volunteers(&self) -> &dyn VolunteerRepository;

    fn tasks(&self) -> &dyn TaskRepository;

    fn notifications(&self) -> &dyn NotificationRepository;

    /// 提交事务
    async fn commit(self: Box<Self>) -> AppResult<()>;

    /// 回滚事务
    async fn rollback(self: Box<Self>) -> AppResult<()>;
}

/// Unit of Work 工厂 trait
#[async_trait]
pub trait UnitOfWorkFactory: Send + Sync {
    /// 开始新的事务
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>>;
}
