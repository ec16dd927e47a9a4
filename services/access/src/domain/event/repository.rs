//! 活动仓储接口

use async_trait::async_trait;
use eventrax_common::{EventId, SubEventId};
use eventrax_errors::AppResult;

use super::event::Event;
use super::sub_event::SubEvent;

/// 活动仓储接口
#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create(&self, event: &Event) -> AppResult<()>;

    async fn update(&self, event: &Event) -> AppResult<()>;

    /// 删除活动（级联删除子活动）
    async fn delete(&self, id: &EventId) -> AppResult<()>;

    async fn find_by_id(&self, id: &EventId) -> AppResult<Option<Event>>;
}

/// 子活动仓储接口
#[async_trait]
pub trait SubEventRepository: Send + Sync {
    async fn create(&self, sub_event: &SubEvent) -> AppResult<()>;

    /// 乐观锁更新
    ///
    /// 仅当存储中的版本等于 `sub_event.version` 时写入，并将版本加一；
    /// 版本不一致时返回 `Conflict`。
    async fn update(&self, sub_event: &SubEvent) -> AppResult<()>;

    async fn delete(&self, id: &SubEventId) -> AppResult<()>;

    async fn find_by_id(&self, id: &SubEventId) -> AppResult<Option<SubEvent>>;
}
