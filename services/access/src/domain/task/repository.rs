//! 任务仓储接口

use async_trait::async_trait;
use eventrax_common::TaskId;
use eventrax_errors::AppResult;

use super::task::Task;

/// 任务仓储接口
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn create(&self, task: &Task) -> AppResult<()>;

    async fn update(&self, task: &Task) -> AppResult<()>;

    async fn delete(&self, id: &TaskId) -> AppResult<()>;

    async fn find_by_id(&self, id: &TaskId) -> AppResult<Option<Task>>;
}
