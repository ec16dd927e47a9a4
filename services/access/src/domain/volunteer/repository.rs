//! 志愿者仓储接口

use async_trait::async_trait;
use eventrax_common::{ApplicationId, SubEventId, UserId};
use eventrax_errors::AppResult;

use super::application::{ApplicationRole, VolunteerApplication};

/// 志愿者申请与成员关系仓储接口
#[async_trait]
pub trait VolunteerRepository: Send + Sync {
    /// 创建申请
    ///
    /// 同一 (student, sub_event) 已存在未移除的申请时返回 `Conflict`。
    async fn create(&self, application: &VolunteerApplication) -> AppResult<()>;

    /// 更新申请的角色、状态与审核信息
    async fn update(&self, application: &VolunteerApplication) -> AppResult<()>;

    async fn find_by_id(&self, id: &ApplicationId) -> AppResult<Option<VolunteerApplication>>;

    /// 查找学生在子活动下唯一的未移除申请
    async fn find_active(
        &self,
        student_id: &UserId,
        sub_event_id: &SubEventId,
    ) -> AppResult<Option<VolunteerApplication>>;

    /// 添加成员关系（已存在时忽略）
    async fn add_member(
        &self,
        user_id: &UserId,
        sub_event_id: &SubEventId,
        role: ApplicationRole,
    ) -> AppResult<()>;

    /// 删除成员关系，返回受影响行数
    async fn remove_member(
        &self,
        user_id: &UserId,
        sub_event_id: &SubEventId,
        role: ApplicationRole,
    ) -> AppResult<u64>;
}
