//! 授权检查服务
//!
//! 供活动附属资源（经费、奖项、公告）的外部写入方调用，
//! 只返回决策，不执行任何写入。

use std::sync::Arc;

use eventrax_common::EventId;
use eventrax_errors::AppResult;

use crate::application::guard;
use crate::domain::UnitOfWorkFactory;
use crate::domain::event::Event;
use crate::domain::policy::{Actor, Decision, EventResource, Operation, ResourceAction};

/// 活动附属资源检查请求
#[derive(Debug, Clone)]
pub struct EventResourceCheck {
    pub event_id: EventId,
    pub resource: EventResource,
    pub action: ResourceAction,
}

/// 授权服务
pub struct AuthorizationService {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
}

impl AuthorizationService {
    pub fn new(uow_factory: Arc<dyn UnitOfWorkFactory>) -> Self {
        Self { uow_factory }
    }

    /// 执行授权检查
    ///
    /// 每次调用都重新查询所有权事实，不缓存。
    pub async fn check(
        &self,
        actor: Option<&Actor>,
        request: EventResourceCheck,
    ) -> AppResult<Decision> {
        let uow = self.uow_factory.begin().await?;
        let event = uow.events().find_by_id(&request.event_id).await?;
        uow.rollback().await?;

        Ok(guard::evaluate(
            actor,
            &Operation::ManageEventResource {
                resource: request.resource,
                action: request.action,
                event: event.as_ref().map(Event::ownership),
            },
        ))
    }
}
