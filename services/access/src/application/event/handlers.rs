//! 活动命令处理器

use std::sync::Arc;

use eventrax_errors::{AppError, AppResult};
use tracing::info;

use super::commands::*;
use crate::application::guard::authorize;
use crate::application::side_effects::apply_side_effects;
use crate::domain::UnitOfWorkFactory;
use crate::domain::event::Event;
use crate::domain::policy::{Actor, Operation};
use crate::domain::user::User;

/// 活动命令处理器
pub struct EventCommandHandler {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
}

impl EventCommandHandler {
    pub fn new(uow_factory: Arc<dyn UnitOfWorkFactory>) -> Self {
        Self { uow_factory }
    }

    /// 创建活动
    pub async fn handle_create(
        &self,
        actor: Option<&Actor>,
        cmd: CreateEventCommand,
    ) -> AppResult<Event> {
        let grant = authorize(actor, &Operation::CreateEvent)?;

        if cmd.title.trim().is_empty() {
            return Err(AppError::validation("Event title must not be empty"));
        }

        let uow = self.uow_factory.begin().await?;
        let event = Event::new(cmd.title, cmd.description, grant.actor.id);
        uow.events().create(&event).await?;
        uow.commit().await?;

        info!(event_id = %event.id, creator_id = %event.creator_id, "Event created");
        Ok(event)
    }

    /// 更新活动
    pub async fn handle_update(
        &self,
        actor: Option<&Actor>,
        cmd: UpdateEventCommand,
    ) -> AppResult<Event> {
        let uow = self.uow_factory.begin().await?;

        let event = uow.events().find_by_id(&cmd.event_id).await?;
        let grant = authorize(
            actor,
            &Operation::EditEvent {
                event: event.as_ref().map(Event::ownership),
            },
        )?;
        let mut event = event.ok_or_else(|| AppError::not_found("Event not found"))?;

        if cmd.title.trim().is_empty() {
            return Err(AppError::validation("Event title must not be empty"));
        }
        event.update_details(cmd.title, cmd.description, grant.actor.id);
        uow.events().update(&event).await?;
        uow.commit().await?;

        Ok(event)
    }

    /// 删除活动
    pub async fn handle_delete(
        &self,
        actor: Option<&Actor>,
        cmd: DeleteEventCommand,
    ) -> AppResult<()> {
        let uow = self.uow_factory.begin().await?;

        let event = uow.events().find_by_id(&cmd.event_id).await?;
        let grant = authorize(
            actor,
            &Operation::DeleteEvent {
                event: event.as_ref().map(Event::ownership),
            },
        )?;

        uow.events().delete(&cmd.event_id).await?;
        uow.commit().await?;

        info!(event_id = %cmd.event_id, deleted_by = %grant.actor.id, "Event deleted");
        Ok(())
    }

    /// 指派负责创建者
    pub async fn handle_assign_creator(
        &self,
        actor: Option<&Actor>,
        cmd: AssignEventCreatorCommand,
    ) -> AppResult<Event> {
        let uow = self.uow_factory.begin().await?;

        let event = uow.events().find_by_id(&cmd.event_id).await?;
        let creator = uow.users().find_by_id(&cmd.creator_id).await?;
        let grant = authorize(
            actor,
            &Operation::AssignEventCreator {
                event: event.as_ref().map(Event::ownership),
                new_creator: creator.as_ref().map(User::facts),
            },
        )?;
        let mut event = event.ok_or_else(|| AppError::not_found("Event not found"))?;

        let previous = event.assign_creator(Some(cmd.creator_id), grant.actor.id);
        uow.events().update(&event).await?;
        apply_side_effects(&*uow, &grant.side_effects, grant.actor.id).await?;
        uow.commit().await?;

        info!(
            event_id = %event.id,
            assigned_creator_id = %cmd.creator_id,
            previous = ?previous,
            "Event creator assigned"
        );
        Ok(event)
    }

    /// 取消指派负责创建者
    pub async fn handle_unassign_creator(
        &self,
        actor: Option<&Actor>,
        cmd: UnassignEventCreatorCommand,
    ) -> AppResult<Event> {
        let uow = self.uow_factory.begin().await?;

        let event = uow.events().find_by_id(&cmd.event_id).await?;
        let grant = authorize(
            actor,
            &Operation::UnassignEventCreator {
                event: event.as_ref().map(Event::ownership),
            },
        )?;
        let mut event = event.ok_or_else(|| AppError::not_found("Event not found"))?;

        if event.assigned_creator_id.is_none() {
            return Err(AppError::failed_precondition(
                "Event has no assigned creator",
            ));
        }
        event.assign_creator(None, grant.actor.id);
        uow.events().update(&event).await?;
        apply_side_effects(&*uow, &grant.side_effects, grant.actor.id).await?;
        uow.commit().await?;

        info!(event_id = %event.id, "Event creator unassigned");
        Ok(event)
    }
}
