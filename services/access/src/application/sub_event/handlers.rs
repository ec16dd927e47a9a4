//! 子活动命令处理器

use std::sync::Arc;

use eventrax_errors::{AppError, AppResult};
use tracing::info;

use super::commands::*;
use crate::application::guard::authorize;
use crate::application::lookup::load_sub_event;
use crate::application::side_effects::apply_side_effects;
use crate::domain::event::{Event, ScheduleProposal, SubEvent};
use crate::domain::policy::{Actor, Operation};
use crate::domain::user::User;
use crate::domain::{UnitOfWork, UnitOfWorkFactory};

/// 子活动命令处理器
pub struct SubEventCommandHandler {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
}

impl SubEventCommandHandler {
    pub fn new(uow_factory: Arc<dyn UnitOfWorkFactory>) -> Self {
        Self { uow_factory }
    }

    /// 创建子活动
    pub async fn handle_create(
        &self,
        actor: Option<&Actor>,
        cmd: CreateSubEventCommand,
    ) -> AppResult<SubEvent> {
        let uow = self.uow_factory.begin().await?;

        let event = uow.events().find_by_id(&cmd.event_id).await?;
        let grant = authorize(
            actor,
            &Operation::CreateSubEvent {
                event: event.as_ref().map(Event::ownership),
            },
        )?;

        if cmd.title.trim().is_empty() {
            return Err(AppError::validation("Sub-event title must not be empty"));
        }
        let sub_event = SubEvent::new(cmd.event_id, cmd.title, cmd.description, grant.actor.id);
        uow.sub_events().create(&sub_event).await?;
        uow.commit().await?;

        info!(sub_event_id = %sub_event.id, event_id = %sub_event.event_id, "Sub-event created");
        Ok(sub_event)
    }

    /// 更新子活动（团队负责人无权修改结构）
    pub async fn handle_update(
        &self,
        actor: Option<&Actor>,
        cmd: UpdateSubEventCommand,
    ) -> AppResult<SubEvent> {
        let uow = self.uow_factory.begin().await?;

        let loaded = load_sub_event(&*uow, &cmd.sub_event_id).await?;
        let grant = authorize(
            actor,
            &Operation::EditSubEvent {
                sub_event: loaded.as_ref().map(|(_, ownership)| *ownership),
            },
        )?;
        let (mut sub_event, _) = loaded.ok_or_else(|| AppError::not_found("Sub-event not found"))?;
        check_version(&sub_event, cmd.expected_version)?;

        sub_event.update_details(cmd.title, cmd.description, grant.actor.id);
        save(&*uow, &mut sub_event).await?;
        uow.commit().await?;

        Ok(sub_event)
    }

    /// 删除子活动
    pub async fn handle_delete(
        &self,
        actor: Option<&Actor>,
        cmd: DeleteSubEventCommand,
    ) -> AppResult<()> {
        let uow = self.uow_factory.begin().await?;

        let loaded = load_sub_event(&*uow, &cmd.sub_event_id).await?;
        let grant = authorize(
            actor,
            &Operation::DeleteSubEvent {
                sub_event: loaded.as_ref().map(|(_, ownership)| *ownership),
            },
        )?;

        uow.sub_events().delete(&cmd.sub_event_id).await?;
        uow.commit().await?;

        info!(sub_event_id = %cmd.sub_event_id, deleted_by = %grant.actor.id, "Sub-event deleted");
        Ok(())
    }

    /// 指派团队负责人
    ///
    /// 旧负责人的降级与通知、新负责人的提升与通知、负责人字段的写入
    /// 在同一事务中完成；任一步失败则全部回滚。
    pub async fn handle_assign_team_lead(
        &self,
        actor: Option<&Actor>,
        cmd: AssignTeamLeadCommand,
    ) -> AppResult<SubEvent> {
        let uow = self.uow_factory.begin().await?;

        let loaded = load_sub_event(&*uow, &cmd.sub_event_id).await?;
        let lead = uow.users().find_by_id(&cmd.team_lead_id).await?;
        let grant = authorize(
            actor,
            &Operation::AssignTeamLead {
                sub_event: loaded.as_ref().map(|(_, ownership)| *ownership),
                new_lead: lead.as_ref().map(User::facts),
            },
        )?;
        let (mut sub_event, _) = loaded.ok_or_else(|| AppError::not_found("Sub-event not found"))?;
        check_version(&sub_event, cmd.expected_version)?;

        let previous = sub_event.assign_team_lead(Some(cmd.team_lead_id), grant.actor.id);
        save(&*uow, &mut sub_event).await?;
        apply_side_effects(&*uow, &grant.side_effects, grant.actor.id).await?;
        uow.commit().await?;

        info!(
            sub_event_id = %sub_event.id,
            team_lead_id = %cmd.team_lead_id,
            previous = ?previous,
            version = sub_event.version,
            "Team lead assigned"
        );
        Ok(sub_event)
    }

    /// 取消团队负责人
    pub async fn handle_unassign_team_lead(
        &self,
        actor: Option<&Actor>,
        cmd: UnassignTeamLeadCommand,
    ) -> AppResult<SubEvent> {
        let uow = self.uow_factory.begin().await?;

        let loaded = load_sub_event(&*uow, &cmd.sub_event_id).await?;
        let grant = authorize(
            actor,
            &Operation::UnassignTeamLead {
                sub_event: loaded.as_ref().map(|(_, ownership)| *ownership),
            },
        )?;
        let (mut sub_event, _) = loaded.ok_or_else(|| AppError::not_found("Sub-event not found"))?;
        check_version(&sub_event, cmd.expected_version)?;

        if sub_event.team_lead_id.is_none() {
            return Err(AppError::failed_precondition("Sub-event has no team lead"));
        }
        let previous = sub_event.assign_team_lead(None, grant.actor.id);
        save(&*uow, &mut sub_event).await?;
        apply_side_effects(&*uow, &grant.side_effects, grant.actor.id).await?;
        uow.commit().await?;

        info!(sub_event_id = %sub_event.id, previous = ?previous, "Team lead unassigned");
        Ok(sub_event)
    }

    /// 团队负责人提交日程提案
    pub async fn handle_propose_schedule(
        &self,
        actor: Option<&Actor>,
        cmd: ProposeScheduleCommand,
    ) -> AppResult<SubEvent> {
        let uow = self.uow_factory.begin().await?;

        let loaded = load_sub_event(&*uow, &cmd.sub_event_id).await?;
        let grant = authorize(
            actor,
            &Operation::ProposeSchedule {
                sub_event: loaded.as_ref().map(|(_, ownership)| *ownership),
            },
        )?;
        let (mut sub_event, _) = loaded.ok_or_else(|| AppError::not_found("Sub-event not found"))?;

        let proposal = ScheduleProposal::new(cmd.starts_at, cmd.ends_at, cmd.venue, grant.actor.id)?;
        sub_event.propose_schedule(proposal)?;
        save(&*uow, &mut sub_event).await?;
        apply_side_effects(&*uow, &grant.side_effects, grant.actor.id).await?;
        uow.commit().await?;

        info!(sub_event_id = %sub_event.id, "Schedule proposed");
        Ok(sub_event)
    }

    /// 活动所有者确认日程
    pub async fn handle_finalize_schedule(
        &self,
        actor: Option<&Actor>,
        cmd: FinalizeScheduleCommand,
    ) -> AppResult<SubEvent> {
        let uow = self.uow_factory.begin().await?;

        let loaded = load_sub_event(&*uow, &cmd.sub_event_id).await?;
        let grant = authorize(
            actor,
            &Operation::FinalizeSchedule {
                sub_event: loaded.as_ref().map(|(_, ownership)| *ownership),
            },
        )?;
        let (mut sub_event, _) = loaded.ok_or_else(|| AppError::not_found("Sub-event not found"))?;

        sub_event.finalize_schedule(grant.actor.id)?;
        save(&*uow, &mut sub_event).await?;
        apply_side_effects(&*uow, &grant.side_effects, grant.actor.id).await?;
        uow.commit().await?;

        info!(sub_event_id = %sub_event.id, "Schedule finalized");
        Ok(sub_event)
    }
}

fn check_version(sub_event: &SubEvent, expected: Option<i64>) -> AppResult<()> {
    match expected {
        Some(version) if version != sub_event.version => Err(AppError::conflict(format!(
            "Sub-event {} was modified concurrently (expected version {}, found {})",
            sub_event.id, version, sub_event.version
        ))),
        _ => Ok(()),
    }
}

/// 乐观锁写入，成功后推进内存中的版本号
async fn save(uow: &dyn UnitOfWork, sub_event: &mut SubEvent) -> AppResult<()> {
    uow.sub_events().update(sub_event).await?;
    sub_event.version += 1;
    Ok(())
}
