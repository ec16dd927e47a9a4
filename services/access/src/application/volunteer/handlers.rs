//! 志愿者命令处理器

use std::sync::Arc;

use eventrax_errors::{AppError, AppResult};
use tracing::info;

use super::commands::*;
use crate::application::guard::authorize;
use crate::application::lookup::{load_application, load_sub_event};
use crate::application::side_effects::apply_side_effects;
use crate::domain::UnitOfWorkFactory;
use crate::domain::policy::{Actor, Operation};
use crate::domain::user::User;
use crate::domain::volunteer::{ApplicationRole, ApplicationStatus, VolunteerApplication};

/// 志愿者命令处理器
pub struct VolunteerCommandHandler {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
}

impl VolunteerCommandHandler {
    pub fn new(uow_factory: Arc<dyn UnitOfWorkFactory>) -> Self {
        Self { uow_factory }
    }

    /// 提交申请
    pub async fn handle_apply(
        &self,
        actor: Option<&Actor>,
        cmd: ApplyCommand,
    ) -> AppResult<VolunteerApplication> {
        let uow = self.uow_factory.begin().await?;

        let loaded = load_sub_event(&*uow, &cmd.sub_event_id).await?;
        let grant = authorize(
            actor,
            &Operation::ApplyAsVolunteer {
                sub_event: loaded.as_ref().map(|(_, ownership)| *ownership),
                role: cmd.role,
            },
        )?;

        if uow
            .volunteers()
            .find_active(&grant.actor.id, &cmd.sub_event_id)
            .await?
            .is_some()
        {
            return Err(AppError::conflict(
                "You have already applied to this sub-event",
            ));
        }

        let application =
            VolunteerApplication::submit(grant.actor.id, cmd.sub_event_id, cmd.role, cmd.motivation);
        uow.volunteers().create(&application).await?;
        uow.commit().await?;

        info!(
            application_id = %application.id,
            sub_event_id = %application.sub_event_id,
            role = %application.role,
            "Volunteer application submitted"
        );
        Ok(application)
    }

    /// 审核申请
    pub async fn handle_review(
        &self,
        actor: Option<&Actor>,
        cmd: ReviewApplicationCommand,
    ) -> AppResult<VolunteerApplication> {
        let uow = self.uow_factory.begin().await?;

        let loaded = load_application(&*uow, &cmd.application_id).await?;
        let grant = authorize(
            actor,
            &Operation::ReviewApplication {
                application: loaded.as_ref().map(|(_, facts)| *facts),
                approve: cmd.approve,
            },
        )?;
        let (mut application, _) =
            loaded.ok_or_else(|| AppError::not_found("Application not found"))?;

        if cmd.approve {
            application.approve(grant.actor.id)?;
            uow.volunteers()
                .add_member(&application.student_id, &application.sub_event_id, application.role)
                .await?;
        } else {
            application.reject(grant.actor.id)?;
        }
        uow.volunteers().update(&application).await?;
        apply_side_effects(&*uow, &grant.side_effects, grant.actor.id).await?;
        uow.commit().await?;

        info!(
            application_id = %application.id,
            status = %application.status,
            "Volunteer application reviewed"
        );
        Ok(application)
    }

    /// 移除志愿者
    ///
    /// 若被移除的是当前团队负责人的负责人申请，同时清空子活动的负责人。
    pub async fn handle_remove(
        &self,
        actor: Option<&Actor>,
        cmd: RemoveVolunteerCommand,
    ) -> AppResult<VolunteerApplication> {
        let uow = self.uow_factory.begin().await?;

        let loaded = load_application(&*uow, &cmd.application_id).await?;
        let grant = authorize(
            actor,
            &Operation::RemoveVolunteer {
                application: loaded.as_ref().map(|(_, facts)| *facts),
            },
        )?;
        let (mut application, facts) =
            loaded.ok_or_else(|| AppError::not_found("Application not found"))?;

        application.remove(grant.actor.id)?;
        uow.volunteers().update(&application).await?;
        uow.volunteers()
            .remove_member(&application.student_id, &application.sub_event_id, application.role)
            .await?;

        if application.role == ApplicationRole::TeamLead
            && facts.sub_event.is_led_by(&application.student_id)
        {
            let mut sub_event = uow
                .sub_events()
                .find_by_id(&application.sub_event_id)
                .await?
                .ok_or_else(|| AppError::not_found("Sub-event not found"))?;
            sub_event.assign_team_lead(None, grant.actor.id);
            uow.sub_events().update(&sub_event).await?;
        }

        apply_side_effects(&*uow, &grant.side_effects, grant.actor.id).await?;
        uow.commit().await?;

        info!(application_id = %application.id, "Volunteer removed");
        Ok(application)
    }

    /// 直接指派学生为志愿者
    ///
    /// 待审核的申请直接批准；没有申请时创建一条已批准记录。
    pub async fn handle_assign(
        &self,
        actor: Option<&Actor>,
        cmd: AssignVolunteerCommand,
    ) -> AppResult<VolunteerApplication> {
        let uow = self.uow_factory.begin().await?;

        let loaded = load_sub_event(&*uow, &cmd.sub_event_id).await?;
        let student = uow.users().find_by_id(&cmd.student_id).await?;
        let grant = authorize(
            actor,
            &Operation::AssignVolunteer {
                sub_event: loaded.as_ref().map(|(_, ownership)| *ownership),
                student: student.as_ref().map(User::facts),
            },
        )?;

        let application = match uow
            .volunteers()
            .find_active(&cmd.student_id, &cmd.sub_event_id)
            .await?
        {
            Some(mut pending) if pending.status == ApplicationStatus::Pending => {
                pending.approve(grant.actor.id)?;
                uow.volunteers().update(&pending).await?;
                pending
            }
            Some(existing) => {
                return Err(AppError::conflict(format!(
                    "Student already has a {} application for this sub-event",
                    existing.status
                )));
            }
            None => {
                let assigned = VolunteerApplication::assigned(
                    cmd.student_id,
                    cmd.sub_event_id,
                    ApplicationRole::Volunteer,
                    grant.actor.id,
                );
                uow.volunteers().create(&assigned).await?;
                assigned
            }
        };

        uow.volunteers()
            .add_member(&cmd.student_id, &cmd.sub_event_id, application.role)
            .await?;
        apply_side_effects(&*uow, &grant.side_effects, grant.actor.id).await?;
        uow.commit().await?;

        info!(
            application_id = %application.id,
            student_id = %cmd.student_id,
            "Volunteer assigned"
        );
        Ok(application)
    }
}
