//! 决策副作用的执行
//!
//! 副作用在调用方的 Unit of Work 中按顺序写入；任何一步失败都会使
//! 整个事务回滚，不会留下部分状态。

use eventrax_common::UserId;
use eventrax_errors::{AppError, AppResult};
use tracing::debug;

use crate::domain::UnitOfWork;
use crate::domain::notification::Notification;
use crate::domain::policy::SideEffect;
use crate::domain::volunteer::{ApplicationRole, ApplicationStatus, VolunteerApplication};

pub async fn apply_side_effects(
    uow: &dyn UnitOfWork,
    effects: &[SideEffect],
    performed_by: UserId,
) -> AppResult<()> {
    for effect in effects {
        match effect {
            SideEffect::Notify { user_id, kind } => {
                let notification = Notification::new(*user_id, kind.clone());
                uow.notifications().create(&notification).await?;
                debug!(
                    user_id = %user_id,
                    kind = kind.type_code(),
                    "Notification queued"
                );
            }
            SideEffect::DemoteTeamLead {
                user_id,
                sub_event_id,
            } => {
                let mut application = match uow.volunteers().find_active(user_id, sub_event_id).await? {
                    Some(application)
                        if application.role == ApplicationRole::TeamLead
                            && application.status == ApplicationStatus::Approved =>
                    {
                        application
                    }
                    _ => {
                        return Err(AppError::failed_precondition(format!(
                            "User {} has no approved team lead application for sub-event {}",
                            user_id, sub_event_id
                        )));
                    }
                };
                application.remove(performed_by)?;
                uow.volunteers().update(&application).await?;

                let removed = uow
                    .volunteers()
                    .remove_member(user_id, sub_event_id, ApplicationRole::TeamLead)
                    .await?;
                if removed == 0 {
                    return Err(AppError::failed_precondition(format!(
                        "User {} has no team lead membership for sub-event {}",
                        user_id, sub_event_id
                    )));
                }
                debug!(user_id = %user_id, sub_event_id = %sub_event_id, "Team lead demoted");
            }
            SideEffect::PromoteTeamLead {
                user_id,
                sub_event_id,
            } => {
                match uow.volunteers().find_active(user_id, sub_event_id).await? {
                    Some(mut application) => {
                        application.promote_to_team_lead(performed_by);
                        uow.volunteers().update(&application).await?;
                    }
                    None => {
                        let application = VolunteerApplication::assigned(
                            *user_id,
                            *sub_event_id,
                            ApplicationRole::TeamLead,
                            performed_by,
                        );
                        uow.volunteers().create(&application).await?;
                    }
                }
                uow.volunteers()
                    .add_member(user_id, sub_event_id, ApplicationRole::TeamLead)
                    .await?;
                uow.volunteers()
                    .remove_member(user_id, sub_event_id, ApplicationRole::Volunteer)
                    .await?;
            }
        }
    }
    Ok(())
}
