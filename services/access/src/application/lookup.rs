//! 所有权事实加载

use eventrax_common::{ApplicationId, SubEventId};
use eventrax_errors::AppResult;

use crate::domain::UnitOfWork;
use crate::domain::event::SubEvent;
use crate::domain::policy::{ApplicationFacts, SubEventOwnership};
use crate::domain::volunteer::VolunteerApplication;

/// 加载子活动及其经由父活动解析的所有权链
pub(crate) async fn load_sub_event(
    uow: &dyn UnitOfWork,
    id: &SubEventId,
) -> AppResult<Option<(SubEvent, SubEventOwnership)>> {
    let Some(sub_event) = uow.sub_events().find_by_id(id).await? else {
        return Ok(None);
    };
    let Some(event) = uow.events().find_by_id(&sub_event.event_id).await? else {
        return Ok(None);
    };
    let ownership = sub_event.ownership(event.ownership());
    Ok(Some((sub_event, ownership)))
}

/// 加载申请及其所属子活动的所有权链
pub(crate) async fn load_application(
    uow: &dyn UnitOfWork,
    id: &ApplicationId,
) -> AppResult<Option<(VolunteerApplication, ApplicationFacts)>> {
    let Some(application) = uow.volunteers().find_by_id(id).await? else {
        return Ok(None);
    };
    let Some((_, ownership)) = load_sub_event(uow, &application.sub_event_id).await? else {
        return Ok(None);
    };
    let facts = application.facts(ownership);
    Ok(Some((application, facts)))
}
