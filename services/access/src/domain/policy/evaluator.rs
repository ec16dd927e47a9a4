//! 授权策略评估器

use eventrax_common::UserId;

use super::actor::Actor;
use super::decision::{Decision, ErrorKind, SideEffect};
use super::facts::{EventOwnership, SubEventOwnership, UserFacts};
use super::operation::{Operation, TaskScope};
use crate::domain::notification::NotificationKind;
use crate::domain::user::{Role, UserStatus};
use crate::domain::volunteer::ApplicationRole;

/// 内部拒绝
struct Denial {
    kind: ErrorKind,
    message: String,
}

impl Denial {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

type Verdict = Result<Vec<SideEffect>, Denial>;

/// 授权策略
///
/// 无状态的纯决策函数，每次调用都基于最新查询的事实重新评估，不缓存。
///
/// 评估顺序:
/// 1. 无操作者 -> Unauthenticated
/// 2. 读取本人资料/通知 -> 允许
/// 3. 账户未激活 -> ForbiddenStatus
/// 4. 引用的资源不存在 -> NotFound (先判断存在性，再判断所有权)
/// 5. 自我修改保护，然后是管理员豁免
/// 6. 所有权与角色层级规则
pub struct AuthorizationPolicy;

impl AuthorizationPolicy {
    pub fn evaluate(actor: Option<&Actor>, operation: &Operation) -> Decision {
        let Some(actor) = actor else {
            return Decision::deny(ErrorKind::Unauthenticated, "Authentication required");
        };

        if operation.is_self_read() {
            return Decision::allow();
        }

        if !actor.is_active() {
            return Decision::deny(
                ErrorKind::ForbiddenStatus,
                format!("Account is {}", actor.status),
            );
        }

        match Self::decide(actor, operation) {
            Ok(side_effects) => Decision::allow_with(side_effects),
            Err(denial) => Decision::deny(denial.kind, denial.message),
        }
    }

    fn decide(actor: &Actor, operation: &Operation) -> Verdict {
        match operation {
            Operation::ReadOwnProfile | Operation::ReadNotifications => Ok(Vec::new()),

            Operation::MarkNotificationRead { notification } => {
                let notification = found(*notification, "Notification")?;
                if notification.user_id != actor.id {
                    return Err(insufficient("Notification belongs to another user"));
                }
                Ok(Vec::new())
            }

            Operation::ReviewRegistration { target, approve } => {
                let target = found(*target, "User")?;
                match actor.role {
                    Role::Admin => {}
                    Role::Creator if target.role == Role::TeamLead => {}
                    Role::Creator => {
                        return Err(Denial::new(
                            ErrorKind::RoleScopeViolation,
                            format!(
                                "Creators may only review team lead registrations, not {}",
                                target.role
                            ),
                        ));
                    }
                    _ => return Err(insufficient("Only admins and creators may review registrations")),
                }
                if *approve {
                    Ok(vec![SideEffect::notify(
                        target.id,
                        NotificationKind::RegistrationApproved,
                    )])
                } else {
                    Ok(Vec::new())
                }
            }

            Operation::ChangeUserRole { target, new_role } => {
                let target = found(*target, "User")?;
                not_self(actor, &target.id, "change your own role")?;
                require_admin(actor, "Only admins may change user roles")?;
                Ok(vec![SideEffect::notify(
                    target.id,
                    NotificationKind::RoleChanged { role: *new_role },
                )])
            }

            Operation::SuspendUser { target } => {
                let target = found(*target, "User")?;
                not_self(actor, &target.id, "suspend your own account")?;
                not_admin(&target, "suspended")?;
                match actor.role {
                    Role::Admin => Ok(Vec::new()),
                    Role::Creator => creator_manages(&target, "suspend"),
                    _ => Err(insufficient("Only admins and creators may suspend users")),
                }
            }

            Operation::ReactivateUser { target } => {
                let target = found(*target, "User")?;
                not_self(actor, &target.id, "reactivate your own account")?;
                match actor.role {
                    Role::Admin => Ok(Vec::new()),
                    Role::Creator => creator_manages(&target, "reactivate"),
                    _ => Err(insufficient("Only admins and creators may reactivate users")),
                }
            }

            Operation::DeleteUser { target } => {
                let target = found(*target, "User")?;
                not_self(actor, &target.id, "delete your own account")?;
                not_admin(&target, "deleted")?;
                require_admin(actor, "Only admins may delete users")?;
                Ok(Vec::new())
            }

            Operation::CreateEvent => match actor.role {
                Role::Admin | Role::Creator => Ok(Vec::new()),
                _ => Err(insufficient("Only admins and creators may create events")),
            },

            Operation::EditEvent { event }
            | Operation::DeleteEvent { event }
            | Operation::CreateSubEvent { event }
            | Operation::ManageEventResource { event, .. } => {
                let event = found(*event, "Event")?;
                owns_event(actor, &event)?;
                Ok(Vec::new())
            }

            Operation::AssignEventCreator { event, new_creator } => {
                let event = found(*event, "Event")?;
                let new_creator = found(*new_creator, "User")?;
                require_admin(actor, "Only admins may assign event creators")?;
                if new_creator.role != Role::Creator {
                    return Err(Denial::new(
                        ErrorKind::RoleScopeViolation,
                        format!("Event can only be assigned to a creator, not {}", new_creator.role),
                    ));
                }
                target_active(&new_creator, "assigned to an event")?;

                let mut effects = Vec::new();
                if event.assigned_creator_id != Some(new_creator.id) {
                    if let Some(previous) = event.assigned_creator_id {
                        effects.push(SideEffect::notify(
                            previous,
                            NotificationKind::EventCreatorRemoved {
                                event_id: event.event_id,
                            },
                        ));
                    }
                    effects.push(SideEffect::notify(
                        new_creator.id,
                        NotificationKind::EventCreatorAssigned {
                            event_id: event.event_id,
                        },
                    ));
                }
                Ok(effects)
            }

            Operation::UnassignEventCreator { event } => {
                let event = found(*event, "Event")?;
                require_admin(actor, "Only admins may unassign event creators")?;
                Ok(event
                    .assigned_creator_id
                    .map(|previous| {
                        SideEffect::notify(
                            previous,
                            NotificationKind::EventCreatorRemoved {
                                event_id: event.event_id,
                            },
                        )
                    })
                    .into_iter()
                    .collect())
            }

            Operation::EditSubEvent { sub_event } | Operation::DeleteSubEvent { sub_event } => {
                let sub_event = found(*sub_event, "Sub-event")?;
                owns_event(actor, &sub_event.event)?;
                Ok(Vec::new())
            }

            Operation::AssignTeamLead {
                sub_event,
                new_lead,
            } => {
                let sub_event = found(*sub_event, "Sub-event")?;
                let new_lead = found(*new_lead, "User")?;
                owns_event(actor, &sub_event.event)?;
                if new_lead.role != Role::TeamLead {
                    return Err(Denial::new(
                        ErrorKind::RoleScopeViolation,
                        format!("Team lead must have the teamlead role, not {}", new_lead.role),
                    ));
                }
                target_active(&new_lead, "assigned as team lead")?;
                Ok(reassignment_effects(&sub_event, Some(new_lead.id)))
            }

            Operation::UnassignTeamLead { sub_event } => {
                let sub_event = found(*sub_event, "Sub-event")?;
                owns_event(actor, &sub_event.event)?;
                Ok(reassignment_effects(&sub_event, None))
            }

            Operation::ProposeSchedule { sub_event } => {
                let sub_event = found(*sub_event, "Sub-event")?;
                if !sub_event.is_led_by(&actor.id) {
                    return Err(insufficient(
                        "Only the current team lead may propose a schedule",
                    ));
                }
                let kind = NotificationKind::ScheduleProposed {
                    sub_event_id: sub_event.sub_event_id,
                };
                let mut effects = vec![SideEffect::notify(sub_event.event.creator_id, kind.clone())];
                if let Some(assigned) = sub_event.event.assigned_creator_id
                    && assigned != sub_event.event.creator_id
                {
                    effects.push(SideEffect::notify(assigned, kind));
                }
                Ok(effects)
            }

            Operation::FinalizeSchedule { sub_event } => {
                let sub_event = found(*sub_event, "Sub-event")?;
                owns_event(actor, &sub_event.event)?;
                Ok(sub_event
                    .team_lead_id
                    .map(|lead| {
                        SideEffect::notify(
                            lead,
                            NotificationKind::ScheduleFinalized {
                                sub_event_id: sub_event.sub_event_id,
                            },
                        )
                    })
                    .into_iter()
                    .collect())
            }

            Operation::ApplyAsVolunteer { sub_event, role } => {
                found(*sub_event, "Sub-event")?;
                match (actor.role, role) {
                    (Role::Student, ApplicationRole::Volunteer)
                    | (Role::TeamLead, ApplicationRole::TeamLead) => Ok(Vec::new()),
                    (Role::Student | Role::TeamLead, _) => Err(Denial::new(
                        ErrorKind::RoleScopeViolation,
                        format!("A {} cannot apply as {}", actor.role, role),
                    )),
                    _ => Err(insufficient(
                        "Only students and team leads may apply to sub-events",
                    )),
                }
            }

            Operation::ReviewApplication {
                application,
                approve,
            } => {
                let application = found(*application, "Application")?;
                owns_event(actor, &application.sub_event.event)?;
                let sub_event_id = application.sub_event.sub_event_id;
                let kind = if *approve {
                    NotificationKind::ApplicationApproved {
                        application_id: application.application_id,
                        sub_event_id,
                    }
                } else {
                    NotificationKind::ApplicationRejected {
                        application_id: application.application_id,
                        sub_event_id,
                    }
                };
                Ok(vec![SideEffect::notify(application.student_id, kind)])
            }

            Operation::RemoveVolunteer { application } => {
                let application = found(*application, "Application")?;
                let leads_volunteers = application.role == ApplicationRole::Volunteer
                    && application.sub_event.is_led_by(&actor.id);
                if !leads_volunteers {
                    owns_event(actor, &application.sub_event.event)?;
                }
                Ok(vec![SideEffect::notify(
                    application.student_id,
                    NotificationKind::VolunteerRemoved {
                        sub_event_id: application.sub_event.sub_event_id,
                    },
                )])
            }

            Operation::AssignVolunteer { sub_event, student } => {
                let sub_event = found(*sub_event, "Sub-event")?;
                let student = found(*student, "User")?;
                if student.role != Role::Student {
                    return Err(Denial::new(
                        ErrorKind::RoleScopeViolation,
                        format!("Only students can be assigned as volunteers, not {}", student.role),
                    ));
                }
                may_target(actor, student.role)?;
                target_active(&student, "assigned as volunteer")?;
                match actor.role {
                    Role::TeamLead if !sub_event.is_led_by(&actor.id) => Err(insufficient(
                        "Team leads may only assign volunteers to sub-events they lead",
                    )),
                    Role::Creator => {
                        owns_event(actor, &sub_event.event)?;
                        Ok(volunteer_assigned(&sub_event, student.id))
                    }
                    _ => Ok(volunteer_assigned(&sub_event, student.id)),
                }
            }

            Operation::CreateTask {
                task_id,
                assignee,
                scope,
            } => {
                let assignee = found(*assignee, "User")?;
                let scope = match scope {
                    TaskScope::Unscoped => None,
                    TaskScope::SubEvent(sub_event) => Some(found(*sub_event, "Sub-event")?),
                };
                may_target(actor, assignee.role)?;
                target_active(&assignee, "assigned tasks")?;
                if actor.role == Role::TeamLead
                    && !scope.is_some_and(|sub_event| sub_event.is_led_by(&actor.id))
                {
                    return Err(insufficient(
                        "Team leads may only assign tasks within sub-events they lead",
                    ));
                }
                Ok(vec![SideEffect::notify(
                    assignee.id,
                    NotificationKind::TaskAssigned { task_id: *task_id },
                )])
            }

            Operation::UpdateTaskStatus { task } => {
                let task = found(*task, "Task")?;
                if task.assigned_to != actor.id {
                    return Err(insufficient("Only the assignee may update task progress"));
                }
                Ok(Vec::new())
            }

            Operation::EditTask { task } | Operation::DeleteTask { task } => {
                let task = found(*task, "Task")?;
                if task.assigned_by != actor.id {
                    return Err(insufficient("Only the task's assigner may modify it"));
                }
                Ok(Vec::new())
            }
        }
    }
}

fn found<T>(fact: Option<T>, what: &str) -> Result<T, Denial> {
    fact.ok_or_else(|| Denial::new(ErrorKind::NotFound, format!("{} not found", what)))
}

/// 被指派的用户必须处于激活状态
fn target_active(target: &UserFacts, action: &str) -> Result<(), Denial> {
    if target.status != UserStatus::Active {
        return Err(Denial::new(
            ErrorKind::ForbiddenStatus,
            format!("A {} account cannot be {}", target.status, action),
        ));
    }
    Ok(())
}

fn insufficient(message: impl Into<String>) -> Denial {
    Denial::new(ErrorKind::InsufficientOwnership, message)
}

fn not_self(actor: &Actor, target: &UserId, action: &str) -> Result<(), Denial> {
    if actor.id == *target {
        return Err(Denial::new(
            ErrorKind::SelfModificationDenied,
            format!("You cannot {}", action),
        ));
    }
    Ok(())
}

fn not_admin(target: &UserFacts, action: &str) -> Result<(), Denial> {
    if target.role == Role::Admin {
        return Err(Denial::new(
            ErrorKind::AdminImmune,
            format!("Admin accounts cannot be {}", action),
        ));
    }
    Ok(())
}

fn require_admin(actor: &Actor, message: &str) -> Result<(), Denial> {
    if !actor.is_admin() {
        return Err(insufficient(message));
    }
    Ok(())
}

/// 通用所有权规则: 管理员，或所属活动的创建者/指派创建者
fn owns_event(actor: &Actor, event: &EventOwnership) -> Result<(), Denial> {
    if actor.is_admin() || event.is_owned_by(&actor.id) {
        return Ok(());
    }
    Err(insufficient(format!(
        "You do not own event {}",
        event.event_id
    )))
}

/// 创建者只能管理团队负责人与学生账户
fn creator_manages(target: &UserFacts, action: &str) -> Verdict {
    if matches!(target.role, Role::TeamLead | Role::Student) {
        return Ok(Vec::new());
    }
    Err(Denial::new(
        ErrorKind::RoleScopeViolation,
        format!("Creators cannot {} a {} account", action, target.role),
    ))
}

/// 角色层级校验
///
/// 没有任何可分配目标的角色视为缺少权限，其余不匹配的目标视为越界。
fn may_target(actor: &Actor, target: Role) -> Result<(), Denial> {
    if actor.role.assignable_targets().is_empty() {
        return Err(insufficient(format!("A {} cannot assign work", actor.role)));
    }
    if !actor.role.may_assign_to(target) {
        return Err(Denial::new(
            ErrorKind::RoleScopeViolation,
            format!("A {} cannot assign to a {}", actor.role, target),
        ));
    }
    Ok(())
}

fn volunteer_assigned(sub_event: &SubEventOwnership, student: UserId) -> Vec<SideEffect> {
    vec![SideEffect::notify(
        student,
        NotificationKind::VolunteerAssigned {
            sub_event_id: sub_event.sub_event_id,
        },
    )]
}

/// 团队负责人变更的补偿写入
///
/// 旧负责人被降级并收到通知；新负责人（若与当前不同）被提升并收到通知。
fn reassignment_effects(sub_event: &SubEventOwnership, new_lead: Option<UserId>) -> Vec<SideEffect> {
    let sub_event_id = sub_event.sub_event_id;
    let mut effects = Vec::new();

    if let Some(previous) = sub_event.team_lead_id
        && Some(previous) != new_lead
    {
        effects.push(SideEffect::DemoteTeamLead {
            user_id: previous,
            sub_event_id,
        });
        effects.push(SideEffect::notify(
            previous,
            NotificationKind::TeamLeadRemoved { sub_event_id },
        ));
    }

    if let Some(lead) = new_lead
        && sub_event.team_lead_id != Some(lead)
    {
        effects.push(SideEffect::PromoteTeamLead {
            user_id: lead,
            sub_event_id,
        });
        effects.push(SideEffect::notify(
            lead,
            NotificationKind::TeamLeadAssigned { sub_event_id },
        ));
    }

    effects
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::policy::facts::{ApplicationFacts, NotificationFacts, TaskFacts};
    use crate::domain::user::UserStatus;
    use eventrax_common::{ApplicationId, EventId, NotificationId, SubEventId, TaskId};

    fn actor(role: Role) -> Actor {
        Actor::new(UserId::new(), role, UserStatus::Active)
    }

    fn user(role: Role) -> UserFacts {
        UserFacts {
            id: UserId::new(),
            role,
            status: UserStatus::Active,
        }
    }

    fn event_of(creator: UserId) -> EventOwnership {
        EventOwnership {
            event_id: EventId::new(),
            creator_id: creator,
            assigned_creator_id: None,
        }
    }

    fn sub_event_of(event: EventOwnership, lead: Option<UserId>) -> SubEventOwnership {
        SubEventOwnership {
            sub_event_id: SubEventId::new(),
            event,
            team_lead_id: lead,
        }
    }

    fn denied(actor: &Actor, op: &Operation) -> ErrorKind {
        let decision = AuthorizationPolicy::evaluate(Some(actor), op);
        assert!(!decision.allowed, "expected deny for {}", op.name());
        decision.reason.unwrap()
    }

    fn allowed(actor: &Actor, op: &Operation) -> Vec<SideEffect> {
        let decision = AuthorizationPolicy::evaluate(Some(actor), op);
        assert!(decision.allowed, "expected allow for {}: {:?}", op.name(), decision.message);
        decision.side_effects
    }

    #[test]
    fn test_missing_actor_is_unauthenticated() {
        let decision = AuthorizationPolicy::evaluate(None, &Operation::ReadOwnProfile);
        assert!(decision.is_denied_with(ErrorKind::Unauthenticated));
    }

    #[test]
    fn test_inactive_actor_may_only_read_own_data() {
        for status in [UserStatus::Pending, UserStatus::Suspended] {
            let admin = Actor::new(UserId::new(), Role::Admin, status);
            assert!(AuthorizationPolicy::evaluate(Some(&admin), &Operation::ReadOwnProfile).allowed);
            assert!(AuthorizationPolicy::evaluate(Some(&admin), &Operation::ReadNotifications).allowed);
            assert_eq!(denied(&admin, &Operation::CreateEvent), ErrorKind::ForbiddenStatus);

            // 即使是活动所有者
            let event = event_of(admin.id);
            assert_eq!(
                denied(&admin, &Operation::EditEvent { event: Some(event) }),
                ErrorKind::ForbiddenStatus
            );
        }
    }

    #[test]
    fn test_missing_resource_is_not_found_before_ownership() {
        let student = actor(Role::Student);
        assert_eq!(
            denied(&student, &Operation::DeleteEvent { event: None }),
            ErrorKind::NotFound
        );
        assert_eq!(
            denied(&student, &Operation::SuspendUser { target: None }),
            ErrorKind::NotFound
        );
        assert_eq!(
            denied(
                &student,
                &Operation::CreateTask {
                    task_id: TaskId::new(),
                    assignee: Some(user(Role::Student)),
                    scope: TaskScope::SubEvent(None),
                }
            ),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_general_ownership_rule() {
        let owner = actor(Role::Creator);
        let assigned = actor(Role::Creator);
        let other = actor(Role::Creator);
        let admin = actor(Role::Admin);
        let mut event = event_of(owner.id);
        event.assigned_creator_id = Some(assigned.id);

        let op = Operation::DeleteEvent { event: Some(event) };
        allowed(&owner, &op);
        allowed(&assigned, &op);
        allowed(&admin, &op);
        assert_eq!(denied(&other, &op), ErrorKind::InsufficientOwnership);

        let sub_event = sub_event_of(event, None);
        let op = Operation::DeleteSubEvent {
            sub_event: Some(sub_event),
        };
        allowed(&assigned, &op);
        assert_eq!(denied(&other, &op), ErrorKind::InsufficientOwnership);
    }

    #[test]
    fn test_team_lead_cannot_edit_sub_event_structure() {
        let lead = actor(Role::TeamLead);
        let sub_event = sub_event_of(event_of(UserId::new()), Some(lead.id));
        assert_eq!(
            denied(&lead, &Operation::EditSubEvent { sub_event: Some(sub_event) }),
            ErrorKind::InsufficientOwnership
        );
        assert_eq!(
            denied(&lead, &Operation::FinalizeSchedule { sub_event: Some(sub_event) }),
            ErrorKind::InsufficientOwnership
        );
    }

    #[test]
    fn test_self_modification_denied_for_admin() {
        let admin = actor(Role::Admin);
        let me = UserFacts {
            id: admin.id,
            role: Role::Admin,
            status: UserStatus::Active,
        };
        for op in [
            Operation::ChangeUserRole {
                target: Some(me),
                new_role: Role::Student,
            },
            Operation::SuspendUser { target: Some(me) },
            Operation::DeleteUser { target: Some(me) },
        ] {
            assert_eq!(denied(&admin, &op), ErrorKind::SelfModificationDenied);
        }
    }

    #[test]
    fn test_admin_immune_even_from_admin() {
        let admin = actor(Role::Admin);
        let creator = actor(Role::Creator);
        let other_admin = user(Role::Admin);
        for op in [
            Operation::SuspendUser {
                target: Some(other_admin),
            },
            Operation::DeleteUser {
                target: Some(other_admin),
            },
        ] {
            assert_eq!(denied(&admin, &op), ErrorKind::AdminImmune);
            assert_eq!(denied(&creator, &op), ErrorKind::AdminImmune);
        }
    }

    #[test]
    fn test_creator_account_management_scope() {
        let creator = actor(Role::Creator);
        allowed(
            &creator,
            &Operation::SuspendUser {
                target: Some(user(Role::Student)),
            },
        );
        allowed(
            &creator,
            &Operation::ReactivateUser {
                target: Some(user(Role::TeamLead)),
            },
        );
        assert_eq!(
            denied(
                &creator,
                &Operation::SuspendUser {
                    target: Some(user(Role::Creator))
                }
            ),
            ErrorKind::RoleScopeViolation
        );
        assert_eq!(
            denied(
                &creator,
                &Operation::DeleteUser {
                    target: Some(user(Role::Student))
                }
            ),
            ErrorKind::InsufficientOwnership
        );
        assert_eq!(
            denied(
                &creator,
                &Operation::ChangeUserRole {
                    target: Some(user(Role::Student)),
                    new_role: Role::TeamLead,
                }
            ),
            ErrorKind::InsufficientOwnership
        );
    }

    #[test]
    fn test_registration_review_scope() {
        let admin = actor(Role::Admin);
        let creator = actor(Role::Creator);
        let lead = user(Role::TeamLead);
        let student = user(Role::Student);

        let effects = allowed(
            &admin,
            &Operation::ReviewRegistration {
                target: Some(lead),
                approve: true,
            },
        );
        assert_eq!(
            effects,
            vec![SideEffect::notify(lead.id, NotificationKind::RegistrationApproved)]
        );

        allowed(
            &creator,
            &Operation::ReviewRegistration {
                target: Some(lead),
                approve: false,
            },
        );
        assert_eq!(
            denied(
                &creator,
                &Operation::ReviewRegistration {
                    target: Some(student),
                    approve: false,
                }
            ),
            ErrorKind::RoleScopeViolation
        );
        assert_eq!(
            denied(
                &actor(Role::TeamLead),
                &Operation::ReviewRegistration {
                    target: Some(student),
                    approve: true,
                }
            ),
            ErrorKind::InsufficientOwnership
        );
    }

    #[test]
    fn test_task_creation_follows_hierarchy() {
        let cases = [
            (Role::Admin, Role::Creator, true),
            (Role::Admin, Role::TeamLead, true),
            (Role::Admin, Role::Student, false),
            (Role::Admin, Role::Admin, false),
            (Role::Creator, Role::TeamLead, true),
            (Role::Creator, Role::Student, true),
            (Role::Creator, Role::Admin, false),
            (Role::Creator, Role::Creator, false),
        ];
        for (actor_role, target_role, expected) in cases {
            let op = Operation::CreateTask {
                task_id: TaskId::new(),
                assignee: Some(user(target_role)),
                scope: TaskScope::Unscoped,
            };
            let decision = AuthorizationPolicy::evaluate(Some(&actor(actor_role)), &op);
            assert_eq!(decision.allowed, expected, "{} -> {}", actor_role, target_role);
            if !expected {
                assert_eq!(decision.reason, Some(ErrorKind::RoleScopeViolation));
            }
        }

        let op = Operation::CreateTask {
            task_id: TaskId::new(),
            assignee: Some(user(Role::Student)),
            scope: TaskScope::Unscoped,
        };
        assert_eq!(
            denied(&actor(Role::Student), &op),
            ErrorKind::InsufficientOwnership
        );
    }

    #[test]
    fn test_team_lead_tasks_limited_to_led_sub_events() {
        let lead = actor(Role::TeamLead);
        let task_id = TaskId::new();
        let student = user(Role::Student);
        let led = sub_event_of(event_of(UserId::new()), Some(lead.id));
        let not_led = sub_event_of(event_of(UserId::new()), Some(UserId::new()));

        let effects = allowed(
            &lead,
            &Operation::CreateTask {
                task_id,
                assignee: Some(student),
                scope: TaskScope::SubEvent(Some(led)),
            },
        );
        assert_eq!(
            effects,
            vec![SideEffect::notify(student.id, NotificationKind::TaskAssigned { task_id })]
        );

        for scope in [TaskScope::Unscoped, TaskScope::SubEvent(Some(not_led))] {
            let op = Operation::CreateTask {
                task_id,
                assignee: Some(student),
                scope,
            };
            assert_eq!(denied(&lead, &op), ErrorKind::InsufficientOwnership);
        }
    }

    #[test]
    fn test_schedule_proposal_requires_current_lead() {
        let lead = actor(Role::TeamLead);
        let creator = UserId::new();
        let assigned = UserId::new();
        let mut event = event_of(creator);
        event.assigned_creator_id = Some(assigned);
        let sub_event = sub_event_of(event, Some(lead.id));
        let op = Operation::ProposeSchedule {
            sub_event: Some(sub_event),
        };

        let effects = allowed(&lead, &op);
        let recipients: Vec<UserId> = effects
            .iter()
            .filter_map(|effect| match effect {
                SideEffect::Notify { user_id, .. } => Some(*user_id),
                _ => None,
            })
            .collect();
        assert_eq!(recipients, vec![creator, assigned]);

        assert_eq!(
            denied(&actor(Role::TeamLead), &op),
            ErrorKind::InsufficientOwnership
        );
        // 管理员不豁免
        assert_eq!(denied(&actor(Role::Admin), &op), ErrorKind::InsufficientOwnership);
    }

    #[test]
    fn test_team_lead_reassignment_effects() {
        let owner = actor(Role::Creator);
        let old_lead = UserId::new();
        let new_lead = user(Role::TeamLead);
        let sub_event = sub_event_of(event_of(owner.id), Some(old_lead));
        let sub_event_id = sub_event.sub_event_id;

        let effects = allowed(
            &owner,
            &Operation::AssignTeamLead {
                sub_event: Some(sub_event),
                new_lead: Some(new_lead),
            },
        );
        assert_eq!(
            effects,
            vec![
                SideEffect::DemoteTeamLead {
                    user_id: old_lead,
                    sub_event_id
                },
                SideEffect::notify(old_lead, NotificationKind::TeamLeadRemoved { sub_event_id }),
                SideEffect::PromoteTeamLead {
                    user_id: new_lead.id,
                    sub_event_id
                },
                SideEffect::notify(new_lead.id, NotificationKind::TeamLeadAssigned { sub_event_id }),
            ]
        );
    }

    #[test]
    fn test_reassigning_same_lead_has_no_effects() {
        let admin = actor(Role::Admin);
        let lead = user(Role::TeamLead);
        let sub_event = sub_event_of(event_of(UserId::new()), Some(lead.id));

        let effects = allowed(
            &admin,
            &Operation::AssignTeamLead {
                sub_event: Some(sub_event),
                new_lead: Some(lead),
            },
        );
        assert!(effects.is_empty());
    }

    #[test]
    fn test_inactive_users_cannot_be_assigned() {
        let admin = actor(Role::Admin);
        let lead = actor(Role::TeamLead);
        let sub_event = sub_event_of(event_of(admin.id), Some(lead.id));

        for status in [UserStatus::Pending, UserStatus::Suspended] {
            let inactive = |role| UserFacts {
                status,
                ..user(role)
            };
            let cases = [
                (
                    &admin,
                    Operation::AssignTeamLead {
                        sub_event: Some(sub_event),
                        new_lead: Some(inactive(Role::TeamLead)),
                    },
                ),
                (
                    &admin,
                    Operation::AssignEventCreator {
                        event: Some(event_of(admin.id)),
                        new_creator: Some(inactive(Role::Creator)),
                    },
                ),
                (
                    &lead,
                    Operation::AssignVolunteer {
                        sub_event: Some(sub_event),
                        student: Some(inactive(Role::Student)),
                    },
                ),
                (
                    &lead,
                    Operation::CreateTask {
                        task_id: TaskId::new(),
                        assignee: Some(inactive(Role::Student)),
                        scope: TaskScope::SubEvent(Some(sub_event)),
                    },
                ),
            ];
            for (actor, op) in &cases {
                assert_eq!(denied(actor, op), ErrorKind::ForbiddenStatus, "{}", op.name());
                assert!(AuthorizationPolicy::evaluate(Some(*actor), op).side_effects.is_empty());
            }
        }
    }

    #[test]
    fn test_team_lead_target_must_have_role() {
        let admin = actor(Role::Admin);
        let sub_event = sub_event_of(event_of(UserId::new()), None);
        assert_eq!(
            denied(
                &admin,
                &Operation::AssignTeamLead {
                    sub_event: Some(sub_event),
                    new_lead: Some(user(Role::Student)),
                }
            ),
            ErrorKind::RoleScopeViolation
        );
    }

    #[test]
    fn test_unassign_team_lead_demotes() {
        let admin = actor(Role::Admin);
        let lead = UserId::new();
        let sub_event = sub_event_of(event_of(UserId::new()), Some(lead));
        let effects = allowed(
            &admin,
            &Operation::UnassignTeamLead {
                sub_event: Some(sub_event),
            },
        );
        assert_eq!(effects.len(), 2);
        assert!(matches!(effects[0], SideEffect::DemoteTeamLead { user_id, .. } if user_id == lead));
    }

    #[test]
    fn test_event_creator_assignment() {
        let admin = actor(Role::Admin);
        let previous = UserId::new();
        let mut event = event_of(UserId::new());
        event.assigned_creator_id = Some(previous);
        let new_creator = user(Role::Creator);

        let effects = allowed(
            &admin,
            &Operation::AssignEventCreator {
                event: Some(event),
                new_creator: Some(new_creator),
            },
        );
        assert_eq!(effects.len(), 2);

        assert_eq!(
            denied(
                &admin,
                &Operation::AssignEventCreator {
                    event: Some(event),
                    new_creator: Some(user(Role::TeamLead)),
                }
            ),
            ErrorKind::RoleScopeViolation
        );
        assert_eq!(
            denied(
                &actor(Role::Creator),
                &Operation::AssignEventCreator {
                    event: Some(event),
                    new_creator: Some(new_creator),
                }
            ),
            ErrorKind::InsufficientOwnership
        );
    }

    #[test]
    fn test_volunteer_application_roles() {
        let sub_event = Some(sub_event_of(event_of(UserId::new()), None));
        let apply = |role| Operation::ApplyAsVolunteer { sub_event, role };

        allowed(&actor(Role::Student), &apply(ApplicationRole::Volunteer));
        allowed(&actor(Role::TeamLead), &apply(ApplicationRole::TeamLead));
        assert_eq!(
            denied(&actor(Role::Student), &apply(ApplicationRole::TeamLead)),
            ErrorKind::RoleScopeViolation
        );
        assert_eq!(
            denied(&actor(Role::Creator), &apply(ApplicationRole::Volunteer)),
            ErrorKind::InsufficientOwnership
        );
    }

    #[test]
    fn test_remove_volunteer_by_team_lead() {
        let lead = actor(Role::TeamLead);
        let sub_event = sub_event_of(event_of(UserId::new()), Some(lead.id));
        let application = |role| ApplicationFacts {
            application_id: ApplicationId::new(),
            student_id: UserId::new(),
            role,
            sub_event,
        };

        allowed(
            &lead,
            &Operation::RemoveVolunteer {
                application: Some(application(ApplicationRole::Volunteer)),
            },
        );
        assert_eq!(
            denied(
                &lead,
                &Operation::RemoveVolunteer {
                    application: Some(application(ApplicationRole::TeamLead)),
                }
            ),
            ErrorKind::InsufficientOwnership
        );
        assert_eq!(
            denied(
                &lead,
                &Operation::ReviewApplication {
                    application: Some(application(ApplicationRole::Volunteer)),
                    approve: true,
                }
            ),
            ErrorKind::InsufficientOwnership
        );
    }

    #[test]
    fn test_assign_volunteer() {
        let lead = actor(Role::TeamLead);
        let owner = actor(Role::Creator);
        let student = user(Role::Student);
        let sub_event = sub_event_of(event_of(owner.id), Some(lead.id));
        let op = Operation::AssignVolunteer {
            sub_event: Some(sub_event),
            student: Some(student),
        };

        allowed(&lead, &op);
        allowed(&owner, &op);
        assert_eq!(denied(&actor(Role::TeamLead), &op), ErrorKind::InsufficientOwnership);
        assert_eq!(denied(&actor(Role::Creator), &op), ErrorKind::InsufficientOwnership);
        assert_eq!(denied(&actor(Role::Admin), &op), ErrorKind::RoleScopeViolation);

        let op = Operation::AssignVolunteer {
            sub_event: Some(sub_event),
            student: Some(user(Role::TeamLead)),
        };
        assert_eq!(denied(&owner, &op), ErrorKind::RoleScopeViolation);
    }

    #[test]
    fn test_task_ownership() {
        let assigner = actor(Role::Creator);
        let assignee = actor(Role::Student);
        let task = Some(TaskFacts {
            task_id: TaskId::new(),
            assigned_to: assignee.id,
            assigned_by: assigner.id,
        });

        let update = Operation::UpdateTaskStatus { task };
        allowed(&assignee, &update);
        assert_eq!(denied(&assigner, &update), ErrorKind::InsufficientOwnership);

        allowed(&assigner, &Operation::EditTask { task });
        assert_eq!(
            denied(&assignee, &Operation::DeleteTask { task }),
            ErrorKind::InsufficientOwnership
        );
        assert_eq!(
            denied(&actor(Role::Admin), &Operation::DeleteTask { task }),
            ErrorKind::InsufficientOwnership
        );
    }

    #[test]
    fn test_mark_notification_read_requires_recipient() {
        let me = actor(Role::Student);
        let mine = NotificationFacts {
            notification_id: NotificationId::new(),
            user_id: me.id,
        };
        let theirs = NotificationFacts {
            notification_id: NotificationId::new(),
            user_id: UserId::new(),
        };

        allowed(&me, &Operation::MarkNotificationRead { notification: Some(mine) });
        assert_eq!(
            denied(&me, &Operation::MarkNotificationRead { notification: Some(theirs) }),
            ErrorKind::InsufficientOwnership
        );
    }
}
