//! 集成测试公共工具
//!
//! 内存版 Unit of Work: `begin` 时复制一份快照，所有写入作用在快照上，
//! `commit` 时整体替换存储状态，未提交即丢弃。支持按操作名注入故障。

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use eventrax_access::AccessHandlers;
use eventrax_access::application::{
    AuthorizationService, EventCommandHandler, NotificationHandler, SubEventCommandHandler,
    TaskCommandHandler, UserCommandHandler, UserQueryHandler, VolunteerCommandHandler,
};
use eventrax_access::domain::event::{
    Event, EventRepository, SubEvent, SubEventRepository,
};
use eventrax_access::domain::notification::{Notification, NotificationRepository};
use eventrax_access::domain::policy::Actor;
use eventrax_access::domain::task::{Task, TaskRepository};
use eventrax_access::domain::user::{Role, User, UserRepository, UserStatus};
use eventrax_access::domain::volunteer::{
    ApplicationRole, ApplicationStatus, VolunteerApplication, VolunteerRepository,
};
use eventrax_access::domain::{UnitOfWork, UnitOfWorkFactory};
use eventrax_common::{
    ApplicationId, EventId, NotificationId, Pagination, SubEventId, TaskId, UserId,
};
use eventrax_errors::{AppError, AppResult};

#[derive(Debug, Clone, Default)]
pub struct State {
    pub users: HashMap<UserId, User>,
    pub events: HashMap<EventId, Event>,
    pub sub_events: HashMap<SubEventId, SubEvent>,
    pub applications: HashMap<ApplicationId, VolunteerApplication>,
    pub members: HashSet<(UserId, SubEventId, ApplicationRole)>,
    pub tasks: HashMap<TaskId, Task>,
    pub notifications: Vec<Notification>,
}

/// 共享存储
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    fail_on: Mutex<Option<&'static str>>,
    commits: Mutex<u32>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn snapshot(&self) -> State {
        self.state.lock().unwrap().clone()
    }

    /// 下一次执行指定操作（如 `notifications.create`）时返回数据库错误
    pub fn fail_on(&self, operation: &'static str) {
        *self.fail_on.lock().unwrap() = Some(operation);
    }

    pub fn commits(&self) -> u32 {
        *self.commits.lock().unwrap()
    }

    pub fn insert_user(&self, role: Role, status: UserStatus) -> User {
        let mut user = User::register(
            format!("{} user", role),
            format!("{}@campus.test", UserId::new()),
            role,
        );
        user.status = status;
        self.state
            .lock()
            .unwrap()
            .users
            .insert(user.id, user.clone());
        user
    }

    pub fn insert_event(&self, creator: &User) -> Event {
        let event = Event::new("Spring Fair".to_string(), None, creator.id);
        self.state
            .lock()
            .unwrap()
            .events
            .insert(event.id, event.clone());
        event
    }

    pub fn insert_sub_event(&self, event: &Event, team_lead: Option<&User>) -> SubEvent {
        let mut sub_event = SubEvent::new(event.id, "Stage crew".to_string(), None, event.creator_id);
        sub_event.team_lead_id = team_lead.map(|u| u.id);
        let mut state = self.state.lock().unwrap();
        if let Some(lead) = team_lead {
            let mut application = VolunteerApplication::assigned(
                lead.id,
                sub_event.id,
                ApplicationRole::TeamLead,
                event.creator_id,
            );
            application.status = ApplicationStatus::Approved;
            state.applications.insert(application.id, application);
            state
                .members
                .insert((lead.id, sub_event.id, ApplicationRole::TeamLead));
        }
        state.sub_events.insert(sub_event.id, sub_event.clone());
        sub_event
    }

    /// 直接修改已提交状态，用于构造不一致的数据
    pub fn mutate(&self, f: impl FnOnce(&mut State)) {
        f(&mut self.state.lock().unwrap());
    }

    pub fn insert_task(&self, task: Task) {
        self.state.lock().unwrap().tasks.insert(task.id, task);
    }

    fn check_fault(&self, operation: &'static str) -> AppResult<()> {
        let mut fail_on = self.fail_on.lock().unwrap();
        if *fail_on == Some(operation) {
            *fail_on = None;
            return Err(AppError::database(format!("injected failure on {}", operation)));
        }
        Ok(())
    }
}

pub struct MemoryUnitOfWorkFactory {
    store: Arc<MemoryStore>,
}

impl MemoryUnitOfWorkFactory {
    pub fn new(store: Arc<MemoryStore>) -> Arc<Self> {
        Arc::new(Self { store })
    }
}

#[async_trait]
impl UnitOfWorkFactory for MemoryUnitOfWorkFactory {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        Ok(Box::new(MemoryUnitOfWork {
            repos: MemoryRepos {
                store: self.store.clone(),
                working: Mutex::new(self.store.snapshot()),
            },
        }))
    }
}

pub struct MemoryUnitOfWork {
    repos: MemoryRepos,
}

struct MemoryRepos {
    store: Arc<MemoryStore>,
    working: Mutex<State>,
}

impl MemoryRepos {
    fn read<T>(&self, operation: &'static str, f: impl FnOnce(&State) -> T) -> AppResult<T> {
        self.store.check_fault(operation)?;
        Ok(f(&self.working.lock().unwrap()))
    }

    fn write<T>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&mut State) -> AppResult<T>,
    ) -> AppResult<T> {
        self.store.check_fault(operation)?;
        f(&mut self.working.lock().unwrap())
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    fn users(&self) -> &dyn UserRepository {
        &self.repos
    }

    fn events(&self) -> &dyn EventRepository {
        &self.repos
    }

    fn sub_events(&self) -> &dyn SubEventRepository {
        &self.repos
    }

    fn volunteers(&self) -> &dyn VolunteerRepository {
        &self.repos
    }

    fn tasks(&self) -> &dyn TaskRepository {
        &self.repos
    }

    fn notifications(&self) -> &dyn NotificationRepository {
        &self.repos
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let MemoryUnitOfWork { repos } = *self;
        let MemoryRepos { store, working } = repos;
        store.check_fault("commit")?;
        *store.state.lock().unwrap() = working.into_inner().unwrap();
        *store.commits.lock().unwrap() += 1;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MemoryRepos {
    async fn find_by_id(&self, id: &UserId) -> AppResult<Option<User>> {
        self.read("users.find_by_id", |s| s.users.get(id).cloned())
    }

    async fn update(&self, user: &User) -> AppResult<()> {
        self.write("users.update", |s| match s.users.get_mut(&user.id) {
            Some(stored) => {
                *stored = user.clone();
                Ok(())
            }
            None => Err(AppError::not_found("User not found")),
        })
    }

    async fn delete(&self, id: &UserId) -> AppResult<()> {
        self.write("users.delete", |s| {
            s.users.remove(id);
            Ok(())
        })
    }
}

#[async_trait]
impl EventRepository for MemoryRepos {
    async fn create(&self, event: &Event) -> AppResult<()> {
        self.write("events.create", |s| {
            s.events.insert(event.id, event.clone());
            Ok(())
        })
    }

    async fn update(&self, event: &Event) -> AppResult<()> {
        self.write("events.update", |s| {
            s.events.insert(event.id, event.clone());
            Ok(())
        })
    }

    async fn delete(&self, id: &EventId) -> AppResult<()> {
        self.write("events.delete", |s| {
            s.events.remove(id);
            s.sub_events.retain(|_, sub_event| sub_event.event_id != *id);
            Ok(())
        })
    }

    async fn find_by_id(&self, id: &EventId) -> AppResult<Option<Event>> {
        self.read("events.find_by_id", |s| s.events.get(id).cloned())
    }
}

#[async_trait]
impl SubEventRepository for MemoryRepos {
    async fn create(&self, sub_event: &SubEvent) -> AppResult<()> {
        self.write("sub_events.create", |s| {
            s.sub_events.insert(sub_event.id, sub_event.clone());
            Ok(())
        })
    }

    async fn update(&self, sub_event: &SubEvent) -> AppResult<()> {
        self.write("sub_events.update", |s| {
            let stored = s
                .sub_events
                .get_mut(&sub_event.id)
                .ok_or_else(|| AppError::not_found("Sub-event not found"))?;
            if stored.version != sub_event.version {
                return Err(AppError::conflict("Sub-event was modified concurrently"));
            }
            *stored = sub_event.clone();
            stored.version += 1;
            Ok(())
        })
    }

    async fn delete(&self, id: &SubEventId) -> AppResult<()> {
        self.write("sub_events.delete", |s| {
            s.sub_events.remove(id);
            Ok(())
        })
    }

    async fn find_by_id(&self, id: &SubEventId) -> AppResult<Option<SubEvent>> {
        self.read("sub_events.find_by_id", |s| s.sub_events.get(id).cloned())
    }
}

#[async_trait]
impl VolunteerRepository for MemoryRepos {
    async fn create(&self, application: &VolunteerApplication) -> AppResult<()> {
        self.write("volunteers.create", |s| {
            let duplicate = s.applications.values().any(|a| {
                a.student_id == application.student_id
                    && a.sub_event_id == application.sub_event_id
                    && a.status != ApplicationStatus::Removed
            });
            if duplicate {
                return Err(AppError::conflict(
                    "Student already has an active application for this sub-event",
                ));
            }
            s.applications.insert(application.id, application.clone());
            Ok(())
        })
    }

    async fn update(&self, application: &VolunteerApplication) -> AppResult<()> {
        self.write("volunteers.update", |s| {
            s.applications.insert(application.id, application.clone());
            Ok(())
        })
    }

    async fn find_by_id(&self, id: &ApplicationId) -> AppResult<Option<VolunteerApplication>> {
        self.read("volunteers.find_by_id", |s| s.applications.get(id).cloned())
    }

    async fn find_active(
        &self,
        student_id: &UserId,
        sub_event_id: &SubEventId,
    ) -> AppResult<Option<VolunteerApplication>> {
        self.read("volunteers.find_active", |s| {
            s.applications
                .values()
                .find(|a| {
                    a.student_id == *student_id
                        && a.sub_event_id == *sub_event_id
                        && a.status != ApplicationStatus::Removed
                })
                .cloned()
        })
    }

    async fn add_member(
        &self,
        user_id: &UserId,
        sub_event_id: &SubEventId,
        role: ApplicationRole,
    ) -> AppResult<()> {
        self.write("volunteers.add_member", |s| {
            s.members.insert((*user_id, *sub_event_id, role));
            Ok(())
        })
    }

    async fn remove_member(
        &self,
        user_id: &UserId,
        sub_event_id: &SubEventId,
        role: ApplicationRole,
    ) -> AppResult<u64> {
        self.write("volunteers.remove_member", |s| {
            Ok(u64::from(s.members.remove(&(*user_id, *sub_event_id, role))))
        })
    }
}

#[async_trait]
impl TaskRepository for MemoryRepos {
    async fn create(&self, task: &Task) -> AppResult<()> {
        self.write("tasks.create", |s| {
            s.tasks.insert(task.id, task.clone());
            Ok(())
        })
    }

    async fn update(&self, task: &Task) -> AppResult<()> {
        self.write("tasks.update", |s| {
            s.tasks.insert(task.id, task.clone());
            Ok(())
        })
    }

    async fn delete(&self, id: &TaskId) -> AppResult<()> {
        self.write("tasks.delete", |s| {
            s.tasks.remove(id);
            Ok(())
        })
    }

    async fn find_by_id(&self, id: &TaskId) -> AppResult<Option<Task>> {
        self.read("tasks.find_by_id", |s| s.tasks.get(id).cloned())
    }
}

#[async_trait]
impl NotificationRepository for MemoryRepos {
    async fn create(&self, notification: &Notification) -> AppResult<()> {
        self.write("notifications.create", |s| {
            s.notifications.push(notification.clone());
            Ok(())
        })
    }

    async fn find_by_id(&self, id: &NotificationId) -> AppResult<Option<Notification>> {
        self.read("notifications.find_by_id", |s| {
            s.notifications.iter().find(|n| n.id == *id).cloned()
        })
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
        unread_only: bool,
        pagination: &Pagination,
    ) -> AppResult<(Vec<Notification>, u64)> {
        self.read("notifications.list_for_user", |s| {
            let mut matching: Vec<Notification> = s
                .notifications
                .iter()
                .filter(|n| n.user_id == *user_id && (!unread_only || !n.is_read))
                .cloned()
                .collect();
            matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            let total = matching.len() as u64;
            let page = matching
                .into_iter()
                .skip(pagination.offset() as usize)
                .take(pagination.page_size as usize)
                .collect();
            (page, total)
        })
    }

    async fn mark_read(&self, id: &NotificationId) -> AppResult<()> {
        self.write("notifications.mark_read", |s| {
            if let Some(n) = s.notifications.iter_mut().find(|n| n.id == *id) {
                n.is_read = true;
            }
            Ok(())
        })
    }
}

pub fn actor_for(user: &User) -> Actor {
    Actor::new(user.id, user.role, user.status)
}

/// 测试夹具: 存储 + 全部处理器
pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub users: UserCommandHandler,
    pub user_queries: UserQueryHandler,
    pub events: EventCommandHandler,
    pub sub_events: SubEventCommandHandler,
    pub volunteers: VolunteerCommandHandler,
    pub tasks: TaskCommandHandler,
    pub notifications: NotificationHandler,
    pub authorization: AuthorizationService,
}

impl Fixture {
    pub fn new() -> Self {
        let store = MemoryStore::new();
        let factory: Arc<dyn UnitOfWorkFactory> = MemoryUnitOfWorkFactory::new(store.clone());
        let AccessHandlers {
            users,
            user_queries,
            events,
            sub_events,
            volunteers,
            tasks,
            notifications,
            authorization,
        } = AccessHandlers::new(factory);
        Self {
            store,
            users,
            user_queries,
            events,
            sub_events,
            volunteers,
            tasks,
            notifications,
            authorization,
        }
    }

    pub fn notifications_for(&self, user_id: &UserId) -> Vec<Notification> {
        self.store
            .snapshot()
            .notifications
            .into_iter()
            .filter(|n| n.user_id == *user_id)
            .collect()
    }
}
