//! 事务内仓储
//!
//! 所有仓储共享同一个事务，而不是直接使用连接池。

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use eventrax_common::{
    ApplicationId, AuditInfo, EventId, NotificationId, Pagination, SubEventId, TaskId, UserId,
};
use eventrax_errors::{AppError, AppResult};
use sqlx::types::Json;
use sqlx::{Postgres, Transaction};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::db_metrics::QueryTimer;
use super::error_mapper::{map_decode_error, map_sqlx_error};
use crate::domain::event::{Event, EventRepository, Schedule, SubEvent, SubEventRepository};
use crate::domain::notification::{Notification, NotificationKind, NotificationRepository};
use crate::domain::task::{Task, TaskRepository};
use crate::domain::user::{User, UserRepository};
use crate::domain::volunteer::{ApplicationRole, VolunteerApplication, VolunteerRepository};

/// 共享事务类型
pub type SharedTx = Arc<Mutex<Option<Transaction<'static, Postgres>>>>;

/// 定义事务仓储结构
macro_rules! define_tx_repo {
    ($name:ident) => {
        pub struct $name {
            tx: SharedTx,
        }

        impl $name {
            pub fn new(tx: SharedTx) -> Self {
                Self { tx }
            }
        }
    };
}

define_tx_repo!(TxUserRepository);
define_tx_repo!(TxEventRepository);
define_tx_repo!(TxSubEventRepository);
define_tx_repo!(TxVolunteerRepository);
define_tx_repo!(TxTaskRepository);
define_tx_repo!(TxNotificationRepository);

fn parse<T: std::str::FromStr>(column: &str, value: &str) -> AppResult<T> {
    value.parse().map_err(|_| map_decode_error(column, value))
}

// ============================================
// Users
// ============================================

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    role: String,
    status: String,
    created_at: DateTime<Utc>,
    created_by: Option<Uuid>,
    updated_at: DateTime<Utc>,
    updated_by: Option<Uuid>,
}

impl UserRow {
    fn into_user(self) -> AppResult<User> {
        Ok(User {
            id: UserId::from_uuid(self.id),
            name: self.name,
            email: self.email,
            role: parse("users.role", &self.role)?,
            status: parse("users.status", &self.status)?,
            audit_info: AuditInfo {
                created_at: self.created_at,
                created_by: self.created_by.map(UserId::from_uuid),
                updated_at: self.updated_at,
                updated_by: self.updated_by.map(UserId::from_uuid),
            },
        })
    }
}

#[async_trait]
impl UserRepository for TxUserRepository {
    async fn find_by_id(&self, id: &UserId) -> AppResult<Option<User>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let timer = QueryTimer::new("users", "find_by_id");
        let row = timer
            .observe(
                sqlx::query_as::<_, UserRow>(
                    r#"
                    SELECT id, name, email, role, status, created_at, created_by, updated_at, updated_by
                    FROM users WHERE id = $1
                    "#,
                )
                .bind(id.0)
                .fetch_optional(&mut **tx)
                .await,
            )
            .map_err(map_sqlx_error)?;

        row.map(UserRow::into_user).transpose()
    }

    async fn update(&self, user: &User) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let timer = QueryTimer::new("users", "update");
        let result = timer
            .observe(
                sqlx::query(
                    r#"
                    UPDATE users
                    SET role = $2, status = $3, updated_at = $4, updated_by = $5
                    WHERE id = $1
                    "#,
                )
                .bind(user.id.0)
                .bind(user.role.as_str())
                .bind(user.status.as_str())
                .bind(user.audit_info.updated_at)
                .bind(user.audit_info.updated_by.map(|u| u.0))
                .execute(&mut **tx)
                .await,
            )
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("User {} not found", user.id)));
        }
        Ok(())
    }

    async fn delete(&self, id: &UserId) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let timer = QueryTimer::new("users", "delete");
        timer
            .observe(
                sqlx::query("DELETE FROM users WHERE id = $1")
                    .bind(id.0)
                    .execute(&mut **tx)
                    .await,
            )
            .map_err(map_sqlx_error)?;

        Ok(())
    }
}

// ============================================
// Events
// ============================================

#[derive(sqlx::FromRow)]
struct EventRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    creator_id: Uuid,
    assigned_creator_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    created_by: Option<Uuid>,
    updated_at: DateTime<Utc>,
    updated_by: Option<Uuid>,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Event {
            id: EventId::from_uuid(row.id),
            title: row.title,
            description: row.description,
            creator_id: UserId::from_uuid(row.creator_id),
            assigned_creator_id: row.assigned_creator_id.map(UserId::from_uuid),
            audit_info: AuditInfo {
                created_at: row.created_at,
                created_by: row.created_by.map(UserId::from_uuid),
                updated_at: row.updated_at,
                updated_by: row.updated_by.map(UserId::from_uuid),
            },
        }
    }
}

#[async_trait]
impl EventRepository for TxEventRepository {
    async fn create(&self, event: &Event) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let timer = QueryTimer::new("events", "create");
        timer
            .observe(
                sqlx::query(
                    r#"
                    INSERT INTO events (id, title, description, creator_id, assigned_creator_id,
                                        created_at, created_by, updated_at, updated_by)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                    "#,
                )
                .bind(event.id.0)
                .bind(&event.title)
                .bind(&event.description)
                .bind(event.creator_id.0)
                .bind(event.assigned_creator_id.map(|u| u.0))
                .bind(event.audit_info.created_at)
                .bind(event.audit_info.created_by.map(|u| u.0))
                .bind(event.audit_info.updated_at)
                .bind(event.audit_info.updated_by.map(|u| u.0))
                .execute(&mut **tx)
                .await,
            )
            .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn update(&self, event: &Event) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let timer = QueryTimer::new("events", "update");
        let result = timer
            .observe(
                sqlx::query(
                    r#"
                    UPDATE events
                    SET title = $2, description = $3, assigned_creator_id = $4,
                        updated_at = $5, updated_by = $6
                    WHERE id = $1
                    "#,
                )
                .bind(event.id.0)
                .bind(&event.title)
                .bind(&event.description)
                .bind(event.assigned_creator_id.map(|u| u.0))
                .bind(event.audit_info.updated_at)
                .bind(event.audit_info.updated_by.map(|u| u.0))
                .execute(&mut **tx)
                .await,
            )
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Event {} not found", event.id)));
        }
        Ok(())
    }

    async fn delete(&self, id: &EventId) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let timer = QueryTimer::new("events", "delete");
        timer
            .observe(
                sqlx::query("DELETE FROM events WHERE id = $1")
                    .bind(id.0)
                    .execute(&mut **tx)
                    .await,
            )
            .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: &EventId) -> AppResult<Option<Event>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let timer = QueryTimer::new("events", "find_by_id");
        let row = timer
            .observe(
                sqlx::query_as::<_, EventRow>(
                    r#"
                    SELECT id, title, description, creator_id, assigned_creator_id,
                           created_at, created_by, updated_at, updated_by
                    FROM events WHERE id = $1
                    "#,
                )
                .bind(id.0)
                .fetch_optional(&mut **tx)
                .await,
            )
            .map_err(map_sqlx_error)?;

        Ok(row.map(Event::from))
    }
}

// ============================================
// Sub-events
// ============================================

#[derive(sqlx::FromRow)]
struct SubEventRow {
    id: Uuid,
    event_id: Uuid,
    title: String,
    description: Option<String>,
    team_lead_id: Option<Uuid>,
    schedule: Option<Json<Schedule>>,
    version: i64,
    created_at: DateTime<Utc>,
    created_by: Option<Uuid>,
    updated_at: DateTime<Utc>,
    updated_by: Option<Uuid>,
}

impl From<SubEventRow> for SubEvent {
    fn from(row: SubEventRow) -> Self {
        SubEvent {
            id: SubEventId::from_uuid(row.id),
            event_id: EventId::from_uuid(row.event_id),
            title: row.title,
            description: row.description,
            team_lead_id: row.team_lead_id.map(UserId::from_uuid),
            schedule: row.schedule.map(|s| s.0),
            version: row.version,
            audit_info: AuditInfo {
                created_at: row.created_at,
                created_by: row.created_by.map(UserId::from_uuid),
                updated_at: row.updated_at,
                updated_by: row.updated_by.map(UserId::from_uuid),
            },
        }
    }
}

#[async_trait]
impl SubEventRepository for TxSubEventRepository {
    async fn create(&self, sub_event: &SubEvent) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let timer = QueryTimer::new("sub_events", "create");
        timer
            .observe(
                sqlx::query(
                    r#"
                    INSERT INTO sub_events (id, event_id, title, description, team_lead_id, schedule,
                                            version, created_at, created_by, updated_at, updated_by)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                    "#,
                )
                .bind(sub_event.id.0)
                .bind(sub_event.event_id.0)
                .bind(&sub_event.title)
                .bind(&sub_event.description)
                .bind(sub_event.team_lead_id.map(|u| u.0))
                .bind(sub_event.schedule.as_ref().map(Json))
                .bind(sub_event.version)
                .bind(sub_event.audit_info.created_at)
                .bind(sub_event.audit_info.created_by.map(|u| u.0))
                .bind(sub_event.audit_info.updated_at)
                .bind(sub_event.audit_info.updated_by.map(|u| u.0))
                .execute(&mut **tx)
                .await,
            )
            .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn update(&self, sub_event: &SubEvent) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let timer = QueryTimer::new("sub_events", "update");
        let result = timer
            .observe(
                sqlx::query(
                    r#"
                    UPDATE sub_events
                    SET title = $3, description = $4, team_lead_id = $5, schedule = $6,
                        version = version + 1, updated_at = $7, updated_by = $8
                    WHERE id = $1 AND version = $2
                    "#,
                )
                .bind(sub_event.id.0)
                .bind(sub_event.version)
                .bind(&sub_event.title)
                .bind(&sub_event.description)
                .bind(sub_event.team_lead_id.map(|u| u.0))
                .bind(sub_event.schedule.as_ref().map(Json))
                .bind(sub_event.audit_info.updated_at)
                .bind(sub_event.audit_info.updated_by.map(|u| u.0))
                .execute(&mut **tx)
                .await,
            )
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::conflict(format!(
                "Sub-event {} was modified concurrently (version {})",
                sub_event.id, sub_event.version
            )));
        }
        Ok(())
    }

    async fn delete(&self, id: &SubEventId) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let timer = QueryTimer::new("sub_events", "delete");
        timer
            .observe(
                sqlx::query("DELETE FROM sub_events WHERE id = $1")
                    .bind(id.0)
                    .execute(&mut **tx)
                    .await,
            )
            .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: &SubEventId) -> AppResult<Option<SubEvent>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let timer = QueryTimer::new("sub_events", "find_by_id");
        let row = timer
            .observe(
                sqlx::query_as::<_, SubEventRow>(
                    r#"
                    SELECT id, event_id, title, description, team_lead_id, schedule, version,
                           created_at, created_by, updated_at, updated_by
                    FROM sub_events WHERE id = $1
                    "#,
                )
                .bind(id.0)
                .fetch_optional(&mut **tx)
                .await,
            )
            .map_err(map_sqlx_error)?;

        Ok(row.map(SubEvent::from))
    }
}

// ============================================
// Volunteer applications & memberships
// ============================================

#[derive(sqlx::FromRow)]
struct ApplicationRow {
    id: Uuid,
    student_id: Uuid,
    sub_event_id: Uuid,
    role: String,
    status: String,
    motivation: Option<String>,
    applied_at: DateTime<Utc>,
    reviewed_by: Option<Uuid>,
    reviewed_at: Option<DateTime<Utc>>,
}

impl ApplicationRow {
    fn into_application(self) -> AppResult<VolunteerApplication> {
        Ok(VolunteerApplication {
            id: ApplicationId::from_uuid(self.id),
            student_id: UserId::from_uuid(self.student_id),
            sub_event_id: SubEventId::from_uuid(self.sub_event_id),
            role: parse("volunteer_applications.role", &self.role)?,
            status: parse("volunteer_applications.status", &self.status)?,
            motivation: self.motivation,
            applied_at: self.applied_at,
            reviewed_by: self.reviewed_by.map(UserId::from_uuid),
            reviewed_at: self.reviewed_at,
        })
    }
}

const APPLICATION_COLUMNS: &str = "id, student_id, sub_event_id, role, status, motivation, \
                                   applied_at, reviewed_by, reviewed_at";

#[async_trait]
impl VolunteerRepository for TxVolunteerRepository {
    async fn create(&self, application: &VolunteerApplication) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let timer = QueryTimer::new("volunteer_applications", "create");
        timer
            .observe(
                sqlx::query(
                    r#"
                    INSERT INTO volunteer_applications (id, student_id, sub_event_id, role, status,
                                                        motivation, applied_at, reviewed_by, reviewed_at)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                    "#,
                )
                .bind(application.id.0)
                .bind(application.student_id.0)
                .bind(application.sub_event_id.0)
                .bind(application.role.as_str())
                .bind(application.status.as_str())
                .bind(&application.motivation)
                .bind(application.applied_at)
                .bind(application.reviewed_by.map(|u| u.0))
                .bind(application.reviewed_at)
                .execute(&mut **tx)
                .await,
            )
            .map_err(|e| match map_sqlx_error(e) {
                AppError::Conflict(_) => AppError::conflict(
                    "Student already has an active application for this sub-event",
                ),
                other => other,
            })?;

        Ok(())
    }

    async fn update(&self, application: &VolunteerApplication) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let timer = QueryTimer::new("volunteer_applications", "update");
        let result = timer
            .observe(
                sqlx::query(
                    r#"
                    UPDATE volunteer_applications
                    SET role = $2, status = $3, reviewed_by = $4, reviewed_at = $5
                    WHERE id = $1
                    "#,
                )
                .bind(application.id.0)
                .bind(application.role.as_str())
                .bind(application.status.as_str())
                .bind(application.reviewed_by.map(|u| u.0))
                .bind(application.reviewed_at)
                .execute(&mut **tx)
                .await,
            )
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Application {} not found",
                application.id
            )));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &ApplicationId) -> AppResult<Option<VolunteerApplication>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let sql = format!(
            "SELECT {} FROM volunteer_applications WHERE id = $1",
            APPLICATION_COLUMNS
        );
        let timer = QueryTimer::new("volunteer_applications", "find_by_id");
        let row = timer
            .observe(
                sqlx::query_as::<_, ApplicationRow>(&sql)
                    .bind(id.0)
                    .fetch_optional(&mut **tx)
                    .await,
            )
            .map_err(map_sqlx_error)?;

        row.map(ApplicationRow::into_application).transpose()
    }

    async fn find_active(
        &self,
        student_id: &UserId,
        sub_event_id: &SubEventId,
    ) -> AppResult<Option<VolunteerApplication>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        // 行锁: 同一申请上的并发降级/提升按顺序执行
        let sql = format!(
            "SELECT {} FROM volunteer_applications \
             WHERE student_id = $1 AND sub_event_id = $2 AND status <> 'removed' \
             FOR UPDATE",
            APPLICATION_COLUMNS
        );
        let timer = QueryTimer::new("volunteer_applications", "find_active");
        let row = timer
            .observe(
                sqlx::query_as::<_, ApplicationRow>(&sql)
                    .bind(student_id.0)
                    .bind(sub_event_id.0)
                    .fetch_optional(&mut **tx)
                    .await,
            )
            .map_err(map_sqlx_error)?;

        row.map(ApplicationRow::into_application).transpose()
    }

    async fn add_member(
        &self,
        user_id: &UserId,
        sub_event_id: &SubEventId,
        role: ApplicationRole,
    ) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let timer = QueryTimer::new("volunteers", "add_member");
        timer
            .observe(
                sqlx::query(
                    r#"
                    INSERT INTO volunteers (user_id, sub_event_id, role, joined_at)
                    VALUES ($1, $2, $3, NOW())
                    ON CONFLICT (user_id, sub_event_id, role) DO NOTHING
                    "#,
                )
                .bind(user_id.0)
                .bind(sub_event_id.0)
                .bind(role.as_str())
                .execute(&mut **tx)
                .await,
            )
            .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn remove_member(
        &self,
        user_id: &UserId,
        sub_event_id: &SubEventId,
        role: ApplicationRole,
    ) -> AppResult<u64> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let timer = QueryTimer::new("volunteers", "remove_member");
        let result = timer
            .observe(
                sqlx::query(
                    "DELETE FROM volunteers WHERE user_id = $1 AND sub_event_id = $2 AND role = $3",
                )
                .bind(user_id.0)
                .bind(sub_event_id.0)
                .bind(role.as_str())
                .execute(&mut **tx)
                .await,
            )
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }
}

// ============================================
// Tasks
// ============================================

#[derive(sqlx::FromRow)]
struct TaskRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    assigned_to: Uuid,
    assigned_by: Uuid,
    sub_event_id: Option<Uuid>,
    status: String,
    due_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TaskRow {
    fn into_task(self) -> AppResult<Task> {
        Ok(Task {
            id: TaskId::from_uuid(self.id),
            title: self.title,
            description: self.description,
            assigned_to: UserId::from_uuid(self.assigned_to),
            assigned_by: UserId::from_uuid(self.assigned_by),
            sub_event_id: self.sub_event_id.map(SubEventId::from_uuid),
            status: parse("tasks.status", &self.status)?,
            due_at: self.due_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[async_trait]
impl TaskRepository for TxTaskRepository {
    async fn create(&self, task: &Task) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let timer = QueryTimer::new("tasks", "create");
        timer
            .observe(
                sqlx::query(
                    r#"
                    INSERT INTO tasks (id, title, description, assigned_to, assigned_by, sub_event_id,
                                       status, due_at, created_at, updated_at)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                    "#,
                )
                .bind(task.id.0)
                .bind(&task.title)
                .bind(&task.description)
                .bind(task.assigned_to.0)
                .bind(task.assigned_by.0)
                .bind(task.sub_event_id.map(|s| s.0))
                .bind(task.status.as_str())
                .bind(task.due_at)
                .bind(task.created_at)
                .bind(task.updated_at)
                .execute(&mut **tx)
                .await,
            )
            .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn update(&self, task: &Task) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let timer = QueryTimer::new("tasks", "update");
        let result = timer
            .observe(
                sqlx::query(
                    r#"
                    UPDATE tasks
                    SET title = $2, description = $3, status = $4, due_at = $5, updated_at = $6
                    WHERE id = $1
                    "#,
                )
                .bind(task.id.0)
                .bind(&task.title)
                .bind(&task.description)
                .bind(task.status.as_str())
                .bind(task.due_at)
                .bind(task.updated_at)
                .execute(&mut **tx)
                .await,
            )
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Task {} not found", task.id)));
        }
        Ok(())
    }

    async fn delete(&self, id: &TaskId) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let timer = QueryTimer::new("tasks", "delete");
        timer
            .observe(
                sqlx::query("DELETE FROM tasks WHERE id = $1")
                    .bind(id.0)
                    .execute(&mut **tx)
                    .await,
            )
            .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: &TaskId) -> AppResult<Option<Task>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let timer = QueryTimer::new("tasks", "find_by_id");
        let row = timer
            .observe(
                sqlx::query_as::<_, TaskRow>(
                    r#"
                    SELECT id, title, description, assigned_to, assigned_by, sub_event_id,
                           status, due_at, created_at, updated_at
                    FROM tasks WHERE id = $1
                    "#,
                )
                .bind(id.0)
                .fetch_optional(&mut **tx)
                .await,
            )
            .map_err(map_sqlx_error)?;

        row.map(TaskRow::into_task).transpose()
    }
}

// ============================================
// Notifications
// ============================================

#[derive(sqlx::FromRow)]
struct NotificationRow {
    id: Uuid,
    user_id: Uuid,
    kind: Json<NotificationKind>,
    message: String,
    is_read: bool,
    created_at: DateTime<Utc>,
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        Notification {
            id: NotificationId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            kind: row.kind.0,
            message: row.message,
            is_read: row.is_read,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl NotificationRepository for TxNotificationRepository {
    async fn create(&self, notification: &Notification) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let timer = QueryTimer::new("notifications", "create");
        timer
            .observe(
                sqlx::query(
                    r#"
                    INSERT INTO notifications (id, user_id, kind, message, is_read, created_at)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    "#,
                )
                .bind(notification.id.0)
                .bind(notification.user_id.0)
                .bind(Json(&notification.kind))
                .bind(&notification.message)
                .bind(notification.is_read)
                .bind(notification.created_at)
                .execute(&mut **tx)
                .await,
            )
            .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: &NotificationId) -> AppResult<Option<Notification>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let timer = QueryTimer::new("notifications", "find_by_id");
        let row = timer
            .observe(
                sqlx::query_as::<_, NotificationRow>(
                    r#"
                    SELECT id, user_id, kind, message, is_read, created_at
                    FROM notifications WHERE id = $1
                    "#,
                )
                .bind(id.0)
                .fetch_optional(&mut **tx)
                .await,
            )
            .map_err(map_sqlx_error)?;

        Ok(row.map(Notification::from))
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
        unread_only: bool,
        pagination: &Pagination,
    ) -> AppResult<(Vec<Notification>, u64)> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let timer = QueryTimer::new("notifications", "count_for_user");
        let total: i64 = timer
            .observe(
                sqlx::query_scalar(
                    r#"
                    SELECT COUNT(*) FROM notifications
                    WHERE user_id = $1 AND ($2 = FALSE OR is_read = FALSE)
                    "#,
                )
                .bind(user_id.0)
                .bind(unread_only)
                .fetch_one(&mut **tx)
                .await,
            )
            .map_err(map_sqlx_error)?;

        let timer = QueryTimer::new("notifications", "list_for_user");
        let rows = timer
            .observe(
                sqlx::query_as::<_, NotificationRow>(
                    r#"
                    SELECT id, user_id, kind, message, is_read, created_at
                    FROM notifications
                    WHERE user_id = $1 AND ($2 = FALSE OR is_read = FALSE)
                    ORDER BY created_at DESC
                    LIMIT $3 OFFSET $4
                    "#,
                )
                .bind(user_id.0)
                .bind(unread_only)
                .bind(pagination.page_size as i64)
                .bind(pagination.offset() as i64)
                .fetch_all(&mut **tx)
                .await,
            )
            .map_err(map_sqlx_error)?;

        Ok((rows.into_iter().map(Notification::from).collect(), total as u64))
    }

    async fn mark_read(&self, id: &NotificationId) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let timer = QueryTimer::new("notifications", "mark_read");
        timer
            .observe(
                sqlx::query("UPDATE notifications SET is_read = TRUE WHERE id = $1")
                    .bind(id.0)
                    .execute(&mut **tx)
                    .await,
            )
            .map_err(map_sqlx_error)?;

        Ok(())
    }
}
