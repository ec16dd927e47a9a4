//! 任务命令处理器

use std::sync::Arc;

use chrono::Utc;
use eventrax_common::TaskId;
use eventrax_errors::{AppError, AppResult};
use tracing::info;

use super::commands::*;
use crate::application::guard::authorize;
use crate::application::lookup::load_sub_event;
use crate::application::side_effects::apply_side_effects;
use crate::domain::UnitOfWorkFactory;
use crate::domain::policy::{Actor, Operation, TaskScope};
use crate::domain::task::Task;
use crate::domain::user::User;

/// 任务命令处理器
pub struct TaskCommandHandler {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
}

impl TaskCommandHandler {
    pub fn new(uow_factory: Arc<dyn UnitOfWorkFactory>) -> Self {
        Self { uow_factory }
    }

    /// 创建任务，遵循角色层级
    pub async fn handle_create(
        &self,
        actor: Option<&Actor>,
        cmd: CreateTaskCommand,
    ) -> AppResult<Task> {
        let uow = self.uow_factory.begin().await?;

        let assignee = uow.users().find_by_id(&cmd.assigned_to).await?;
        let scope = match cmd.sub_event_id {
            Some(id) => TaskScope::SubEvent(
                load_sub_event(&*uow, &id)
                    .await?
                    .map(|(_, ownership)| ownership),
            ),
            None => TaskScope::Unscoped,
        };

        let task_id = TaskId::new();
        let grant = authorize(
            actor,
            &Operation::CreateTask {
                task_id,
                assignee: assignee.as_ref().map(User::facts),
                scope,
            },
        )?;

        let mut task = Task::new(
            cmd.title,
            cmd.description,
            cmd.assigned_to,
            grant.actor.id,
            cmd.sub_event_id,
            cmd.due_at,
        );
        task.id = task_id;

        if task.title.trim().is_empty() {
            return Err(AppError::validation("Task title must not be empty"));
        }
        uow.tasks().create(&task).await?;
        apply_side_effects(&*uow, &grant.side_effects, grant.actor.id).await?;
        uow.commit().await?;

        info!(
            task_id = %task.id,
            assigned_to = %task.assigned_to,
            assigned_by = %task.assigned_by,
            "Task created"
        );
        Ok(task)
    }

    /// 执行人更新进度
    pub async fn handle_update_status(
        &self,
        actor: Option<&Actor>,
        cmd: UpdateTaskStatusCommand,
    ) -> AppResult<Task> {
        let uow = self.uow_factory.begin().await?;

        let task = uow.tasks().find_by_id(&cmd.task_id).await?;
        authorize(
            actor,
            &Operation::UpdateTaskStatus {
                task: task.as_ref().map(Task::facts),
            },
        )?;
        let mut task = task.ok_or_else(|| AppError::not_found("Task not found"))?;

        task.refresh_overdue(Utc::now());
        task.transition(cmd.status)?;
        uow.tasks().update(&task).await?;
        uow.commit().await?;

        info!(task_id = %task.id, status = %task.status, "Task status updated");
        Ok(task)
    }

    /// 分配人修改任务
    pub async fn handle_edit(&self, actor: Option<&Actor>, cmd: EditTaskCommand) -> AppResult<Task> {
        let uow = self.uow_factory.begin().await?;

        let task = uow.tasks().find_by_id(&cmd.task_id).await?;
        authorize(
            actor,
            &Operation::EditTask {
                task: task.as_ref().map(Task::facts),
            },
        )?;
        let mut task = task.ok_or_else(|| AppError::not_found("Task not found"))?;

        if cmd.title.trim().is_empty() {
            return Err(AppError::validation("Task title must not be empty"));
        }
        task.update_details(cmd.title, cmd.description, cmd.due_at);
        task.refresh_overdue(Utc::now());
        uow.tasks().update(&task).await?;
        uow.commit().await?;

        Ok(task)
    }

    /// 分配人删除任务
    pub async fn handle_delete(&self, actor: Option<&Actor>, cmd: DeleteTaskCommand) -> AppResult<()> {
        let uow = self.uow_factory.begin().await?;

        let task = uow.tasks().find_by_id(&cmd.task_id).await?;
        authorize(
            actor,
            &Operation::DeleteTask {
                task: task.as_ref().map(Task::facts),
            },
        )?;

        uow.tasks().delete(&cmd.task_id).await?;
        uow.commit().await?;

        info!(task_id = %cmd.task_id, "Task deleted");
        Ok(())
    }
}
