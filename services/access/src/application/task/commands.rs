//! 任务相关命令定义

use chrono::{DateTime, Utc};
use eventrax_common::{SubEventId, TaskId, UserId};

use crate::domain::task::TaskStatus;

/// 创建任务命令
#[derive(Debug, Clone)]
pub struct CreateTaskCommand {
    pub title: String,
    pub description: Option<String>,
    pub assigned_to: UserId,
    pub sub_event_id: Option<SubEventId>,
    pub due_at: Option<DateTime<Utc>>,
}

/// 执行人更新进度命令
#[derive(Debug, Clone)]
pub struct UpdateTaskStatusCommand {
    pub task_id: TaskId,
    pub status: TaskStatus,
}

/// 分配人修改任务命令
#[derive(Debug, Clone)]
pub struct EditTaskCommand {
    pub task_id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub due_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct DeleteTaskCommand {
    pub task_id: TaskId,
}
