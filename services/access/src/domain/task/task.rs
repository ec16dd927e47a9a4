//! 任务实体

use chrono::{DateTime, Utc};
use eventrax_common::{SubEventId, TaskId, UserId};
use eventrax_errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::domain::policy::TaskFacts;

/// 任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Overdue,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Overdue => "overdue",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            "overdue" => Ok(TaskStatus::Overdue),
            _ => Err(format!("Unknown task status: {}", s)),
        }
    }
}

/// 任务实体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub assigned_to: UserId,
    pub assigned_by: UserId,
    pub sub_event_id: Option<SubEventId>,
    pub status: TaskStatus,
    pub due_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(
        title: String,
        description: Option<String>,
        assigned_to: UserId,
        assigned_by: UserId,
        sub_event_id: Option<SubEventId>,
        due_at: Option<DateTime<Utc>>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: TaskId::new(),
            title,
            description,
            assigned_to,
            assigned_by,
            sub_event_id,
            status: TaskStatus::Pending,
            due_at,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn facts(&self) -> TaskFacts {
        TaskFacts {
            task_id: self.id,
            assigned_to: self.assigned_to,
            assigned_by: self.assigned_by,
        }
    }

    /// 执行人更新进度
    ///
    /// 只允许推进到 in_progress 或 completed；completed 为终态，overdue 由系统计算。
    pub fn transition(&mut self, to: TaskStatus) -> AppResult<()> {
        if self.status == TaskStatus::Completed {
            return Err(AppError::failed_precondition("Task is already completed"));
        }
        match to {
            TaskStatus::InProgress | TaskStatus::Completed => {
                self.status = to;
                self.updated_at = Utc::now();
                Ok(())
            }
            TaskStatus::Pending | TaskStatus::Overdue => Err(AppError::validation(format!(
                "Task status cannot be set to {}",
                to
            ))),
        }
    }

    /// 截止时间已过且未完成的任务标记为 overdue，返回状态是否变化
    pub fn refresh_overdue(&mut self, now: DateTime<Utc>) -> bool {
        let past_due = self.due_at.is_some_and(|due| due < now);
        if past_due && matches!(self.status, TaskStatus::Pending | TaskStatus::InProgress) {
            self.status = TaskStatus::Overdue;
            self.updated_at = now;
            return true;
        }
        false
    }

    pub fn update_details(
        &mut self,
        title: String,
        description: Option<String>,
        due_at: Option<DateTime<Utc>>,
    ) {
        self.title = title;
        self.description = description;
        self.due_at = due_at;
        self.updated_at = Utc::now();
    }
}
