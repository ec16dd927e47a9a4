//! PostgreSQL Unit of Work 实现

use std::sync::Arc;

use async_trait::async_trait;
use eventrax_errors::{AppError, AppResult};
use sqlx::{PgPool, Postgres, Transaction};
use tokio::sync::Mutex;
use tracing::debug;

use super::db_metrics::DbMetrics;
use super::tx_repositories::{
    SharedTx, TxEventRepository, TxNotificationRepository, TxSubEventRepository,
    TxTaskRepository, TxUserRepository, TxVolunteerRepository,
};
use crate::domain::event::{EventRepository, SubEventRepository};
use crate::domain::notification::NotificationRepository;
use crate::domain::task::TaskRepository;
use crate::domain::unit_of_work::{UnitOfWork, UnitOfWorkFactory};
use crate::domain::user::UserRepository;
use crate::domain::volunteer::VolunteerRepository;

/// Postgres Unit of Work 工厂
pub struct PostgresUnitOfWorkFactory {
    pool: PgPool,
}

impl PostgresUnitOfWorkFactory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UnitOfWorkFactory for PostgresUnitOfWorkFactory {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        DbMetrics::record_pool_state(&self.pool);

        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {}", e)))?;

        Ok(Box::new(PostgresUnitOfWork::new(tx)))
    }
}

/// Postgres Unit of Work 实现
///
/// 未提交即被丢弃时，sqlx 的 `Transaction` 在 drop 时回滚。
pub struct PostgresUnitOfWork {
    tx: SharedTx,
    user_repo: TxUserRepository,
    event_repo: TxEventRepository,
    sub_event_repo: TxSubEventRepository,
    volunteer_repo: TxVolunteerRepository,
    task_repo: TxTaskRepository,
    notification_repo: TxNotificationRepository,
}

impl PostgresUnitOfWork {
    pub fn new(tx: Transaction<'static, Postgres>) -> Self {
        let tx: SharedTx = Arc::new(Mutex::new(Some(tx)));

        Self {
            user_repo: TxUserRepository::new(tx.clone()),
            event_repo: TxEventRepository::new(tx.clone()),
            sub_event_repo: TxSubEventRepository::new(tx.clone()),
            volunteer_repo: TxVolunteerRepository::new(tx.clone()),
            task_repo: TxTaskRepository::new(tx.clone()),
            notification_repo: TxNotificationRepository::new(tx.clone()),
            tx,
        }
    }
}

#[async_trait]
impl UnitOfWork for PostgresUnitOfWork {
    fn users(&self) -> &dyn UserRepository {
        &self.user_repo
    }

    fn events(&self) -> &dyn EventRepository {
        &self.event_repo
    }

    fn sub_events(&self) -> &dyn SubEventRepository {
        &self.sub_event_repo
    }

    fn volunteers(&self) -> &dyn VolunteerRepository {
        &self.volunteer_repo
    }

    fn tasks(&self) -> &dyn TaskRepository {
        &self.task_repo
    }

    fn notifications(&self) -> &dyn NotificationRepository {
        &self.notification_repo
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .take()
            .ok_or_else(|| AppError::internal("Transaction already consumed"))?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit transaction: {}", e)))?;

        debug!("Transaction committed");
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .take()
            .ok_or_else(|| AppError::internal("Transaction already consumed"))?;

        tx.rollback()
            .await
            .map_err(|e| AppError::database(format!("Failed to rollback transaction: {}", e)))?;

        debug!("Transaction rolled back");
        Ok(())
    }
}
