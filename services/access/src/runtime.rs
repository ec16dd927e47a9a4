//! 服务运行时
//!
//! 加载配置、初始化遥测、创建连接池并装配所有处理器。

use std::sync::Arc;
use std::time::Duration;

use eventrax_adapter_postgres::{PostgresConfig, check_connection, create_pool};
use eventrax_config::AppConfig;
use eventrax_errors::{AppError, AppResult};
use eventrax_telemetry::{
    HealthStatus, PrometheusHandle, init_metrics, init_tracing, init_tracing_json,
};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::application::{
    AuthorizationService, EventCommandHandler, NotificationHandler, SubEventCommandHandler,
    TaskCommandHandler, UserCommandHandler, UserQueryHandler, VolunteerCommandHandler,
};
use crate::domain::UnitOfWorkFactory;
use crate::infrastructure::PostgresUnitOfWorkFactory;

/// 共享同一个 Unit of Work 工厂的处理器集合
pub struct AccessHandlers {
    pub users: UserCommandHandler,
    pub user_queries: UserQueryHandler,
    pub events: EventCommandHandler,
    pub sub_events: SubEventCommandHandler,
    pub volunteers: VolunteerCommandHandler,
    pub tasks: TaskCommandHandler,
    pub notifications: NotificationHandler,
    pub authorization: AuthorizationService,
}

impl AccessHandlers {
    pub fn new(uow_factory: Arc<dyn UnitOfWorkFactory>) -> Self {
        Self {
            users: UserCommandHandler::new(uow_factory.clone()),
            user_queries: UserQueryHandler::new(uow_factory.clone()),
            events: EventCommandHandler::new(uow_factory.clone()),
            sub_events: SubEventCommandHandler::new(uow_factory.clone()),
            volunteers: VolunteerCommandHandler::new(uow_factory.clone()),
            tasks: TaskCommandHandler::new(uow_factory.clone()),
            notifications: NotificationHandler::new(uow_factory.clone()),
            authorization: AuthorizationService::new(uow_factory),
        }
    }
}

/// 访问控制服务运行时
pub struct AccessRuntime {
    config: AppConfig,
    pool: PgPool,
    metrics: Option<PrometheusHandle>,
    handlers: AccessHandlers,
}

impl AccessRuntime {
    /// 从配置目录启动
    pub async fn bootstrap(config_dir: &str) -> AppResult<Self> {
        let config = AppConfig::load(config_dir)
            .map_err(|e| AppError::internal(format!("Failed to load config: {}", e)))?;
        Self::from_config(config).await
    }

    /// 从已加载的配置启动
    pub async fn from_config(config: AppConfig) -> AppResult<Self> {
        let tracing_result = if config.is_production() || config.telemetry.json {
            init_tracing_json(&config.telemetry.log_level)
        } else {
            init_tracing(&config.telemetry.log_level)
        };
        // 宿主进程可能已安装 subscriber
        if let Err(e) = tracing_result {
            warn!(error = %e, "Tracing subscriber not installed");
        }

        let metrics = if config.telemetry.metrics_enabled {
            match init_metrics() {
                Ok(handle) => Some(handle),
                Err(e) => {
                    warn!(error = %e, "Prometheus recorder not installed");
                    None
                }
            }
        } else {
            None
        };

        let pg_config = PostgresConfig::new(config.database.url.expose_secret())
            .with_max_connections(config.database.max_connections)
            .with_connect_timeout(Duration::from_secs(config.database.connect_timeout_secs));
        let pool = create_pool(&pg_config).await?;
        check_connection(&pool).await?;

        let uow_factory: Arc<dyn UnitOfWorkFactory> =
            Arc::new(PostgresUnitOfWorkFactory::new(pool.clone()));
        let handlers = AccessHandlers::new(uow_factory);

        info!(
            app_name = %config.app_name,
            app_env = %config.app_env,
            metrics_enabled = metrics.is_some(),
            "Access runtime initialized"
        );

        Ok(Self {
            config,
            pool,
            metrics,
            handlers,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn handlers(&self) -> &AccessHandlers {
        &self.handlers
    }

    /// Prometheus 文本格式的指标快照
    pub fn render_metrics(&self) -> Option<String> {
        self.metrics.as_ref().map(PrometheusHandle::render)
    }

    /// 健康检查
    pub async fn health(&self) -> HealthStatus {
        let mut status = HealthStatus::new();
        match check_connection(&self.pool).await {
            Ok(()) => status.add_check("postgres", true, None),
            Err(e) => {
                warn!(error = %e, "Database health check failed");
                status.add_check("postgres", false, Some(e.to_string()));
            }
        }
        status
    }

    /// 关闭连接池
    pub async fn shutdown(self) {
        self.pool.close().await;
        info!("Access runtime shut down");
    }
}
