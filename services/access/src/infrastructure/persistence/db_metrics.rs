//! 数据库查询监控

use std::time::Instant;

use metrics::{counter, gauge, histogram};
use sqlx::PgPool;

/// 慢查询阈值
const SLOW_QUERY_MS: u128 = 100;

/// 数据库监控工具
pub struct DbMetrics;

impl DbMetrics {
    /// 记录连接池状态
    pub fn record_pool_state(pool: &PgPool) {
        gauge!("db_pool_size").set(pool.size() as f64);
        gauge!("db_pool_idle").set(pool.num_idle() as f64);
    }

    fn record_query(start: Instant, table: &'static str, operation: &'static str, ok: bool) {
        histogram!("db_query_duration_ms", "table" => table, "operation" => operation)
            .record(start.elapsed().as_millis() as f64);
        counter!("db_queries_total", "table" => table, "operation" => operation).increment(1);
        if !ok {
            counter!("db_query_errors_total", "table" => table, "operation" => operation)
                .increment(1);
        }
    }
}

/// 查询计时守卫
pub struct QueryTimer {
    start: Instant,
    table: &'static str,
    operation: &'static str,
}

impl QueryTimer {
    pub fn new(table: &'static str, operation: &'static str) -> Self {
        Self {
            start: Instant::now(),
            table,
            operation,
        }
    }

    /// 根据查询结果记录耗时与错误，并原样返回结果
    pub fn observe<T, E>(self, result: Result<T, E>) -> Result<T, E> {
        let duration_ms = self.start.elapsed().as_millis();
        DbMetrics::record_query(self.start, self.table, self.operation, result.is_ok());

        if duration_ms > SLOW_QUERY_MS {
            tracing::warn!(
                table = self.table,
                operation = self.operation,
                duration_ms = %duration_ms,
                failed = result.is_err(),
                "Slow query detected"
            );
            counter!("db_slow_queries_total", "table" => self.table, "operation" => self.operation)
                .increment(1);
        }
        result
    }
}
