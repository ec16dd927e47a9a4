//! 数据库错误映射工具

use eventrax_errors::AppError;

/// 将 SQLx 错误转换为 AppError，区分不同错误类型
pub fn map_sqlx_error(e: sqlx::Error) -> AppError {
    match e {
        sqlx::Error::RowNotFound => AppError::not_found("Record not found"),
        sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
            Some("23505") => AppError::conflict("Duplicate entry violates unique constraint"),
            Some("23503") => AppError::validation("Referenced record does not exist"),
            Some("23514") => AppError::validation("Check constraint violation"),
            Some("23502") => AppError::validation("Not null constraint violation"),
            // 序列化失败与死锁: 并发写入冲突
            Some("40001") | Some("40P01") => {
                AppError::conflict("Concurrent modification, please retry")
            }
            Some(code) => AppError::database(format!("Database error ({}): {}", code, db_err)),
            None => AppError::database(db_err.to_string()),
        },
        sqlx::Error::PoolTimedOut => AppError::internal("Database connection pool timeout"),
        sqlx::Error::PoolClosed => AppError::internal("Database connection pool is closed"),
        sqlx::Error::ColumnDecode { index, source } => {
            AppError::internal(format!("Failed to decode column {}: {}", index, source))
        }
        _ => AppError::database(e.to_string()),
    }
}

/// 存储中的枚举文本无法解析时视为数据损坏
pub fn map_decode_error(column: &str, value: &str) -> AppError {
    AppError::internal(format!("Invalid value '{}' in column {}", value, column))
}
