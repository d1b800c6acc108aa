// ==========================================
// 钢材物料短文本解析 - 仓储层错误类型
// ==========================================
// 覆盖: 连接锁 / 事务 / 查询 / 约束 / 记录损坏
// ==========================================

use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("数据库锁获取失败: {0}")]
    LockError(String),

    #[error("数据库事务失败: {0}")]
    TransactionError(String),

    #[error("数据库查询失败: {0}")]
    QueryError(String),

    // run_id 为主键，同一次运行只能落库一次
    #[error("运行记录重复: {0}")]
    DuplicateRun(String),

    #[error("约束违反: {0}")]
    ConstraintViolation(String),

    #[error("运行记录损坏 (run_id={run_id}, field={field}): {message}")]
    CorruptRecord {
        run_id: String,
        field: String,
        message: String,
    },
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(code, msg)
                if code.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                let msg = msg.unwrap_or_else(|| code.to_string());
                if msg.contains("UNIQUE") {
                    RepositoryError::DuplicateRun(msg)
                } else {
                    RepositoryError::ConstraintViolation(msg)
                }
            }
            other => RepositoryError::QueryError(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn constraint_error(sql: &str) -> RepositoryError {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE t (id TEXT PRIMARY KEY, n INTEGER NOT NULL);
             INSERT INTO t VALUES ('a', 1);",
        )
        .unwrap();
        conn.execute(sql, []).unwrap_err().into()
    }

    #[test]
    fn test_unique_violation_maps_to_duplicate_run() {
        let err = constraint_error("INSERT INTO t VALUES ('a', 2)");
        assert!(matches!(err, RepositoryError::DuplicateRun(_)));
    }

    #[test]
    fn test_other_constraint_violation() {
        let err = constraint_error("INSERT INTO t VALUES ('b', NULL)");
        assert!(matches!(err, RepositoryError::ConstraintViolation(_)));
    }

    #[test]
    fn test_plain_errors_are_query_errors() {
        let err: RepositoryError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, RepositoryError::QueryError(_)));
    }
}
