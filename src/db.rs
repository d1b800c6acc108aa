// ==========================================
// 钢材物料短文本解析 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 首次使用时建表（config_kv / extraction_run / value_frequency）
// ==========================================

use rusqlite::Connection;
use std::path::PathBuf;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "STEEL_EXTRACTOR_DB_PATH";

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 建表（幂等）
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key      TEXT NOT NULL,
            value    TEXT NOT NULL,
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS extraction_run (
            run_id          TEXT PRIMARY KEY,
            file_name       TEXT NOT NULL,
            supplier        TEXT NOT NULL,
            processed_at    TEXT NOT NULL,
            rows_processed  INTEGER NOT NULL,
            grade_found     INTEGER NOT NULL,
            no_grade_found  INTEGER NOT NULL,
            highlighted     INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS value_frequency (
            run_id  TEXT NOT NULL REFERENCES extraction_run(run_id) ON DELETE CASCADE,
            field   TEXT NOT NULL,
            value   TEXT NOT NULL,
            count   INTEGER NOT NULL,
            PRIMARY KEY (run_id, field, value)
        );

        CREATE INDEX IF NOT EXISTS idx_value_frequency_field
            ON value_frequency(field, value);
        "#,
    )
}

/// 获取默认数据库路径
///
/// # 返回
/// - 环境变量 STEEL_EXTRACTOR_DB_PATH（非空时）
/// - 否则: 用户数据目录/steel-material-extractor/extractor.db
/// - 无法获取用户数据目录时: ./extractor.db
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./extractor.db");
    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("steel-material-extractor");
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("extractor.db");
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN ('config_kv', 'extraction_run', 'value_frequency')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 3);
    }

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with(".db"));
    }
}
