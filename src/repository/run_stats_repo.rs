// ==========================================
// 钢材物料短文本解析 - 运行统计仓储
// ==========================================
// 职责: extraction_run / value_frequency 表的读写
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::db::{configure_sqlite_connection, init_schema, open_sqlite_connection};
use crate::domain::report::{DashboardStats, RunRecord};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

type Frequencies = BTreeMap<String, BTreeMap<String, u64>>;

// ==========================================
// RunStatsRepository - 运行统计仓储
// ==========================================
pub struct RunStatsRepository {
    conn: Arc<Mutex<Connection>>,
}

impl RunStatsRepository {
    /// 创建新的 RunStatsRepository 实例（表不存在时自动建表）
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            configure_sqlite_connection(&guard)?;
            init_schema(&guard)?;
        }
        Ok(Self { conn })
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 写入一次运行记录及其取值频次（单事务）
    pub fn insert_run(&self, record: &RunRecord) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        tx.execute(
            r#"
            INSERT INTO extraction_run (
                run_id, file_name, supplier, processed_at,
                rows_processed, grade_found, no_grade_found, highlighted
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                record.run_id,
                record.file_name,
                record.supplier,
                record.processed_at.to_rfc3339(),
                record.rows_processed as i64,
                record.grade_found as i64,
                record.no_grade_found as i64,
                record.highlighted as i64,
            ],
        )?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO value_frequency (run_id, field, value, count) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (field, values) in &record.value_frequencies {
                for (value, count) in values {
                    stmt.execute(params![record.run_id, field, value, *count as i64])?;
                }
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::TransactionError(e.to_string()))?;

        info!(
            run_id = %record.run_id,
            file_name = %record.file_name,
            rows = record.rows_processed,
            "运行记录已保存"
        );
        Ok(())
    }

    /// 按 run_id 查询运行记录
    ///
    /// # 返回
    /// - Ok(Some(RunRecord)): 找到记录（含取值频次）
    /// - Ok(None): 未找到
    pub fn find_run(&self, run_id: &str) -> RepositoryResult<Option<RunRecord>> {
        let conn = self.get_conn()?;
        let row = conn
            .query_row(
                r#"
                SELECT run_id, file_name, supplier, processed_at,
                       rows_processed, grade_found, no_grade_found, highlighted
                FROM extraction_run WHERE run_id = ?1
                "#,
                params![run_id],
                RunRow::from_row,
            )
            .optional()?;

        match row {
            Some(row) => {
                let frequencies = load_frequencies(&conn, Some(&row.run_id))?;
                Ok(Some(row.into_record(frequencies)?))
            }
            None => Ok(None),
        }
    }

    /// 最近的运行记录（按处理时间倒序）
    pub fn list_recent_runs(&self, limit: usize) -> RepositoryResult<Vec<RunRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT run_id, file_name, supplier, processed_at,
                   rows_processed, grade_found, no_grade_found, highlighted
            FROM extraction_run
            ORDER BY processed_at DESC, run_id
            LIMIT ?1
            "#,
        )?;
        let rows = stmt
            .query_map(params![limit as i64], RunRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|row| {
                let frequencies = load_frequencies(&conn, Some(&row.run_id))?;
                row.into_record(frequencies)
            })
            .collect()
    }

    /// 历史汇总（文件数 / 行数 / 供应商数 / 累计频次）
    pub fn dashboard_stats(&self) -> RepositoryResult<DashboardStats> {
        let conn = self.get_conn()?;
        let (total_files, total_rows, unique_suppliers): (i64, i64, i64) = conn.query_row(
            r#"
            SELECT COUNT(*), COALESCE(SUM(rows_processed), 0), COUNT(DISTINCT supplier)
            FROM extraction_run
            "#,
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;

        Ok(DashboardStats {
            total_files: total_files as usize,
            total_rows: total_rows as usize,
            unique_suppliers: unique_suppliers as usize,
            frequencies: load_frequencies(&conn, None)?,
        })
    }

    /// 清空全部统计
    ///
    /// # 返回
    /// - 删除的运行记录数
    pub fn reset(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        tx.execute("DELETE FROM value_frequency", [])?;
        let deleted = tx.execute("DELETE FROM extraction_run", [])?;
        tx.commit()
            .map_err(|e| RepositoryError::TransactionError(e.to_string()))?;
        debug!(deleted, "运行统计已清空");
        Ok(deleted)
    }
}

// ==========================================
// 行映射
// ==========================================
struct RunRow {
    run_id: String,
    file_name: String,
    supplier: String,
    processed_at: String,
    rows_processed: i64,
    grade_found: i64,
    no_grade_found: i64,
    highlighted: i64,
}

impl RunRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            run_id: row.get(0)?,
            file_name: row.get(1)?,
            supplier: row.get(2)?,
            processed_at: row.get(3)?,
            rows_processed: row.get(4)?,
            grade_found: row.get(5)?,
            no_grade_found: row.get(6)?,
            highlighted: row.get(7)?,
        })
    }

    fn into_record(self, value_frequencies: Frequencies) -> RepositoryResult<RunRecord> {
        let processed_at = DateTime::parse_from_rfc3339(&self.processed_at)
            .map_err(|e| RepositoryError::CorruptRecord {
                run_id: self.run_id.clone(),
                field: "processed_at".to_string(),
                message: e.to_string(),
            })?
            .with_timezone(&Utc);

        Ok(RunRecord {
            run_id: self.run_id,
            file_name: self.file_name,
            supplier: self.supplier,
            processed_at,
            rows_processed: self.rows_processed as usize,
            grade_found: self.grade_found as usize,
            no_grade_found: self.no_grade_found as usize,
            highlighted: self.highlighted as usize,
            value_frequencies,
        })
    }
}

/// 读取取值频次（run_id 为 None 时汇总全部运行）
fn load_frequencies(conn: &Connection, run_id: Option<&str>) -> RepositoryResult<Frequencies> {
    let mut stmt = conn.prepare(
        r#"
        SELECT field, value, SUM(count)
        FROM value_frequency
        WHERE ?1 IS NULL OR run_id = ?1
        GROUP BY field, value
        "#,
    )?;
    let rows = stmt.query_map(params![run_id], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, i64>(2)?,
        ))
    })?;

    let mut out = Frequencies::new();
    for row in rows {
        let (field, value, count) = row?;
        out.entry(field).or_default().insert(value, count as u64);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> RunStatsRepository {
        let conn = Connection::open_in_memory().unwrap();
        RunStatsRepository::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    fn record(run_id: &str, supplier: &str, grades: &[(&str, u64)]) -> RunRecord {
        let mut freq = Frequencies::new();
        for (g, c) in grades {
            freq.entry("grade".to_string())
                .or_default()
                .insert(g.to_string(), *c);
        }
        RunRecord {
            run_id: run_id.to_string(),
            file_name: format!("{}.xlsx", run_id),
            supplier: supplier.to_string(),
            processed_at: Utc::now(),
            rows_processed: 10,
            grade_found: 8,
            no_grade_found: 2,
            highlighted: 1,
            value_frequencies: freq,
        }
    }

    #[test]
    fn test_insert_and_find() {
        let repo = repo();
        repo.insert_run(&record("r1", "Thyssen", &[("CR4", 3)])).unwrap();

        let found = repo.find_run("r1").unwrap().unwrap();
        assert_eq!(found.supplier, "Thyssen");
        assert_eq!(found.no_grade_found, 2);
        assert_eq!(found.value_frequencies["grade"]["CR4"], 3);
        assert!(repo.find_run("missing").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_run_id_rejected() {
        let repo = repo();
        repo.insert_run(&record("r1", "A", &[])).unwrap();
        let err = repo.insert_run(&record("r1", "A", &[])).unwrap_err();
        assert!(matches!(err, RepositoryError::DuplicateRun(_)));
    }

    #[test]
    fn test_dashboard_aggregates_and_reset() {
        let repo = repo();
        repo.insert_run(&record("r1", "Thyssen", &[("CR4", 3), ("DX51D", 1)]))
            .unwrap();
        repo.insert_run(&record("r2", "Thyssen", &[("CR4", 2)])).unwrap();
        repo.insert_run(&record("r3", "Salzgitter", &[])).unwrap();

        let stats = repo.dashboard_stats().unwrap();
        assert_eq!(stats.total_files, 3);
        assert_eq!(stats.total_rows, 30);
        assert_eq!(stats.unique_suppliers, 2);
        assert_eq!(stats.frequencies["grade"]["CR4"], 5);
        assert_eq!(stats.frequencies["grade"]["DX51D"], 1);

        assert_eq!(repo.list_recent_runs(2).unwrap().len(), 2);

        assert_eq!(repo.reset().unwrap(), 3);
        let stats = repo.dashboard_stats().unwrap();
        assert_eq!(stats.total_files, 0);
        assert!(stats.frequencies.is_empty());
    }
}
