// ==========================================
// 钢材物料短文本解析 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)，键统一以 "extraction/" 开头
// ==========================================

use crate::config::config_reader::ExtractionConfigReader;
use crate::config::error::{ConfigError, ConfigResult};
use crate::config::settings::ExtractionSettings;
use crate::db::{configure_sqlite_connection, init_schema, open_sqlite_connection};
use crate::domain::types::CoatingConflictPolicy;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::warn;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例（表不存在时自动建表）
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let conn_guard = conn
                .lock()
                .map_err(|e| ConfigError::LockError(e.to_string()))?;
            configure_sqlite_connection(&conn_guard)?;
            init_schema(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    fn lock(&self) -> ConfigResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| ConfigError::LockError(e.to_string()))
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.lock()?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(ConfigError::ConfigReadError {
                key: key.to_string(),
                message: e.to_string(),
            }),
        }
    }

    /// 写入 global scope 配置（UPSERT）
    pub fn set_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
            params![key, value],
        )
        .map_err(|e| ConfigError::ConfigWriteError {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// 删除 global scope 配置（恢复默认）
    pub fn remove_config_value(&self, key: &str) -> ConfigResult<bool> {
        let conn = self.lock()?;
        let affected = conn.execute(
            "DELETE FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
        )?;
        Ok(affected > 0)
    }

    /// 全部提取相关配置的快照（key 有序）
    pub fn get_config_snapshot(&self) -> ConfigResult<BTreeMap<String, String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT key, value FROM config_kv WHERE scope_id = 'global' AND key LIKE 'extraction/%' ORDER BY key",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut snapshot = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            snapshot.insert(key, value);
        }
        Ok(snapshot)
    }

    /// 读取并解析配置值；格式错误时告警并使用默认值
    fn get_parsed_or<T: FromStr>(&self, key: &str, default: T) -> ConfigResult<T> {
        let Some(raw) = self.get_config_value(key)? else {
            return Ok(default);
        };
        match raw.trim().parse::<T>() {
            Ok(v) => Ok(v),
            Err(_) => {
                warn!(config_key = key, raw_value = %raw, "配置值格式错误，使用默认值");
                Ok(default)
            }
        }
    }

    /// 读取逗号分隔列表（小写、去空白、去空项）
    fn get_list_or(&self, key: &str, default: Vec<String>) -> ConfigResult<Vec<String>> {
        let Some(raw) = self.get_config_value(key)? else {
            return Ok(default);
        };
        let items: Vec<String> = raw
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        if items.is_empty() {
            Ok(default)
        } else {
            Ok(items)
        }
    }

    /// 镀层冲突策略（未知取值视为配置错误）
    fn get_conflict_policy(&self) -> ConfigResult<CoatingConflictPolicy> {
        match self.get_config_value(config_keys::COATING_CONFLICT_POLICY)? {
            None => Ok(CoatingConflictPolicy::default()),
            Some(raw) => raw
                .parse::<CoatingConflictPolicy>()
                .map_err(|message| ConfigError::ConfigValueError {
                    key: config_keys::COATING_CONFLICT_POLICY.to_string(),
                    value: raw,
                    message,
                }),
        }
    }
}

// ==========================================
// ExtractionConfigReader Trait 实现
// ==========================================
#[async_trait]
impl ExtractionConfigReader for ConfigManager {
    async fn load_settings(&self) -> ConfigResult<ExtractionSettings> {
        let defaults = ExtractionSettings::default();

        let mut parallel_chunk_size =
            self.get_parsed_or(config_keys::PARALLEL_CHUNK_SIZE, defaults.parallel_chunk_size)?;
        if parallel_chunk_size == 0 {
            warn!(config_key = config_keys::PARALLEL_CHUNK_SIZE, "分块大小不能为 0，使用默认值");
            parallel_chunk_size = defaults.parallel_chunk_size;
        }

        Ok(ExtractionSettings {
            significance_keywords: self.get_list_or(
                config_keys::SIGNIFICANCE_KEYWORDS,
                defaults.significance_keywords.clone(),
            )?,
            significance_min_length: self.get_parsed_or(
                config_keys::SIGNIFICANCE_MIN_LENGTH,
                defaults.significance_min_length,
            )?,
            significance_min_alpha_length: self.get_parsed_or(
                config_keys::SIGNIFICANCE_MIN_ALPHA_LENGTH,
                defaults.significance_min_alpha_length,
            )?,
            grade_threshold: self
                .get_parsed_or(config_keys::GRADE_THRESHOLD, defaults.grade_threshold)?,
            coating_conflict_policy: self.get_conflict_policy()?,
            sparse_row_threshold: self.get_parsed_or(
                config_keys::SPARSE_ROW_THRESHOLD,
                defaults.sparse_row_threshold,
            )?,
            header_detection_threshold: self.get_parsed_or(
                config_keys::HEADER_DETECTION_THRESHOLD,
                defaults.header_detection_threshold,
            )?,
            parallel_chunk_size,
        })
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 余量显著性
    pub const SIGNIFICANCE_KEYWORDS: &str = "extraction/significance_keywords"; // 逗号分隔
    pub const SIGNIFICANCE_MIN_LENGTH: &str = "extraction/significance_min_length";
    pub const SIGNIFICANCE_MIN_ALPHA_LENGTH: &str = "extraction/significance_min_alpha_length";

    // 匹配
    pub const GRADE_THRESHOLD: &str = "extraction/grade_threshold";
    pub const COATING_CONFLICT_POLICY: &str = "extraction/coating_conflict_policy";

    // 表格
    pub const SPARSE_ROW_THRESHOLD: &str = "extraction/sparse_row_threshold";
    pub const HEADER_DETECTION_THRESHOLD: &str = "extraction/header_detection_threshold";

    // 执行
    pub const PARALLEL_CHUNK_SIZE: &str = "extraction/parallel_chunk_size";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[tokio::test]
    async fn test_defaults_when_table_empty() {
        let settings = manager().load_settings().await.unwrap();
        assert_eq!(settings, ExtractionSettings::default());
    }

    #[tokio::test]
    async fn test_overrides_are_applied() {
        let mgr = manager();
        mgr.set_config_value(config_keys::COATING_CONFLICT_POLICY, "longest_match")
            .unwrap();
        mgr.set_config_value(config_keys::SIGNIFICANCE_KEYWORDS, "Bondal, XYZ,,")
            .unwrap();
        mgr.set_config_value(config_keys::SIGNIFICANCE_MIN_LENGTH, "8")
            .unwrap();

        let settings = mgr.load_settings().await.unwrap();
        assert_eq!(
            settings.coating_conflict_policy,
            CoatingConflictPolicy::LongestMatch
        );
        assert_eq!(settings.significance_keywords, vec!["bondal", "xyz"]);
        assert_eq!(settings.significance_min_length, 8);
    }

    #[tokio::test]
    async fn test_malformed_number_falls_back_to_default() {
        let mgr = manager();
        mgr.set_config_value(config_keys::SPARSE_ROW_THRESHOLD, "abc")
            .unwrap();
        mgr.set_config_value(config_keys::PARALLEL_CHUNK_SIZE, "0")
            .unwrap();

        let settings = mgr.load_settings().await.unwrap();
        assert_eq!(settings.sparse_row_threshold, 0.7);
        assert_eq!(settings.parallel_chunk_size, 256);
    }

    #[tokio::test]
    async fn test_unknown_policy_is_error() {
        let mgr = manager();
        mgr.set_config_value(config_keys::COATING_CONFLICT_POLICY, "first_wins")
            .unwrap();
        let err = mgr.load_settings().await.unwrap_err();
        assert!(matches!(err, ConfigError::ConfigValueError { .. }));
    }

    #[test]
    fn test_upsert_remove_and_snapshot() {
        let mgr = manager();
        mgr.set_config_value(config_keys::GRADE_THRESHOLD, "0.3").unwrap();
        mgr.set_config_value(config_keys::GRADE_THRESHOLD, "0.4").unwrap();
        assert_eq!(
            mgr.get_config_value(config_keys::GRADE_THRESHOLD).unwrap(),
            Some("0.4".to_string())
        );

        let snapshot = mgr.get_config_snapshot().unwrap();
        assert_eq!(snapshot.len(), 1);

        assert!(mgr.remove_config_value(config_keys::GRADE_THRESHOLD).unwrap());
        assert_eq!(mgr.get_config_value(config_keys::GRADE_THRESHOLD).unwrap(), None);
    }
}
