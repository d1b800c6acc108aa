// ==========================================
// 钢材物料短文本解析 - API层错误类型
// ==========================================
// 职责: 汇总各层错误，转换为调用方可读的错误消息
// ==========================================

use crate::config::error::ConfigError;
use crate::engine::error::ExtractionError;
use crate::export::error::ExportError;
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入与配置错误（任何行处理前中止）
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("字段不存在: {field}（可用字段: {}）", .available.join(", "))]
    MissingField {
        field: String,
        available: Vec<String>,
    },

    #[error("无法识别牌号列: {0}")]
    GradeColumnNotDetected(String),

    #[error("配置错误: {0}")]
    ConfigurationError(String),

    // ==========================================
    // 文件错误
    // ==========================================
    #[error("文件导入失败: {0}")]
    ImportError(String),

    #[error("结果导出失败: {0}")]
    ExportError(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        ApiError::ImportError(err.to_string())
    }
}

// ==========================================
// 从 ExtractionError 转换
// ==========================================
impl From<ExtractionError> for ApiError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::MissingField { field, available } => {
                ApiError::MissingField { field, available }
            }
            e @ ExtractionError::GradeColumnNotDetected { .. } => {
                ApiError::GradeColumnNotDetected(e.to_string())
            }
            e @ ExtractionError::EmptyKnowledgeBase => ApiError::ConfigurationError(e.to_string()),
            ExtractionError::TaskFailed(msg) => ApiError::InternalError(msg),
        }
    }
}

// ==========================================
// 从 ConfigError 转换
// ==========================================
impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::DatabaseError(msg) | ConfigError::LockError(msg) => {
                ApiError::DatabaseError(msg)
            }
            other => ApiError::ConfigurationError(other.to_string()),
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::DuplicateRun(msg) => {
                ApiError::InvalidInput(format!("运行记录已存在: {}", msg))
            }
            other => ApiError::DatabaseError(other.to_string()),
        }
    }
}

// ==========================================
// 从 ExportError 转换
// ==========================================
impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        ApiError::ExportError(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
