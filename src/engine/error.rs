// ==========================================
// 钢材物料短文本解析 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: ExtractionError 为配置错误（整批处理前中止）
//       DimensionError 为单行错误（记为诊断，行继续处理）
// ==========================================

use thiserror::Error;

/// 提取配置错误（致命，任何行处理前返回）
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionError {
    #[error("字段不存在: {field}（可用字段: {}）", .available.join(", "))]
    MissingField {
        field: String,
        available: Vec<String>,
    },

    #[error("无法识别牌号列（最高得分 {best_score:.3} 低于阈值 {threshold}）")]
    GradeColumnNotDetected { best_score: f64, threshold: f64 },

    #[error("知识库为空: 未加载任何牌号")]
    EmptyKnowledgeBase,

    #[error("并行任务失败: {0}")]
    TaskFailed(String),
}

/// 尺寸/公差解析错误（单行）
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DimensionError {
    #[error("数值解析失败: {value}")]
    InvalidNumber { value: String },
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, ExtractionError>;
