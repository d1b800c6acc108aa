// ==========================================
// 钢材物料短文本解析 - 引擎层
// ==========================================
// 职责: 纯匹配逻辑（牌号 / 镀层 / 表面处理 / 尺寸 / 公差 / 编排）
// 红线: 引擎内不做文件与数据库 I/O，知识库只读
// ==========================================

pub mod coating_matcher;
pub mod column_detector;
pub mod dimension_parser;
pub mod error;
pub mod grade_matcher;
pub mod normalizer;
pub mod orchestrator;
pub mod remainder;
pub mod tolerance;
pub mod treatment;

// 重导出核心引擎
pub use coating_matcher::CoatingTreatmentMatcher;
pub use column_detector::{ColumnScore, GradeColumnDetector};
pub use dimension_parser::DimensionParser;
pub use error::{DimensionError, EngineResult, ExtractionError};
pub use grade_matcher::GradeMatcher;
pub use normalizer::normalize;
pub use orchestrator::ExtractionOrchestrator;
