// ==========================================
// 钢材物料短文本解析 - 领域模型层
// ==========================================
// 职责: 定义知识库实体、表格模型、提取结果、运行报告
// 红线: 不含文件/数据库访问,不含匹配逻辑
// ==========================================

pub mod extraction;
pub mod report;
pub mod schema;
pub mod table;
pub mod types;

// 重导出核心类型
pub use extraction::{CoatingOutcome, Dimensions, ExtractionResult, GradeMatch, RowOutput, Tolerances};
pub use report::{DashboardStats, Diagnostic, RunRecord, RunReport, RunSummary};
pub use schema::{CoatingPermutation, CoatingRule, GradeEntry, KnowledgeBase, SchemaEntry};
pub use table::{Cell, FieldSelection, RawTable};
pub use types::{CoatingConflictPolicy, DiagnosticLevel, MatchKind, PipelineStage};
