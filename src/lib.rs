// ==========================================
// 钢材物料短文本解析 - 核心库
// ==========================================
// 职责: 从自由文本物料描述中提取牌号、镀层、表面处理、尺寸与公差
// 技术栈: Rust + SQLite
// 系统定位: 确定性规则引擎（结果可追溯，疑难行交人工复核）
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 运行统计
pub mod repository;

// 引擎层 - 匹配规则
pub mod engine;

// 导入层 - 知识库 / 表格文件
pub mod importer;

// 导出层 - 结果文件
pub mod export;

// 配置层 - 提取参数
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{CoatingConflictPolicy, DiagnosticLevel, MatchKind, PipelineStage};

// 领域实体
pub use domain::{
    Cell, ExtractionResult, FieldSelection, KnowledgeBase, RawTable, RunReport, SchemaEntry,
};

// 引擎
pub use engine::{
    CoatingTreatmentMatcher, DimensionParser, ExtractionError, ExtractionOrchestrator,
    GradeColumnDetector, GradeMatcher,
};

// 配置
pub use config::ExtractionSettings;

// API
pub use api::{ApiError, ExtractionApi, ExtractionRequest, ExtractionResponse};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "钢材物料短文本解析";
