// ==========================================
// 钢材物料短文本解析 - 导入层
// ==========================================
// 职责: 外部文件 → 知识库 / 清洗后的表格
// 支持: Excel, CSV, JSON 知识库
// ==========================================

// 模块声明
pub mod data_cleaner;
pub mod error;
pub mod file_parser;
pub mod schema_loader;
pub mod traits;

// 重导出核心类型
pub use data_cleaner::SheetCleaner;
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser};
pub use schema_loader::{load_schema_file, load_schema_files, parse_schema_str};

// 重导出 Trait 接口
pub use traits::{DataCleaner, FileParser, RawGrid};
