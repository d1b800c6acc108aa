// ==========================================
// 钢材物料短文本解析 - 导出层
// ==========================================
// 职责: RunReport → 带结果列的表格文件
// ==========================================

pub mod csv_writer;
pub mod error;

pub use csv_writer::{output_headers, write_report, write_report_to_path};
pub use error::{ExportError, ExportResult};
