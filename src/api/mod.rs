// ==========================================
// 钢材物料短文本解析 - API 层
// ==========================================
// 职责: 对外业务接口（命令行 / 上层应用调用）
// ==========================================

pub mod error;
pub mod extraction_api;

pub use error::{ApiError, ApiResult};
pub use extraction_api::{ExtractionApi, ExtractionRequest, ExtractionResponse};
