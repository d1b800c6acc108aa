// ==========================================
// 钢材物料短文本解析 - 配置层
// ==========================================
// 职责: 提取参数默认值 + config_kv 覆写
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod config_reader;
pub mod error;
pub mod settings;

// 重导出核心配置类型
pub use config_manager::{config_keys, ConfigManager};
pub use config_reader::{ExtractionConfigReader, StaticConfig};
pub use error::{ConfigError, ConfigResult};
pub use settings::{ExtractionSettings, DEFAULT_SIGNIFICANCE_KEYWORDS};
