// ==========================================
// 钢材物料短文本解析 - 提取配置读取 Trait
// ==========================================
// 职责: 定义 API 层所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::error::ConfigResult;
use crate::config::settings::ExtractionSettings;
use async_trait::async_trait;

// ==========================================
// ExtractionConfigReader Trait
// ==========================================
// 用途: 提取流程所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）, StaticConfig（固定值）
#[async_trait]
pub trait ExtractionConfigReader: Send + Sync {
    /// 读取完整提取参数（缺省项取默认值）
    async fn load_settings(&self) -> ConfigResult<ExtractionSettings>;
}

// ==========================================
// StaticConfig - 固定配置
// ==========================================
// 用于测试与无数据库的命令行调用
#[derive(Debug, Clone, Default)]
pub struct StaticConfig {
    settings: ExtractionSettings,
}

impl StaticConfig {
    pub fn new(settings: ExtractionSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl ExtractionConfigReader for StaticConfig {
    async fn load_settings(&self) -> ConfigResult<ExtractionSettings> {
        Ok(self.settings.clone())
    }
}
