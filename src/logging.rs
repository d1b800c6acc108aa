// ==========================================
// 钢材物料短文本解析 - 日志系统
// ==========================================
// 输出: 一律写 stderr（stdout 留给导出的 CSV）
// 格式: 文本（默认）或 JSON 行（便于采集逐行诊断）
// 级别: RUST_LOG，缺省 info；逐行匹配细节在 debug/trace
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 切换 JSON 输出的环境变量
pub const LOG_JSON_ENV: &str = "STEEL_EXTRACTOR_LOG_JSON";

/// 缺省过滤器
pub const DEFAULT_FILTER: &str = "info";

/// 日志输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    /// 由环境变量取值判定（"0" / "false" / "off" / 空 视为关闭）
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()) {
            Some(v) if !v.is_empty() && !matches!(v.as_str(), "0" | "false" | "off") => {
                LogFormat::Json
            }
            _ => LogFormat::Text,
        }
    }
}

/// 初始化日志系统（命令行入口调用一次）
///
/// # 示例
/// ```no_run
/// use steel_material_extractor::logging;
/// logging::init();
/// ```
pub fn init() {
    let format = LogFormat::from_env_value(std::env::var(LOG_JSON_ENV).ok().as_deref());
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .with_writer(std::io::stderr);

    // 重复初始化（例如库被嵌入到已有订阅者的进程）时保持原订阅者
    let result = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };
    if result.is_err() {
        tracing::debug!("日志订阅者已存在，跳过初始化");
    }
}

/// 测试用日志（debug 级别，输出交给测试框架捕获）
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_from_env_value() {
        assert_eq!(LogFormat::from_env_value(None), LogFormat::Text);
        assert_eq!(LogFormat::from_env_value(Some("")), LogFormat::Text);
        assert_eq!(LogFormat::from_env_value(Some("0")), LogFormat::Text);
        assert_eq!(LogFormat::from_env_value(Some("Off")), LogFormat::Text);
        assert_eq!(LogFormat::from_env_value(Some("1")), LogFormat::Json);
        assert_eq!(LogFormat::from_env_value(Some("json")), LogFormat::Json);
    }

    #[test]
    fn test_init_test_is_repeatable() {
        init_test();
        init_test();
        tracing::debug!(rows = 3, "测试日志");
    }
}
