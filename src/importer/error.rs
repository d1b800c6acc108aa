// ==========================================
// 钢材物料短文本解析 - 导入模块错误类型
// ==========================================
// 覆盖: 表格文件读取 / 知识库 JSON 校验
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（支持 .csv/.xlsx/.xls/.xlsm/.ods）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    #[error("工作表为空: {0}")]
    EmptySheet(String),

    // ===== 知识库错误 =====
    #[error("知识库 JSON 解析失败: {0}")]
    SchemaParseError(String),

    #[error("知识库格式错误: 顶层必须为列表")]
    SchemaNotList,

    #[error("知识库格式错误 (条目 {index}): {message}")]
    SchemaEntryError { index: usize, message: String },
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

// 实现 From<serde_json::Error>
impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        ImportError::SchemaParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_format_message() {
        let err = ImportError::SchemaEntryError {
            index: 3,
            message: "缺少字段 treatment".to_string(),
        };
        assert_eq!(err.to_string(), "知识库格式错误 (条目 3): 缺少字段 treatment");
        assert_eq!(
            ImportError::SchemaNotList.to_string(),
            "知识库格式错误: 顶层必须为列表"
        );
    }
}
