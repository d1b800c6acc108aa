// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的知识库、临时数据库、输入文件
// ==========================================

#![allow(dead_code)]

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use steel_material_extractor::domain::{Cell, KnowledgeBase, RawTable};
use steel_material_extractor::importer::parse_schema_str;
use tempfile::{NamedTempFile, TempDir};

/// 样例知识库（Z 规则在前，GI 规则在后）
pub const SAMPLE_SCHEMA: &str = r#"[
    {"base_grade": "CR4"},
    {"base_grade": "CR210LA"},
    {"base_grade": "DX51D"},
    {"base_grade": "DC04"},
    {"base_grade": "DC04EK"},
    {"symbol": "+", "prefix_coating": "Z", "coating": ["100", "140", "275"], "treatment": ["MB", "UO"]},
    {"symbol": "+", "prefix_coating": "GI", "coating": ["40/40", "50/50"], "treatment": ["UC", "UO", "MC"]}
]"#;

/// 样例知识库对象
pub fn sample_kb() -> Arc<KnowledgeBase> {
    let entries = parse_schema_str(SAMPLE_SCHEMA).expect("sample schema");
    Arc::new(KnowledgeBase::from_entries(entries))
}

/// 单列描述表格
pub fn description_table(column: &str, descriptions: &[&str]) -> RawTable {
    RawTable::new(
        vec![column.to_string()],
        descriptions.iter().map(|d| vec![Cell::from(*d)]).collect(),
    )
}

/// 创建临时测试数据库
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> (NamedTempFile, String) {
    let temp_file = NamedTempFile::new().expect("temp db");
    let db_path = temp_file.path().to_string_lossy().to_string();
    (temp_file, db_path)
}

/// 在临时目录写入文件
pub fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).expect("create file");
    file.write_all(content.as_bytes()).expect("write file");
    path
}

/// 带标题行、空行与备注行的询价单 CSV
pub fn sample_inquiry_csv() -> &'static str {
    "Anfrage 4711,,,\n\
     ,,,\n\
     Pos,Materialkurztext,Menge,Einheit\n\
     1,C 1.3x945 CR4 Z100MB,12,t\n\
     2,###unknown_text###,3,t\n\
     3,\"C 1,7x380 CR210LA Z100MB/GI40/40\",5,t\n\
     4,\"DX51D 3,0 (+0/-0,4) x 271\",1,t\n"
}
