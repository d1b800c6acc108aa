// ==========================================
// 钢材物料短文本解析 - 知识库加载器
// ==========================================
// 职责: 读取 JSON 知识库文件 → 校验 → KnowledgeBase
// 格式: 顶层列表；含 base_grade 的条目为牌号，
//       含 symbol/prefix_coating/coating/treatment 的条目为镀层规则
// ==========================================

use crate::domain::schema::{CoatingRule, GradeEntry, KnowledgeBase, SchemaEntry};
use crate::importer::error::{ImportError, ImportResult};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, info, instrument};

const COATING_KEYS: [&str; 4] = ["symbol", "prefix_coating", "coating", "treatment"];

/// 解析 JSON 文本为知识库条目（保持原始顺序）
pub fn parse_schema_str(content: &str) -> ImportResult<Vec<SchemaEntry>> {
    let value: Value = serde_json::from_str(content)?;
    let Value::Array(items) = value else {
        return Err(ImportError::SchemaNotList);
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| parse_entry(index, item))
        .collect()
}

fn parse_entry(index: usize, item: &Value) -> ImportResult<SchemaEntry> {
    let Some(obj) = item.as_object() else {
        return Err(entry_error(index, "条目必须为对象"));
    };

    if let Some(grade) = obj.get("base_grade") {
        let base_grade = grade
            .as_str()
            .ok_or_else(|| entry_error(index, "base_grade 必须为字符串"))?;
        return Ok(SchemaEntry::Grade(GradeEntry {
            base_grade: base_grade.to_string(),
        }));
    }

    if COATING_KEYS.iter().any(|k| obj.contains_key(*k)) {
        return Ok(SchemaEntry::Coating(CoatingRule {
            symbol: string_field(index, obj, "symbol")?,
            prefix_coating: string_field(index, obj, "prefix_coating")?,
            coating: string_list_field(index, obj, "coating")?,
            treatment: string_list_field(index, obj, "treatment")?,
        }));
    }

    Err(entry_error(
        index,
        "无法识别的条目（需要 base_grade 或镀层规则字段）",
    ))
}

fn string_field(index: usize, obj: &Map<String, Value>, key: &str) -> ImportResult<String> {
    match obj.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(entry_error(index, &format!("{} 必须为字符串", key))),
        None => Err(entry_error(index, &format!("缺少字段 {}", key))),
    }
}

fn string_list_field(
    index: usize,
    obj: &Map<String, Value>,
    key: &str,
) -> ImportResult<Vec<String>> {
    let Some(value) = obj.get(key) else {
        return Err(entry_error(index, &format!("缺少字段 {}", key)));
    };
    let Some(items) = value.as_array() else {
        return Err(entry_error(index, &format!("{} 必须为字符串列表", key)));
    };
    items
        .iter()
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| entry_error(index, &format!("{} 必须为字符串列表", key)))
        })
        .collect()
}

fn entry_error(index: usize, message: &str) -> ImportError {
    ImportError::SchemaEntryError {
        index,
        message: message.to_string(),
    }
}

/// 加载单个知识库文件
#[instrument]
pub fn load_schema_file(path: &Path) -> ImportResult<KnowledgeBase> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    let kb = KnowledgeBase::from_entries(parse_schema_str(&content)?);
    info!(
        grades = kb.grades().len(),
        coating_rules = kb.coating_rules().len(),
        "知识库加载完成"
    );
    Ok(kb)
}

/// 按顺序加载并合并多个知识库文件
pub fn load_schema_files<P: AsRef<Path>>(paths: &[P]) -> ImportResult<KnowledgeBase> {
    let mut merged = KnowledgeBase::default();
    for path in paths {
        let kb = load_schema_file(path.as_ref())?;
        debug!(path = %path.as_ref().display(), "合并知识库文件");
        merged = merged.merge(kb);
    }
    Ok(merged)
}
