// ==========================================
// 钢材物料短文本解析 - 输入表格模型
// ==========================================
// 职责: 单元格 / 有序行 / 字段选择
// 说明: 行内字段保持源文件列顺序（导出时原样回写）
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// Cell - 单元格
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    /// 文本单元格内容（仅 Text 且去空白后非空）
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) if !s.trim().is_empty() => Some(s.as_str()),
            _ => None,
        }
    }

    /// 是否为空（Empty 或空白文本）
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// 转为文本（数值单元格按原值输出，空为 None）
    pub fn to_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) if s.trim().is_empty() => None,
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

// ==========================================
// RawTable - 有序表格
// ==========================================
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { headers, rows }
    }

    /// 列名 → 列序号
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// 读取单元格（行短于表头时视为空）
    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        static EMPTY: Cell = Cell::Empty;
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&EMPTY)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

// ==========================================
// FieldSelection - 字段选择
// ==========================================
// grade_field: 牌号/镀层/表面处理提取来源列
// dimension_field: 尺寸/公差提取来源列（可与 grade_field 相同）
// None 表示该阶段不执行
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FieldSelection {
    pub grade_field: Option<String>,
    pub dimension_field: Option<String>,
}

impl FieldSelection {
    /// 牌号与尺寸取自同一列
    pub fn same(field: &str) -> Self {
        Self {
            grade_field: Some(field.to_string()),
            dimension_field: Some(field.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_text_helpers() {
        assert_eq!(Cell::from("  ").as_text(), None);
        assert_eq!(Cell::from("CR4").as_text(), Some("CR4"));
        assert_eq!(Cell::Number(945.0).as_text(), None);
        assert_eq!(Cell::Number(1.5).to_text(), Some("1.5".to_string()));
        assert!(Cell::Empty.is_empty());
        assert!(!Cell::Bool(false).is_empty());
    }

    #[test]
    fn test_table_cell_out_of_range_is_empty() {
        let table = RawTable::new(
            vec!["a".to_string(), "b".to_string()],
            vec![vec![Cell::from("x")]],
        );
        assert_eq!(table.column_index("b"), Some(1));
        assert_eq!(table.cell(0, 1), &Cell::Empty);
        assert_eq!(table.cell(5, 0), &Cell::Empty);
    }
}
