// ==========================================
// 钢材物料短文本解析 - 运行报告 / 诊断 / 统计
// ==========================================
// 职责: 每次运行返回显式报告对象（替代进程级错误列表）
// ==========================================

use crate::domain::extraction::RowOutput;
use crate::domain::types::{DiagnosticLevel, PipelineStage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// Diagnostic - 结构化诊断
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub row: Option<usize>,     // 行号（None 表示整批）
    pub level: DiagnosticLevel, // 级别
    pub stage: PipelineStage,   // 所在阶段
    pub message: String,        // 描述
}

impl Diagnostic {
    pub fn info(row: Option<usize>, stage: PipelineStage, message: impl Into<String>) -> Self {
        Self {
            row,
            level: DiagnosticLevel::Info,
            stage,
            message: message.into(),
        }
    }

    pub fn warning(row: Option<usize>, stage: PipelineStage, message: impl Into<String>) -> Self {
        Self {
            row,
            level: DiagnosticLevel::Warning,
            stage,
            message: message.into(),
        }
    }

    pub fn error(row: Option<usize>, stage: PipelineStage, message: impl Into<String>) -> Self {
        Self {
            row,
            level: DiagnosticLevel::Error,
            stage,
            message: message.into(),
        }
    }
}

// ==========================================
// RunSummary - 运行汇总
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_rows: usize,     // 总行数
    pub grade_found: usize,    // 找到牌号
    pub no_grade_found: usize, // 未找到牌号（红色）
    pub highlighted: usize,    // 余量有意义（黄色）
    pub skipped: usize,        // 源文本为空/非文本
}

// ==========================================
// RunReport - 运行报告
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub headers: Vec<String>,
    pub rows: Vec<RowOutput>,
    pub diagnostics: Vec<Diagnostic>,
    pub summary: RunSummary,
    pub has_tolerances: bool, // 全批任一行有公差时才输出公差列
}

impl RunReport {
    /// 指定行的诊断（用于逐行日志下钻）
    pub fn diagnostics_for_row(&self, row: usize) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.row == Some(row))
            .collect()
    }

    /// 指定级别及以上的诊断数量
    pub fn count_at_least(&self, level: DiagnosticLevel) -> usize {
        self.diagnostics.iter().filter(|d| d.level >= level).count()
    }

    /// 字段取值频次（grade / thickness / width）
    pub fn value_frequencies(&self) -> BTreeMap<String, BTreeMap<String, u64>> {
        let mut out: BTreeMap<String, BTreeMap<String, u64>> = BTreeMap::new();
        for row in &self.rows {
            let fields = [
                (STAT_FIELD_GRADE, &row.result.grade),
                (STAT_FIELD_THICKNESS, &row.result.thickness),
                (STAT_FIELD_WIDTH, &row.result.width),
            ];
            for (field, value) in fields {
                if let Some(v) = value {
                    *out.entry(field.to_string())
                        .or_default()
                        .entry(v.clone())
                        .or_insert(0) += 1;
                }
            }
        }
        out
    }
}

/// 统计字段名
pub const STAT_FIELD_GRADE: &str = "grade";
pub const STAT_FIELD_THICKNESS: &str = "thickness";
pub const STAT_FIELD_WIDTH: &str = "width";

// ==========================================
// RunRecord - 持久化的运行记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_id: String,
    pub file_name: String,
    pub supplier: String,
    pub processed_at: DateTime<Utc>,
    pub rows_processed: usize,
    pub grade_found: usize,
    pub no_grade_found: usize,
    pub highlighted: usize,
    pub value_frequencies: BTreeMap<String, BTreeMap<String, u64>>,
}

impl RunRecord {
    /// 由运行报告构建记录（供应商名首字母大写，缺省 "Unknown"）
    pub fn from_report(report: &RunReport, file_name: &str, supplier: Option<&str>) -> Self {
        Self {
            run_id: report.run_id.clone(),
            file_name: file_name.to_string(),
            supplier: capitalize(supplier.unwrap_or("unknown")),
            processed_at: Utc::now(),
            rows_processed: report.summary.total_rows,
            grade_found: report.summary.grade_found,
            no_grade_found: report.summary.no_grade_found,
            highlighted: report.summary.highlighted,
            value_frequencies: report.value_frequencies(),
        }
    }
}

fn capitalize(value: &str) -> String {
    let trimmed = value.trim().to_lowercase();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => "Unknown".to_string(),
    }
}

// ==========================================
// DashboardStats - 历史运行汇总
// ==========================================
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_files: usize,
    pub total_rows: usize,
    pub unique_suppliers: usize,
    pub frequencies: BTreeMap<String, BTreeMap<String, u64>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::extraction::ExtractionResult;

    fn row(idx: usize, grade: Option<&str>, thickness: Option<&str>) -> RowOutput {
        RowOutput {
            row_index: idx,
            original: vec![],
            result: ExtractionResult {
                grade: grade.map(String::from),
                thickness: thickness.map(String::from),
                ..Default::default()
            },
        }
    }

    fn report(rows: Vec<RowOutput>, diagnostics: Vec<Diagnostic>) -> RunReport {
        RunReport {
            run_id: "run-1".to_string(),
            headers: vec![],
            summary: RunSummary {
                total_rows: rows.len(),
                ..Default::default()
            },
            rows,
            diagnostics,
            has_tolerances: false,
        }
    }

    #[test]
    fn test_value_frequencies() {
        let r = report(
            vec![
                row(0, Some("CR4"), Some("1,3")),
                row(1, Some("CR4"), None),
                row(2, None, Some("1,3")),
            ],
            vec![],
        );
        let freq = r.value_frequencies();
        assert_eq!(freq[STAT_FIELD_GRADE]["CR4"], 2);
        assert_eq!(freq[STAT_FIELD_THICKNESS]["1,3"], 2);
        assert!(!freq.contains_key(STAT_FIELD_WIDTH));
    }

    #[test]
    fn test_diagnostics_filtering() {
        let r = report(
            vec![],
            vec![
                Diagnostic::info(Some(1), PipelineStage::Grade, "a"),
                Diagnostic::warning(Some(1), PipelineStage::Coating, "b"),
                Diagnostic::error(None, PipelineStage::Dimension, "c"),
            ],
        );
        assert_eq!(r.diagnostics_for_row(1).len(), 2);
        assert_eq!(r.count_at_least(DiagnosticLevel::Warning), 2);
    }

    #[test]
    fn test_run_record_supplier_capitalized() {
        let r = report(vec![row(0, Some("CR4"), None)], vec![]);
        let record = RunRecord::from_report(&r, "anfrage.xlsx", Some("THYSSEN"));
        assert_eq!(record.supplier, "Thyssen");
        assert_eq!(record.rows_processed, 1);

        let record = RunRecord::from_report(&r, "anfrage.xlsx", None);
        assert_eq!(record.supplier, "Unknown");
    }
}
