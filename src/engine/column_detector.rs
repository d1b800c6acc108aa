// ==========================================
// 钢材物料短文本解析 - 牌号列自动识别
// ==========================================
// 职责: 未指定牌号列时，按单元格命中牌号的比例为每列打分，取最高分列
// 规则: 仅使用长度 > 3 的牌号（去空格、小写后比较）
//       单元格得分 = len(牌号) / len(单元格)
//       得分 == 1 × 0.5（整格即牌号，多为牌号对照列）
//       得分 < 0.2 × 0.7（牌号淹没在长文本中）
//       列得分 = 命中单元格得分均值
// ==========================================

use crate::domain::schema::KnowledgeBase;
use crate::domain::table::RawTable;
use crate::engine::error::ExtractionError;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// 列打分结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnScore {
    pub column: String,
    pub score: f64,
    pub matched_cells: usize,
}

/// 单元格命中比例（含惩罚）
pub fn match_ratio(grade: &str, cell: &str) -> f64 {
    let cell_len = cell.chars().count();
    if cell_len == 0 {
        return 0.0;
    }
    let ratio = grade.chars().count() as f64 / cell_len as f64;
    let penalized = if ratio == 1.0 {
        ratio * 0.5
    } else if ratio < 0.2 {
        ratio * 0.7
    } else {
        ratio
    };
    penalized.max(0.0)
}

// ==========================================
// GradeColumnDetector - 牌号列识别器
// ==========================================
#[derive(Debug, Clone)]
pub struct GradeColumnDetector {
    grades: Vec<String>,
    threshold: f64,
}

impl GradeColumnDetector {
    pub fn new(kb: &KnowledgeBase, threshold: f64) -> Self {
        let grades = kb
            .grade_codes()
            .into_iter()
            .map(|g| g.replace(' ', "").to_lowercase())
            .filter(|g| g.chars().count() > 3)
            .collect();
        Self { grades, threshold }
    }

    /// 每列得分（仅含至少命中一个单元格的列，按列顺序）
    pub fn score_columns(&self, table: &RawTable) -> Vec<ColumnScore> {
        let mut scores = Vec::new();
        for (col_idx, header) in table.headers.iter().enumerate() {
            let mut matched = 0usize;
            let mut total = 0.0f64;

            for row in 0..table.row_count() {
                let Some(text) = table.cell(row, col_idx).to_text() else {
                    continue;
                };
                let cell = text.replace(' ', "").to_lowercase();
                // 每个单元格只取第一个命中的牌号
                if let Some(grade) = self.grades.iter().find(|g| cell.contains(g.as_str())) {
                    matched += 1;
                    total += match_ratio(grade, &cell);
                }
            }

            if matched > 0 {
                let score = total / matched as f64;
                debug!(column = %header, score, matched, "列得分");
                scores.push(ColumnScore {
                    column: header.clone(),
                    score,
                    matched_cells: matched,
                });
            }
        }
        scores
    }

    /// 识别牌号列
    ///
    /// # 返回
    /// - Ok(列名)
    /// - Err(GradeColumnNotDetected): 最高分低于阈值
    pub fn detect(&self, table: &RawTable) -> Result<String, ExtractionError> {
        let mut best: Option<ColumnScore> = None;
        for score in self.score_columns(table) {
            if best.as_ref().map_or(true, |b| score.score > b.score) {
                best = Some(score);
            }
        }

        match best {
            Some(b) if b.score >= self.threshold => {
                info!(column = %b.column, score = b.score, "识别到牌号列");
                Ok(b.column)
            }
            other => {
                let best_score = other.map_or(0.0, |b| b.score);
                warn!(best_score, threshold = self.threshold, "未能识别牌号列");
                Err(ExtractionError::GradeColumnNotDetected {
                    best_score,
                    threshold: self.threshold,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema::{GradeEntry, SchemaEntry};
    use crate::domain::table::Cell;

    fn kb(grades: &[&str]) -> KnowledgeBase {
        KnowledgeBase::from_entries(
            grades
                .iter()
                .map(|g| {
                    SchemaEntry::Grade(GradeEntry {
                        base_grade: g.to_string(),
                    })
                })
                .collect(),
        )
    }

    fn table() -> RawTable {
        RawTable::new(
            vec![
                "Pos".to_string(),
                "Materialkurztext".to_string(),
                "Bemerkung".to_string(),
            ],
            vec![
                vec![Cell::Number(1.0), Cell::from("C 1,3x945 CR4 Z100MB"), Cell::Empty],
                vec![
                    Cell::Number(2.0),
                    Cell::from("C 1,7x380 CR210LA Z100MB"),
                    Cell::from("Lieferung gemäß Norm für DX51D bitte Termin beachten"),
                ],
                vec![Cell::Number(3.0), Cell::from("DX51D+Z 0,8x1250"), Cell::Empty],
            ],
        )
    }

    #[test]
    fn test_match_ratio_penalties() {
        assert_eq!(match_ratio("dx51d", "dx51d"), 0.5);
        assert!((match_ratio("dx51d", "dx51dz") - 5.0 / 6.0).abs() < 1e-9);
        let long = "a".repeat(100);
        assert!((match_ratio("dx51d", &long) - 0.05 * 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_description_column_beats_remark_column() {
        let detector = GradeColumnDetector::new(&kb(&["CR210LA", "DX51D", "CR4"]), 0.1);
        let scores = detector.score_columns(&table());
        assert_eq!(scores.len(), 2);
        assert!(scores[0].score > scores[1].score);
        assert_eq!(detector.detect(&table()).unwrap(), "Materialkurztext");
    }

    #[test]
    fn test_no_column_above_threshold() {
        let detector = GradeColumnDetector::new(&kb(&["S355J2"]), 0.1);
        let err = detector.detect(&table()).unwrap_err();
        assert!(matches!(err, ExtractionError::GradeColumnNotDetected { .. }));
    }
}
