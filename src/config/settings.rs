// ==========================================
// 钢材物料短文本解析 - 提取参数
// ==========================================
// 职责: 余量显著性规则、阈值、镀层冲突策略等可调参数
// 说明: 默认值与历史行为一致；可由 config_kv 覆写
// ==========================================

use crate::domain::types::CoatingConflictPolicy;
use serde::{Deserialize, Serialize};

/// 默认余量关键词（品牌/工艺名，命中即标记复核）
pub const DEFAULT_SIGNIFICANCE_KEYWORDS: [&str; 11] = [
    "bondal",
    "hsa",
    "dh",
    "cr",
    "dc",
    "bg",
    "phsultraform",
    "ultraform",
    "ymagine",
    "scalur",
    "ungehärtet",
];

// ==========================================
// ExtractionSettings - 提取参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionSettings {
    /// 余量关键词（小写比较）
    pub significance_keywords: Vec<String>,
    /// 余量长度超过该值即视为有意义
    pub significance_min_length: usize,
    /// 纯字母余量达到该长度即视为有意义
    pub significance_min_alpha_length: usize,
    /// 牌号模糊匹配阈值（兜底已停用，仅透传）
    pub grade_threshold: f64,
    /// 镀层冲突策略
    pub coating_conflict_policy: CoatingConflictPolicy,
    /// 稀疏行阈值: 非空单元格数 <= 列数 × (1 - 阈值) 的行被丢弃
    pub sparse_row_threshold: f64,
    /// 牌号列自动识别最低得分
    pub header_detection_threshold: f64,
    /// 并行处理每块行数
    pub parallel_chunk_size: usize,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            significance_keywords: DEFAULT_SIGNIFICANCE_KEYWORDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            significance_min_length: 5,
            significance_min_alpha_length: 2,
            grade_threshold: 0.2,
            coating_conflict_policy: CoatingConflictPolicy::default(),
            sparse_row_threshold: 0.7,
            header_detection_threshold: 0.1,
            parallel_chunk_size: 256,
        }
    }
}

impl ExtractionSettings {
    /// 指定冲突策略（其余取默认）
    pub fn with_policy(policy: CoatingConflictPolicy) -> Self {
        Self {
            coating_conflict_policy: policy,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = ExtractionSettings::default();
        assert_eq!(s.significance_min_length, 5);
        assert_eq!(s.significance_min_alpha_length, 2);
        assert!(s.significance_keywords.iter().any(|k| k == "ungehärtet"));
        assert_eq!(s.coating_conflict_policy, CoatingConflictPolicy::LastRuleWins);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let s: ExtractionSettings =
            serde_json::from_str(r#"{"coating_conflict_policy":"LONGEST_MATCH","significance_min_length":8}"#)
                .unwrap();
        assert_eq!(s.coating_conflict_policy, CoatingConflictPolicy::LongestMatch);
        assert_eq!(s.significance_min_length, 8);
        assert_eq!(s.sparse_row_threshold, 0.7);
    }
}
