// ==========================================
// 钢材物料短文本解析 - 表面处理识别
// ==========================================
// 职责: 在余量中查找表面处理代码，命中后剔除并做别名归一
// 规则: 1. 归一化子串包含，最长者胜（等长取列表靠前者）
//       2. 兜底: 空白分词后的精确匹配（大小写不敏感）
// ==========================================

use crate::engine::normalizer::normalize;
use tracing::debug;

/// 表面处理别名表（大小写不敏感）
const TREATMENT_ALIASES: [(&str, &str); 5] = [
    ("U", "UO"),
    ("MB", "MBO"),
    ("A", "AO"),
    ("AM", "MAO"),
    ("AMO", "AO"),
];

/// 表面处理识别结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreatmentHit {
    pub treatment: String, // 已归一的代码
    pub remainder: String, // 剔除后的余量
}

/// 别名归一（未登记的代码原样返回）
pub fn canonical_treatment(code: &str) -> String {
    TREATMENT_ALIASES
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(code.trim()))
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or_else(|| code.trim().to_string())
}

/// 在余量中查找表面处理
///
/// # 参数
/// - remainder: 当前余量（已小写）
/// - treatments: 候选代码列表（规则顺序）
///
/// # 返回
/// 未命中时返回 None，余量保持不变
pub fn find_treatment<S: AsRef<str>>(remainder: &str, treatments: &[S]) -> Option<TreatmentHit> {
    let haystack = remainder.to_lowercase();

    // 第一轮: 最长子串
    let mut best: Option<(&str, String)> = None;
    for code in treatments {
        let code = code.as_ref();
        let needle = normalize(code);
        if needle.is_empty() || !haystack.contains(needle.as_str()) {
            continue;
        }
        if best
            .as_ref()
            .map_or(true, |(_, b)| needle.chars().count() > b.chars().count())
        {
            best = Some((code, needle));
        }
    }

    if let Some((code, needle)) = best {
        let stripped = haystack.replace(needle.as_str(), " ");
        debug!(treatment = code, "表面处理子串命中");
        return Some(TreatmentHit {
            treatment: canonical_treatment(code),
            remainder: stripped,
        });
    }

    // 第二轮: 分词精确匹配
    for token in haystack.split_whitespace() {
        let trimmed = token.trim_matches(|c: char| !c.is_alphanumeric());
        if trimmed.is_empty() {
            continue;
        }
        if let Some(code) = treatments
            .iter()
            .map(AsRef::as_ref)
            .find(|c| c.trim().to_lowercase() == trimmed)
        {
            let stripped = haystack
                .split_whitespace()
                .filter(|t| *t != token)
                .collect::<Vec<_>>()
                .join(" ");
            debug!(treatment = code, "表面处理分词命中");
            return Some(TreatmentHit {
                treatment: canonical_treatment(code),
                remainder: stripped,
            });
        }
    }

    None
}
