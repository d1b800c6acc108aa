// ==========================================
// 钢材物料短文本解析 - 公差提取
// ==========================================
// 职责: 识别厚/宽/长公差
// 规则: 1. 按优先级扫描公差写法（括号 / "+/-x" / "+x/-y" / 带符号数），
//          命中后从工作副本中移除，避免重复计数
//       2. 尺寸+公差组合样式命中时，按厚/宽大小关系定位公差
//       3. 否则按发现顺序依次赋给 厚/宽/长
// ==========================================

use crate::domain::extraction::Tolerances;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// 发现顺序扫描的公差写法（均取第 1 组）
static DISCOVERY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\(([+\-0-9/.,\s]+)\)", // 括号: (+0/-0,4)
        r"(\+/-\s*[\d.,]+)",     // +/-0,02
        r"(\+[\d.,]+/-[\d.,]+)", // +0/-0,4
        r"([+-][\d.,]+)",        // +0.1 / -0.2
    ]
    .iter()
    .map(|p| Regex::new(p).expect("tolerance discovery regex"))
    .collect()
});

/// 尺寸 + 公差组合样式（1/3/5 为尺寸，2/4/6 为公差）
static RE_POSITIONAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(\d+[.,]?\d*)\s*(\([^)]+\)|\+[^x\s]*|-[^x\s]*|\+/-[^x\s]*|±[^x\s]*)?",
        r"\s*(?:[a-zA-Z\s]*?)\s*[xX*]\s*",
        r"(\d+[.,]?\d*)\s*(\([^)]+\)|\+[^\s]*|-[^\s]*|\+/-[^\s]*|±[^\s]*)?",
        r"(?:\s*[xX*]\s*(\d+[.,]?\d*)\s*(\([^)]+\)|\+[^\s]*|-[^\s]*|\+/-[^\s]*|±[^\s]*)?)?",
    ))
    .expect("positional tolerance regex")
});

/// 公差清洗: 去首尾空白与括号，"±" → "+/-"，去 "mm"；清洗后为空返回 None
pub fn clean_tolerance(raw: &str) -> Option<String> {
    let cleaned = raw
        .trim()
        .trim_matches(|c: char| c == '(' || c == ')')
        .replace('±', "+/-")
        .replace("mm", "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// 按发现顺序收集公差
pub fn discover_tolerances(text: &str) -> Vec<String> {
    let mut found = Vec::new();
    let mut working = text.to_string();

    for pattern in DISCOVERY_PATTERNS.iter() {
        let matches: Vec<String> = pattern
            .captures_iter(&working)
            .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
            .collect();
        for m in matches {
            if m.trim().is_empty() {
                continue;
            }
            found.push(m.trim().to_string());
            working = working.replacen(m.as_str(), "", 1);
        }
    }
    found
}

fn parse_dim(raw: Option<regex::Match<'_>>) -> Option<f64> {
    raw.and_then(|m| m.as_str().replace(',', ".").parse::<f64>().ok())
        .filter(|v| *v != 0.0)
}

fn group_tolerance(caps: &regex::Captures<'_>, idx: usize) -> Option<String> {
    caps.get(idx).and_then(|m| clean_tolerance(m.as_str()))
}

/// 提取公差
pub fn extract_tolerances(description: &str) -> Tolerances {
    let text = description.replace('±', "+/-").replace("mm", "");
    let discovered = discover_tolerances(&text);

    let mut tols = Tolerances::default();
    if let Some(caps) = RE_POSITIONAL.captures(&text) {
        let tol1 = group_tolerance(&caps, 2);
        let tol2 = group_tolerance(&caps, 4);
        let tol3 = group_tolerance(&caps, 6);

        match (parse_dim(caps.get(1)), parse_dim(caps.get(3))) {
            (Some(d1), Some(d2)) if d1 > d2 => {
                tols.thickness = tol2;
                tols.width = tol1;
            }
            _ => {
                tols.thickness = tol1;
                tols.width = tol2;
            }
        }
        tols.length = tol3;
    }

    // 组合样式未定位到公差时按发现顺序赋值
    if !tols.any() && !discovered.is_empty() {
        let mut iter = discovered.iter().map(|t| clean_tolerance(t));
        tols.thickness = iter.next().flatten();
        tols.width = iter.next().flatten();
        tols.length = iter.next().flatten();
    }

    if tols.any() {
        debug!(description, tolerances = ?tols, "公差提取完成");
    }
    tols
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_tolerance() {
        assert_eq!(clean_tolerance(" (+0/-0,4) "), Some("+0/-0,4".to_string()));
        assert_eq!(clean_tolerance("±0,1mm"), Some("+/-0,1".to_string()));
        assert_eq!(clean_tolerance("()"), None);
        assert_eq!(clean_tolerance("  "), None);
    }

    #[test]
    fn test_discovery_order_and_removal() {
        let found = discover_tolerances("a (+0/-0,4) b +/-0,02 c -0,1");
        assert_eq!(found, vec!["+0/-0,4", "+/-0,02", "-0,1"]);
    }

    #[test]
    fn test_parenthesized_thickness_tolerance() {
        let t = extract_tolerances("3,0 (+0/-0,4) x 271");
        assert_eq!(t.thickness.as_deref(), Some("+0/-0,4"));
        assert_eq!(t.width, None);
        assert_eq!(t.length, None);
    }

    #[test]
    fn test_tolerance_follows_smaller_dimension() {
        // 宽度写在前面: 第一个公差属于宽度
        let t = extract_tolerances("1250 +5/-0 x 2,0 +/-0,08");
        assert_eq!(t.width.as_deref(), Some("+5/-0"));
        assert_eq!(t.thickness.as_deref(), Some("+/-0,08"));
    }

    #[test]
    fn test_plus_minus_sign() {
        let t = extract_tolerances("2,0 ±0,1 x 1250");
        assert_eq!(t.thickness.as_deref(), Some("+/-0,1"));
    }

    #[test]
    fn test_no_tolerance() {
        assert!(!extract_tolerances("C 1,3x945 CR4 Z100MB").any());
        assert!(!extract_tolerances("C 1,7x380 CR210LA Z100MB/GI40/40").any());
        assert!(!extract_tolerances("").any());
    }

    #[test]
    fn test_fallback_to_discovery_order() {
        let t = extract_tolerances("Dicke +0,1 Breite -2");
        assert_eq!(t.thickness.as_deref(), Some("+0,1"));
        assert_eq!(t.width.as_deref(), Some("-2"));
    }
}
