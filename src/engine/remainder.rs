// ==========================================
// 钢材物料短文本解析 - 余量清理与显著性判定
// ==========================================
// 职责: 1. 去除余量中的尺寸样式片段（"1,3x945" / "1,5x1056x419" / 孤立数字）
//       2. 判定余量是否需要人工复核（黄色标记）
// ==========================================

use crate::config::settings::ExtractionSettings;
use crate::engine::normalizer::collapse_whitespace;
use regex::Regex;
use std::sync::LazyLock;

static RE_DIMENSION_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\d+(?:[.,]\d+)?\s*(?:[a-z]+\s*)?[x*]\s*\d+(?:[.,]\d+)?(?:\s*[x*]\s*\d+(?:[.,]\d+)?)?",
    )
    .expect("dimension token regex")
});
static RE_STANDALONE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d+[,.]\d+\b|\b\d{2,4}\b").expect("standalone number regex"));
static RE_STANDALONE_X: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bx\b").expect("standalone x regex"));

/// 去除尺寸样式片段并折叠空白
pub fn strip_dimension_tokens(text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }
    let text = RE_DIMENSION_TOKEN.replace_all(text, " ");
    let text = RE_STANDALONE_NUMBER.replace_all(&text, " ");
    let text = RE_STANDALONE_X.replace_all(&text, " ");
    collapse_whitespace(&text)
}

/// 余量显著性判定
///
/// 依次判断:
/// 1. 不含任何字母 → 否（纯数字/符号/空白永不标记）
/// 2. 含关键词 → 是
/// 3. 长度 > significance_min_length → 是
/// 4. 纯字母且长度 >= significance_min_alpha_length → 是
pub fn is_significant(remainder: &str, settings: &ExtractionSettings) -> bool {
    let lowered = remainder.trim().to_lowercase();
    if !lowered.chars().any(char::is_alphabetic) {
        return false;
    }

    if settings
        .significance_keywords
        .iter()
        .filter(|k| !k.trim().is_empty())
        .any(|k| lowered.contains(&k.trim().to_lowercase()))
    {
        return true;
    }

    let len = lowered.chars().count();
    if len > settings.significance_min_length {
        return true;
    }

    len >= settings.significance_min_alpha_length && lowered.chars().all(char::is_alphabetic)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_dimension_tokens() {
        assert_eq!(strip_dimension_tokens("1,3x945 "), "");
        assert_eq!(strip_dimension_tokens("1,5x1056x419 bondal"), "bondal");
        assert_eq!(strip_dimension_tokens("3,0 x 271 x dh"), "dh");
        assert_eq!(strip_dimension_tokens("1,7x380 z100mb/"), "z100mb/");
        assert_eq!(strip_dimension_tokens("   "), "");
    }

    #[test]
    fn test_strip_keeps_numbers_glued_to_letters() {
        assert_eq!(strip_dimension_tokens("z100mb 12"), "z100mb");
    }

    #[test]
    fn test_significance_rules() {
        let s = ExtractionSettings::default();
        assert!(!is_significant("", &s));
        assert!(!is_significant("  12/34,5  ", &s));
        assert!(is_significant("cr", &s)); // 关键词
        assert!(is_significant("z100mb/", &s)); // 长度 > 5
        assert!(is_significant("ab", &s)); // 短纯字母
        assert!(!is_significant("a", &s));
        assert!(!is_significant("a1/", &s));
        assert!(is_significant("Ungehärtet", &s));
    }

    #[test]
    fn test_significance_uses_settings() {
        let s = ExtractionSettings {
            significance_keywords: vec![],
            significance_min_length: 10,
            significance_min_alpha_length: 4,
            ..ExtractionSettings::default()
        };
        assert!(!is_significant("cr", &s));
        assert!(!is_significant("z100mb/", &s));
        assert!(is_significant("abcd", &s));
    }
}
