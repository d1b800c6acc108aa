// ==========================================
// 钢材物料短文本解析 - 尺寸解析引擎
// ==========================================
// 职责: 从描述中解析 厚 × 宽 [× 长]，公差委托 tolerance 模块
// 规则: 1. 区域格式归一（同时含 '.' 与 ',' 时 '.' 为千分位）
//       2. 先剔除公差与括号注释，避免公差数字被当作第三尺寸
//       3. 前两个数中较小者为厚度，较大者为宽度
// 输出: 逗号小数字符串，保留原文写法（"1.3" → "1,3"，"945" → "945"）
// ==========================================

use crate::domain::extraction::{Dimensions, Tolerances};
use crate::engine::error::DimensionError;
use crate::engine::tolerance;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, error};

static RE_TOLERANCE_SIGNED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\+/-|[+-]\d*[.,]?\d*\s*[+,\-./]?)\s*\d*[.,]?\d*").expect("signed tolerance regex")
});
static RE_TOLERANCE_PLUS_MINUS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+[\d.]+/-[\d.]+").expect("plus/minus tolerance regex"));
static RE_PARENTHESIZED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(.*?\)").expect("parenthesized regex"));
static RE_DIMENSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(\d+[.,]?\d*)\s*(?:[a-zA-Z\s]*?)\s*[xX*]\s*(\d+[.,]?\d*)(?:\s*[xX*]\s*(\d+[.,]?\d*))?",
    )
    .expect("dimension regex")
});

/// 区域格式归一: 去 "mm"，"±" → "+/-"，小数点统一为 '.'
pub fn normalize_locale(text: &str) -> String {
    let has_both = text.contains('.') && text.contains(',');
    let text = text.replace("mm", "").replace('±', "+/-");
    if has_both {
        text.replace('.', "").replace(',', ".")
    } else {
        text.replace(',', ".")
    }
}

/// 输出格式: 小数点改为逗号，去掉末尾孤立小数点
fn format_value(raw: &str) -> String {
    raw.trim().trim_end_matches('.').replace('.', ",")
}

fn parse_value(raw: &str) -> Result<f64, DimensionError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| DimensionError::InvalidNumber {
            value: raw.to_string(),
        })
}

// ==========================================
// DimensionParser - 尺寸解析器
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct DimensionParser;

impl DimensionParser {
    pub fn new() -> Self {
        Self
    }

    /// 解析尺寸（失败时记录错误并返回全空）
    pub fn parse_dimensions(&self, description: &str) -> Dimensions {
        match self.try_parse_dimensions(description) {
            Ok(dims) => dims,
            Err(e) => {
                error!(description, error = %e, "尺寸解析失败");
                Dimensions::default()
            }
        }
    }

    /// 解析尺寸
    ///
    /// # 返回
    /// - Ok(Dimensions): 未匹配到尺寸样式时各字段为 None
    /// - Err(DimensionError): 数值无法解析
    pub fn try_parse_dimensions(&self, description: &str) -> Result<Dimensions, DimensionError> {
        let text = normalize_locale(description);
        let text = RE_TOLERANCE_SIGNED.replace_all(&text, "");
        let text = RE_TOLERANCE_PLUS_MINUS.replace_all(&text, "");
        let text = RE_PARENTHESIZED.replace_all(&text, "");

        let Some(caps) = RE_DIMENSION.captures(&text) else {
            return Ok(Dimensions::default());
        };

        let (Some(first), Some(second)) = (caps.get(1), caps.get(2)) else {
            return Ok(Dimensions::default());
        };
        let third = caps.get(3).map(|m| m.as_str());

        let a = parse_value(first.as_str())?;
        let b = parse_value(second.as_str())?;
        if let Some(t) = third {
            parse_value(t)?;
        }

        // 任一主尺寸为 0 视为无效
        if a == 0.0 || b == 0.0 {
            return Ok(Dimensions::default());
        }

        let (thickness, width) = if a <= b {
            (first.as_str(), second.as_str())
        } else {
            (second.as_str(), first.as_str())
        };

        let dims = Dimensions {
            thickness: Some(format_value(thickness)),
            width: Some(format_value(width)),
            length: third.map(format_value),
        };
        debug!(
            description,
            thickness = ?dims.thickness,
            width = ?dims.width,
            length = ?dims.length,
            "尺寸解析完成"
        );
        Ok(dims)
    }

    /// 提取公差
    pub fn extract_tolerances(&self, description: &str) -> Tolerances {
        tolerance::extract_tolerances(description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Dimensions {
        DimensionParser::new().parse_dimensions(s)
    }

    #[test]
    fn test_normalize_locale() {
        assert_eq!(normalize_locale("1.234,5 x 10"), "1234.5 x 10");
        assert_eq!(normalize_locale("1,3x945mm"), "1.3x945");
        assert_eq!(normalize_locale("2 ±0,1"), "2 +/-0.1");
    }

    #[test]
    fn test_basic_dimensions_keep_spelling() {
        let d = parse("C 1,3x945 CR4 Z100MB");
        assert_eq!(d.thickness.as_deref(), Some("1,3"));
        assert_eq!(d.width.as_deref(), Some("945"));
        assert_eq!(d.length, None);
    }

    #[test]
    fn test_smaller_value_is_thickness() {
        let d = parse("1250 x 2,5");
        assert_eq!(d.thickness.as_deref(), Some("2,5"));
        assert_eq!(d.width.as_deref(), Some("1250"));
    }

    #[test]
    fn test_three_dimensions() {
        let d = parse("Blech 1,5x1056x419");
        assert_eq!(d.thickness.as_deref(), Some("1,5"));
        assert_eq!(d.width.as_deref(), Some("1056"));
        assert_eq!(d.length.as_deref(), Some("419"));
    }

    #[test]
    fn test_text_between_dimensions() {
        let d = parse("0,8 nach Norm x 206");
        assert_eq!(d.thickness.as_deref(), Some("0,8"));
        assert_eq!(d.width.as_deref(), Some("206"));
    }

    #[test]
    fn test_tolerances_do_not_become_length() {
        let d = parse("3,0 (+0/-0,4) x 271");
        assert_eq!(d.thickness.as_deref(), Some("3,0"));
        assert_eq!(d.width.as_deref(), Some("271"));
        assert_eq!(d.length, None);

        let d = parse("2,00 +/-0,08 x 1250 mm");
        assert_eq!(d.thickness.as_deref(), Some("2,00"));
        assert_eq!(d.width.as_deref(), Some("1250"));
    }

    #[test]
    fn test_star_separator_and_thousands() {
        let d = parse("1.250,0 * 3,5");
        assert_eq!(d.thickness.as_deref(), Some("3,5"));
        assert_eq!(d.width.as_deref(), Some("1250,0"));
    }

    #[test]
    fn test_no_dimensions() {
        assert_eq!(parse("###unknown_text###"), Dimensions::default());
        assert_eq!(parse(""), Dimensions::default());
        assert_eq!(parse("0 x 100"), Dimensions::default());
    }
}
