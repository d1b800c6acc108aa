// ==========================================
// 钢材物料短文本解析 - 字符串归一化
// ==========================================
// 职责: 生成大小写/分隔符无关的比较形式
// 红线: 纯函数，幂等 normalize(normalize(s)) == normalize(s)
// ==========================================

/// 归一化: 去除全部空白、'+'、'-'，再转小写
///
/// 例: "CR 210-LA" → "cr210la"
pub fn normalize(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '+' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// 折叠连续空白并去首尾空白
pub fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_separators() {
        assert_eq!(normalize("CR 210-LA"), "cr210la");
        assert_eq!(normalize(" Z100 + MB "), "z100mb");
        assert_eq!(normalize("\tDX51D\n"), "dx51d");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for s in ["C 1,3x945 CR4 Z100MB", "GI 40/40", "ungehärtet +0/-0,4", "ÄÖÜ-x"] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "input: {}", s);
        }
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a   b \t c "), "a b c");
        assert_eq!(collapse_whitespace("   "), "");
    }
}
