// ==========================================
// 钢材物料短文本解析 - 牌号匹配引擎
// ==========================================
// 职责: 从物料描述中识别唯一牌号
// 规则: 1. 分词后精确匹配（大小写不敏感），命中即返回
//       2. 归一化子串包含，最长者胜，等长取 schema 顺序靠前者
// 红线: 每行最多一个牌号；不做模糊打分兜底
// ==========================================

use crate::domain::extraction::GradeMatch;
use crate::domain::schema::KnowledgeBase;
use crate::domain::types::MatchKind;
use crate::engine::normalizer::normalize;
use tracing::{debug, trace};

/// 分词用分隔符（按顺序逐级切分）
const TOKEN_SEPARATORS: [&str; 6] = [" ", "-", ";", "+", "x", "X"];

// ==========================================
// GradeMatcher - 牌号匹配器
// ==========================================
#[derive(Debug, Clone)]
pub struct GradeMatcher {
    grades: Vec<String>,
    normalized: Vec<String>,
}

impl GradeMatcher {
    /// 由知识库构建（预计算归一化牌号）
    pub fn new(kb: &KnowledgeBase) -> Self {
        Self::from_grades(kb.grade_codes().into_iter().map(String::from).collect())
    }

    pub fn from_grades(grades: Vec<String>) -> Self {
        let normalized = grades.iter().map(|g| normalize(g)).collect();
        Self { grades, normalized }
    }

    /// 提取牌号
    ///
    /// # 参数
    /// - description: 物料描述
    /// - _threshold: 模糊匹配阈值（模糊兜底已停用，仅保留签名）
    ///
    /// # 返回
    /// (牌号, 是否命中)
    pub fn extract_grade(&self, description: &str, _threshold: f64) -> (Option<String>, bool) {
        match self.find_grade(description) {
            Some(m) => (Some(m.grade), true),
            None => (None, false),
        }
    }

    /// 查找牌号并返回匹配方式
    pub fn find_grade(&self, description: &str) -> Option<GradeMatch> {
        if let Some(grade) = self.exact_match(description) {
            debug!(grade = %grade, "牌号精确匹配");
            return Some(GradeMatch {
                grade,
                kind: MatchKind::Exact,
            });
        }

        let grade = self.containment_match(description)?;
        debug!(grade = %grade, "牌号包含匹配");
        Some(GradeMatch {
            grade,
            kind: MatchKind::Containment,
        })
    }

    // ==========================================
    // 第一轮: 分词精确匹配
    // ==========================================
    fn exact_match(&self, description: &str) -> Option<String> {
        for token in tokenize(description) {
            let lowered = token.to_lowercase();
            if let Some(grade) = self.grades.iter().find(|g| g.to_lowercase() == lowered) {
                return Some(grade.clone());
            }
        }
        None
    }

    // ==========================================
    // 第二轮: 归一化子串包含（最长者胜）
    // ==========================================
    fn containment_match(&self, description: &str) -> Option<String> {
        let haystack = normalize(description);
        let mut best: Option<(usize, usize)> = None; // (序号, 长度)

        for (idx, needle) in self.normalized.iter().enumerate() {
            if needle.is_empty() || !haystack.contains(needle.as_str()) {
                continue;
            }
            let len = needle.chars().count();
            trace!(candidate = %self.grades[idx], len, "包含候选");
            // 严格大于: 等长时保留 schema 顺序靠前者
            if best.map_or(true, |(_, best_len)| len > best_len) {
                best = Some((idx, len));
            }
        }

        best.map(|(idx, _)| self.grades[idx].clone())
    }
}

/// 逐级分词: 每个分隔符切分后的片段累加为候选词，再追加原文，保序去重
pub fn tokenize(description: &str) -> Vec<String> {
    let mut words: Vec<String> = Vec::new();
    let mut current = description.to_string();

    for sep in TOKEN_SEPARATORS {
        let pieces: Vec<String> = current
            .split(sep)
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(String::from)
            .collect();
        current = pieces.join(" ");
        words.extend(pieces);
    }
    words.push(description.to_string());

    let mut seen = std::collections::HashSet::new();
    words.retain(|w| seen.insert(w.clone()));
    words
}
