// ==========================================
// 钢材物料短文本解析 - 镀层/表面处理匹配引擎
// ==========================================
// 职责: 从去除牌号后的候选文本中识别镀层与表面处理
// 流程: 1. 前缀斜杠预处理 ("gi/50/50" → "gi50/50")
//       2. 遍历全部规则收集候选（不在首次命中处停止）
//       3. 剔除被更长候选覆盖的候选 ("z10" 位于 "z100" 内)
//       4. 按冲突策略选定唯一镀层
//       5. 以选中规则的表面处理列表识别表面处理
//          （无镀层命中时用最后一条规则的列表）
//       6. 余量清理尺寸片段
// 红线: 全函数，任何输入均返回结果，不 panic
// ==========================================

use crate::domain::extraction::CoatingOutcome;
use crate::domain::schema::{CoatingRule, KnowledgeBase};
use crate::domain::types::CoatingConflictPolicy;
use crate::engine::normalizer::normalize;
use crate::engine::remainder::strip_dimension_tokens;
use crate::engine::treatment::find_treatment;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

static RE_PREFIX_SLASH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(^|[^a-z])(gi|eg|as|ze|z|g)/").expect("prefix slash regex")
});

/// 前缀斜杠预处理: 已知镀层前缀紧跟 "/" 时去掉斜杠
pub fn strip_prefix_slash(text: &str) -> String {
    RE_PREFIX_SLASH.replace_all(text, "${1}${2}").into_owned()
}

/// 规则展开后的一个匹配写法
#[derive(Debug, Clone)]
struct Needle {
    text: String,            // 归一化写法
    coating: Option<String>, // 镀层代码
}

/// 一个镀层候选
#[derive(Debug, Clone)]
struct Candidate {
    rule_idx: usize,
    perm_idx: usize,
    needle: String,
    coating: Option<String>,
    spans: Vec<(usize, usize)>,
}

impl Candidate {
    fn len(&self) -> usize {
        self.needle.chars().count()
    }

    /// 全部出现位置都落在 other 的某个出现位置之内
    fn is_covered_by(&self, other: &Candidate) -> bool {
        other.needle.len() > self.needle.len()
            && self.spans.iter().all(|(s, e)| {
                other
                    .spans
                    .iter()
                    .any(|(os, oe)| os <= s && e <= oe)
            })
    }
}

/// 策略选择结果
enum Selection<'a> {
    None,
    Picked(&'a Candidate),
    Rejected,
}

// ==========================================
// CoatingTreatmentMatcher - 镀层/表面处理匹配器
// ==========================================
#[derive(Debug, Clone)]
pub struct CoatingTreatmentMatcher {
    rules: Vec<CoatingRule>,
    needles: Vec<Vec<Needle>>,
    fallback_treatments: Vec<String>,
    policy: CoatingConflictPolicy,
}

impl CoatingTreatmentMatcher {
    pub fn new(kb: &KnowledgeBase, policy: CoatingConflictPolicy) -> Self {
        Self::from_rules(kb.coating_rules().to_vec(), policy)
    }

    pub fn from_rules(rules: Vec<CoatingRule>, policy: CoatingConflictPolicy) -> Self {
        let needles = rules
            .iter()
            .map(|rule| {
                rule.permutations()
                    .into_iter()
                    .map(|p| Needle {
                        text: normalize(&p.text),
                        coating: p.coating,
                    })
                    .filter(|n| !n.text.is_empty())
                    .collect()
            })
            .collect();

        // 无镀层命中时只用最后一条规则的表面处理
        let fallback_treatments = rules
            .last()
            .map(|r| r.treatment.clone())
            .unwrap_or_default();

        Self {
            rules,
            needles,
            fallback_treatments,
            policy,
        }
    }

    pub fn policy(&self) -> CoatingConflictPolicy {
        self.policy
    }

    /// 识别镀层与表面处理
    ///
    /// # 参数
    /// - candidate: 去除牌号后的候选文本
    /// - matched_grade: 已识别的牌号（用于拼接 grade_with_prefix）
    pub fn extract_coating_treatment(
        &self,
        candidate: &str,
        matched_grade: Option<&str>,
    ) -> CoatingOutcome {
        let lowered: String = candidate
            .to_lowercase()
            .chars()
            .filter(|c| *c != '+' && *c != '-')
            .collect();
        let working = strip_prefix_slash(&lowered);

        let candidates = self.collect_candidates(&working);
        let survivors: Vec<&Candidate> = candidates
            .iter()
            .filter(|c| !candidates.iter().any(|o| c.is_covered_by(o)))
            .collect();

        for c in &survivors {
            debug!(rule = c.rule_idx, needle = %c.needle, "镀层候选");
        }

        let mut outcome = CoatingOutcome {
            grade_with_prefix: matched_grade.map(String::from),
            ..CoatingOutcome::default()
        };

        let remainder = match self.select(&survivors) {
            Selection::Picked(picked) => {
                let rule = &self.rules[picked.rule_idx];
                outcome.coating = picked.coating.clone();
                outcome.grade_with_prefix = matched_grade
                    .map(|g| format!("{}{}{}", g, rule.symbol, rule.prefix_coating));
                outcome.conflicting_needles = distinct_needles(&survivors)
                    .into_iter()
                    .filter(|n| *n != picked.needle)
                    .collect();
                if !outcome.conflicting_needles.is_empty() {
                    warn!(
                        policy = %self.policy,
                        selected = %picked.needle,
                        dropped = ?outcome.conflicting_needles,
                        "镀层候选冲突"
                    );
                }

                let rest = working.replace(picked.needle.as_str(), " ");
                match find_treatment(&rest, &rule.treatment) {
                    Some(hit) => {
                        outcome.treatment = Some(hit.treatment);
                        hit.remainder
                    }
                    None => rest,
                }
            }
            Selection::Rejected => {
                outcome.conflicting_needles = distinct_needles(&survivors);
                warn!(
                    candidates = ?outcome.conflicting_needles,
                    "镀层候选冲突，按策略不赋值"
                );
                working
            }
            Selection::None => {
                debug!("未识别到镀层，使用最后一条规则的表面处理代码");
                match find_treatment(&working, &self.fallback_treatments) {
                    Some(hit) => {
                        outcome.treatment = Some(hit.treatment);
                        hit.remainder
                    }
                    None => working,
                }
            }
        };

        outcome.unmatched_remainder = strip_dimension_tokens(&remainder);
        outcome
    }

    fn collect_candidates(&self, working: &str) -> Vec<Candidate> {
        let mut out = Vec::new();
        for (rule_idx, needles) in self.needles.iter().enumerate() {
            for (perm_idx, needle) in needles.iter().enumerate() {
                let spans: Vec<(usize, usize)> = working
                    .match_indices(needle.text.as_str())
                    .map(|(start, m)| (start, start + m.len()))
                    .collect();
                if spans.is_empty() {
                    continue;
                }
                out.push(Candidate {
                    rule_idx,
                    perm_idx,
                    needle: needle.text.clone(),
                    coating: needle.coating.clone(),
                    spans,
                });
            }
        }
        out
    }

    fn select<'a>(&self, survivors: &[&'a Candidate]) -> Selection<'a> {
        if survivors.is_empty() {
            return Selection::None;
        }

        match self.policy {
            CoatingConflictPolicy::LastRuleWins => survivors
                .iter()
                .max_by_key(|c| (c.rule_idx, c.perm_idx))
                .map_or(Selection::None, |c| Selection::Picked(*c)),
            CoatingConflictPolicy::LongestMatch => {
                let mut best: Option<&'a Candidate> = None;
                for c in survivors.iter().copied() {
                    // 严格大于: 等长保留规则顺序靠前者
                    if best.map_or(true, |b| c.len() > b.len()) {
                        best = Some(c);
                    }
                }
                best.map_or(Selection::None, Selection::Picked)
            }
            CoatingConflictPolicy::RejectConflicting => {
                if distinct_needles(survivors).len() > 1 {
                    Selection::Rejected
                } else {
                    Selection::Picked(survivors[0])
                }
            }
        }
    }
}

fn distinct_needles(candidates: &[&Candidate]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for c in candidates {
        if !out.contains(&c.needle) {
            out.push(c.needle.clone());
        }
    }
    out
}
