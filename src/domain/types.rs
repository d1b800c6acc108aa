// ==========================================
// 钢材物料短文本解析 - 领域类型定义
// ==========================================
// 职责: 匹配方式 / 冲突策略 / 诊断级别 / 处理阶段
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 牌号匹配方式 (Grade Match Kind)
// ==========================================
// 精确匹配永远优先于包含匹配
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchKind {
    Exact,       // 分词后大小写不敏感完全相等
    Containment, // 归一化后子串包含（最长者胜）
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchKind::Exact => write!(f, "EXACT"),
            MatchKind::Containment => write!(f, "CONTAINMENT"),
        }
    }
}

// ==========================================
// 镀层冲突策略 (Coating Conflict Policy)
// ==========================================
// 同一文本命中多条镀层规则时的取舍方式
// 默认 LastRuleWins: 与历史行为一致（按 schema 顺序最后命中者胜）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CoatingConflictPolicy {
    #[default]
    LastRuleWins,      // 规则顺序最后者胜
    LongestMatch,      // 归一化后最长者胜，等长取规则顺序靠前者
    RejectConflicting, // 存在多个不同命中时不赋值，交人工复核
}

impl fmt::Display for CoatingConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoatingConflictPolicy::LastRuleWins => write!(f, "LAST_RULE_WINS"),
            CoatingConflictPolicy::LongestMatch => write!(f, "LONGEST_MATCH"),
            CoatingConflictPolicy::RejectConflicting => write!(f, "REJECT_CONFLICTING"),
        }
    }
}

impl std::str::FromStr for CoatingConflictPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "LAST_RULE_WINS" => Ok(CoatingConflictPolicy::LastRuleWins),
            "LONGEST_MATCH" => Ok(CoatingConflictPolicy::LongestMatch),
            "REJECT_CONFLICTING" => Ok(CoatingConflictPolicy::RejectConflicting),
            other => Err(format!("未知的镀层冲突策略: {}", other)),
        }
    }
}

// ==========================================
// 诊断级别 (Diagnostic Level)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticLevel {
    Info,    // 提示（仅记录）
    Warning, // 警告（行继续处理）
    Error,   // 错误（该阶段结果置空，行继续处理）
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticLevel::Info => write!(f, "INFO"),
            DiagnosticLevel::Warning => write!(f, "WARNING"),
            DiagnosticLevel::Error => write!(f, "ERROR"),
        }
    }
}

// ==========================================
// 处理阶段 (Pipeline Stage)
// ==========================================
// 行内严格线性: 牌号 → 镀层/表面处理 → 余量清理 → 标记 → 尺寸
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineStage {
    Configuration,
    Input,
    Grade,
    Coating,
    Treatment,
    Remainder,
    Dimension,
    Tolerance,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineStage::Configuration => write!(f, "CONFIGURATION"),
            PipelineStage::Input => write!(f, "INPUT"),
            PipelineStage::Grade => write!(f, "GRADE"),
            PipelineStage::Coating => write!(f, "COATING"),
            PipelineStage::Treatment => write!(f, "TREATMENT"),
            PipelineStage::Remainder => write!(f, "REMAINDER"),
            PipelineStage::Dimension => write!(f, "DIMENSION"),
            PipelineStage::Tolerance => write!(f, "TOLERANCE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_policy_parse() {
        assert_eq!(
            "longest_match".parse::<CoatingConflictPolicy>().unwrap(),
            CoatingConflictPolicy::LongestMatch
        );
        assert_eq!(
            " REJECT_CONFLICTING ".parse::<CoatingConflictPolicy>().unwrap(),
            CoatingConflictPolicy::RejectConflicting
        );
        assert!("first_wins".parse::<CoatingConflictPolicy>().is_err());
    }

    #[test]
    fn test_conflict_policy_default_and_display() {
        let policy = CoatingConflictPolicy::default();
        assert_eq!(policy, CoatingConflictPolicy::LastRuleWins);
        assert_eq!(policy.to_string(), "LAST_RULE_WINS");
    }

    #[test]
    fn test_serde_screaming_snake_case() {
        let json = serde_json::to_string(&DiagnosticLevel::Warning).unwrap();
        assert_eq!(json, "\"WARNING\"");
        let stage: PipelineStage = serde_json::from_str("\"TOLERANCE\"").unwrap();
        assert_eq!(stage, PipelineStage::Tolerance);
    }
}
