// ==========================================
// 钢材物料短文本解析 - 知识库 (Schema) 实体
// ==========================================
// 职责: 牌号条目 / 镀层规则条目 / 只读知识库
// 红线: 知识库加载后只读，任何匹配器不得修改
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// GradeEntry - 牌号条目
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeEntry {
    pub base_grade: String, // 标准牌号，如 "CR210LA"
}

// ==========================================
// CoatingRule - 镀层/表面处理规则
// ==========================================
// 一条规则可把一个前缀与多个镀层代码组合（匹配时做笛卡尔展开）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoatingRule {
    pub symbol: String,         // 连接符，如 "+"
    pub prefix_coating: String, // 镀层前缀，如 "Z" / "GI"
    pub coating: Vec<String>,   // 镀层量代码，如 "100" / "40/40"
    pub treatment: Vec<String>, // 表面处理代码，如 "MB" / "UO"
}

/// 规则展开后的一个候选写法
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoatingPermutation {
    pub text: String,            // 展开文本，如 "Z100"
    pub coating: Option<String>, // 对应镀层代码（仅前缀规则时为 None）
}

impl CoatingRule {
    /// 展开为 prefix + coating 的全部写法
    ///
    /// - 有前缀且有镀层列表: 每个镀层代码前拼接前缀
    /// - 仅有镀层列表: 镀层代码本身
    /// - 仅有前缀: 前缀本身
    pub fn permutations(&self) -> Vec<CoatingPermutation> {
        let prefix = self.prefix_coating.trim();
        let coatings: Vec<&String> = self
            .coating
            .iter()
            .filter(|c| !c.trim().is_empty())
            .collect();

        if !prefix.is_empty() && !coatings.is_empty() {
            coatings
                .into_iter()
                .map(|c| CoatingPermutation {
                    text: format!("{}{}", prefix, c.trim()),
                    coating: Some(c.trim().to_string()),
                })
                .collect()
        } else if !coatings.is_empty() {
            coatings
                .into_iter()
                .map(|c| CoatingPermutation {
                    text: c.trim().to_string(),
                    coating: Some(c.trim().to_string()),
                })
                .collect()
        } else if !prefix.is_empty() {
            vec![CoatingPermutation {
                text: prefix.to_string(),
                coating: None,
            }]
        } else {
            Vec::new()
        }
    }
}

// ==========================================
// SchemaEntry - 知识库条目（带标签的变体）
// ==========================================
// 由 schema_loader 按字段逐项识别构建
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaEntry {
    Grade(GradeEntry),
    Coating(CoatingRule),
}

// ==========================================
// KnowledgeBase - 只读知识库
// ==========================================
// 顺序即 schema 文件中的顺序（镀层冲突策略 LastRuleWins 依赖该顺序）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnowledgeBase {
    grades: Vec<GradeEntry>,
    coating_rules: Vec<CoatingRule>,
}

impl KnowledgeBase {
    /// 由条目列表构建知识库（保持原始顺序）
    pub fn from_entries(entries: Vec<SchemaEntry>) -> Self {
        let mut grades = Vec::new();
        let mut coating_rules = Vec::new();
        for entry in entries {
            match entry {
                SchemaEntry::Grade(g) => grades.push(g),
                SchemaEntry::Coating(r) => coating_rules.push(r),
            }
        }
        Self {
            grades,
            coating_rules,
        }
    }

    /// 合并另一个知识库（追加在后，用于牌号文件 + 镀层文件分开维护的场景）
    pub fn merge(mut self, other: KnowledgeBase) -> Self {
        self.grades.extend(other.grades);
        self.coating_rules.extend(other.coating_rules);
        self
    }

    pub fn grades(&self) -> &[GradeEntry] {
        &self.grades
    }

    pub fn coating_rules(&self) -> &[CoatingRule] {
        &self.coating_rules
    }

    /// 全部牌号字符串（schema 顺序）
    pub fn grade_codes(&self) -> Vec<&str> {
        self.grades.iter().map(|g| g.base_grade.as_str()).collect()
    }
}
