// ==========================================
// 钢材物料短文本解析 - 提取结果实体
// ==========================================
// 职责: 各匹配器输出 + 行级结构化结果
// 红线: ExtractionResult 每行新建，不跨行共享
// ==========================================

use crate::domain::table::Cell;
use crate::domain::types::MatchKind;
use serde::{Deserialize, Serialize};

// ==========================================
// GradeMatch - 牌号匹配结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeMatch {
    pub grade: String,
    pub kind: MatchKind,
}

// ==========================================
// CoatingOutcome - 镀层/表面处理匹配结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CoatingOutcome {
    pub grade_with_prefix: Option<String>, // 牌号 + 连接符 + 前缀，如 "CR4+Z"
    pub coating: Option<String>,           // 镀层代码，如 "100"
    pub treatment: Option<String>,         // 表面处理（已做别名归一），如 "MBO"
    pub unmatched_remainder: String,       // 未识别余量
    pub conflicting_needles: Vec<String>,  // 未被选中的其他镀层命中（冲突时非空）
}

// ==========================================
// Dimensions - 尺寸（逗号小数格式字符串）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Dimensions {
    pub thickness: Option<String>,
    pub width: Option<String>,
    pub length: Option<String>,
}

// ==========================================
// Tolerances - 公差
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tolerances {
    pub thickness: Option<String>,
    pub width: Option<String>,
    pub length: Option<String>,
}

impl Tolerances {
    pub fn any(&self) -> bool {
        self.thickness.is_some() || self.width.is_some() || self.length.is_some()
    }
}

// ==========================================
// ExtractionResult - 行级结构化结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub grade: Option<String>,             // 牌号
    pub grade_designation: Option<String>, // 牌号 + 镀层前缀（如 "CR4+Z"）
    pub coating: Option<String>,           // 镀层
    pub treatment: Option<String>,         // 表面处理
    pub thickness: Option<String>,         // 厚度
    pub width: Option<String>,             // 宽度
    pub length: Option<String>,            // 长度
    pub thickness_tolerance: Option<String>,
    pub width_tolerance: Option<String>,
    pub length_tolerance: Option<String>,
    pub unmatched_remainder: String,       // 未识别余量
    pub highlight_unmatched: bool,         // 黄色标记: 有牌号但余量有意义
    pub no_grade_found: bool,              // 红色标记: 未找到牌号
}

impl ExtractionResult {
    pub fn apply_dimensions(&mut self, dims: Dimensions) {
        self.thickness = dims.thickness;
        self.width = dims.width;
        self.length = dims.length;
    }

    pub fn apply_tolerances(&mut self, tols: Tolerances) {
        self.thickness_tolerance = tols.thickness;
        self.width_tolerance = tols.width;
        self.length_tolerance = tols.length;
    }

    pub fn has_tolerance(&self) -> bool {
        self.thickness_tolerance.is_some()
            || self.width_tolerance.is_some()
            || self.length_tolerance.is_some()
    }
}

// ==========================================
// RowOutput - 原始字段 + 提取结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowOutput {
    pub row_index: usize,
    pub original: Vec<Cell>,
    pub result: ExtractionResult,
}
