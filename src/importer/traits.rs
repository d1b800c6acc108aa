// ==========================================
// 钢材物料短文本解析 - 导入层 Trait
// ==========================================
// 职责: 定义文件解析 / 表格清洗接口（不包含实现）
// ==========================================

use crate::domain::table::{Cell, RawTable};
use crate::importer::error::ImportResult;
use std::path::Path;

/// 原始单元格网格（首行尚未提升为表头）
pub type RawGrid = Vec<Vec<Cell>>;

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口（阶段 0）
// 实现者: CsvParser, ExcelParser, UniversalFileParser
pub trait FileParser: Send + Sync {
    /// 解析文件为原始单元格网格
    ///
    /// # 参数
    /// - file_path: 文件路径
    ///
    /// # 返回
    /// - Ok(RawGrid): 按源文件顺序的行
    /// - Err: 文件不存在、格式不支持、解析失败
    fn parse_to_grid(&self, file_path: &Path) -> ImportResult<RawGrid>;
}

// ==========================================
// DataCleaner Trait
// ==========================================
// 用途: 表格清洗接口（阶段 1）
// 实现者: SheetCleaner
pub trait DataCleaner: Send + Sync {
    /// 标准化缺失值（"nan"/"N/A"/"None"/空白 → Empty）
    fn normalize_missing(&self, cell: Cell) -> Cell;

    /// 清洗网格并生成表格
    ///
    /// # 处理顺序
    /// 1. 缺失值标准化
    /// 2. 丢弃稀疏行
    /// 3. 首个保留行提升为表头
    /// 4. 丢弃全空列、全空行
    ///
    /// # 返回
    /// - Ok(RawTable): 清洗后的表格
    /// - Err: 清洗后无可用表头
    fn clean(&self, grid: RawGrid) -> ImportResult<RawTable>;
}
