// ==========================================
// 钢材物料短文本解析 - 表格清洗器实现
// ==========================================
// 职责: 缺失值标准化 / 稀疏行丢弃 / 表头提升 / 全空行列丢弃
// 说明: 询价单常带标题行、备注行，真实表头位于首个"足够满"的行
// ==========================================

use crate::domain::table::{Cell, RawTable};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::traits::{DataCleaner, RawGrid};
use tracing::debug;

/// 文本形式的缺失值标记
const MISSING_MARKERS: [&str; 4] = ["nan", "n/a", "none", "null"];

pub struct SheetCleaner {
    sparse_row_threshold: f64,
}

impl SheetCleaner {
    pub fn new(sparse_row_threshold: f64) -> Self {
        Self {
            sparse_row_threshold,
        }
    }

    /// 非空单元格数不超过该值的行被视为稀疏行
    fn min_non_empty(&self, column_count: usize) -> usize {
        (column_count as f64 * (1.0 - self.sparse_row_threshold)).floor() as usize
    }
}

impl Default for SheetCleaner {
    fn default() -> Self {
        Self::new(0.7)
    }
}

impl DataCleaner for SheetCleaner {
    fn normalize_missing(&self, cell: Cell) -> Cell {
        match cell {
            Cell::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty()
                    || MISSING_MARKERS
                        .iter()
                        .any(|m| trimmed.eq_ignore_ascii_case(m))
                {
                    Cell::Empty
                } else {
                    Cell::Text(trimmed.to_string())
                }
            }
            Cell::Number(n) if n.is_nan() => Cell::Empty,
            other => other,
        }
    }

    fn clean(&self, grid: RawGrid) -> ImportResult<RawTable> {
        let column_count = grid.iter().map(Vec::len).max().unwrap_or(0);
        let min_non_empty = self.min_non_empty(column_count);
        let total_rows = grid.len();

        // 1+2. 缺失值标准化、补齐列数并丢弃稀疏行
        let mut rows: Vec<Vec<Cell>> = grid
            .into_iter()
            .map(|row| {
                let mut cells: Vec<Cell> =
                    row.into_iter().map(|c| self.normalize_missing(c)).collect();
                cells.resize(column_count, Cell::Empty);
                cells
            })
            .filter(|row| row.iter().filter(|c| !c.is_empty()).count() > min_non_empty)
            .collect();

        if rows.is_empty() {
            return Err(ImportError::EmptySheet(
                "清洗后无可用行（未找到表头）".to_string(),
            ));
        }

        // 3. 首行提升为表头
        let header_row = rows.remove(0);
        let headers: Vec<String> = header_row
            .iter()
            .enumerate()
            .map(|(idx, cell)| cell.to_text().unwrap_or_else(|| format!("Unnamed: {}", idx)))
            .collect();

        // 4. 丢弃全空列（按数据行判断）
        let keep: Vec<usize> = (0..column_count)
            .filter(|&col| rows.iter().any(|row| !row[col].is_empty()))
            .collect();

        let headers: Vec<String> = keep.iter().map(|&c| headers[c].clone()).collect();
        let rows: Vec<Vec<Cell>> = rows
            .into_iter()
            .map(|row| keep.iter().map(|&c| row[c].clone()).collect::<Vec<Cell>>())
            .filter(|row| row.iter().any(|c| !c.is_empty()))
            .collect();

        debug!(
            total_rows,
            kept_rows = rows.len(),
            columns = headers.len(),
            "表格清洗完成"
        );
        Ok(RawTable::new(headers, rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_row(values: &[&str]) -> Vec<Cell> {
        values
            .iter()
            .map(|v| if v.is_empty() { Cell::Empty } else { Cell::from(*v) })
            .collect()
    }

    #[test]
    fn test_normalize_missing_markers() {
        let cleaner = SheetCleaner::default();
        for marker in ["nan", "NaN", "N/A", "None", "", "  "] {
            assert_eq!(cleaner.normalize_missing(Cell::from(marker)), Cell::Empty);
        }
        assert_eq!(cleaner.normalize_missing(Cell::Number(f64::NAN)), Cell::Empty);
        assert_eq!(
            cleaner.normalize_missing(Cell::from(" CR4 ")),
            Cell::from("CR4")
        );
        assert_eq!(cleaner.normalize_missing(Cell::Number(1.5)), Cell::Number(1.5));
    }

    #[test]
    fn test_title_rows_dropped_and_header_promoted() {
        // 5 列: 保留非空数 > floor(5 × 0.3) = 1 的行
        let grid = vec![
            text_row(&["Anfrage 4711", "", "", "", ""]),
            text_row(&["", "", "", "", ""]),
            text_row(&["Pos", "Material", "Menge", "Einheit", ""]),
            text_row(&["1", "CR4 Z100MB 1.3x945", "12", "t", ""]),
            text_row(&["2", "nan", "N/A", "", ""]),
            text_row(&["3", "DX51D", "5", "t", ""]),
        ];

        let table = SheetCleaner::default().clean(grid).unwrap();

        assert_eq!(table.headers, vec!["Pos", "Material", "Menge", "Einheit"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[0][1], Cell::from("CR4 Z100MB 1.3x945"));
        assert_eq!(table.rows[1][0], Cell::from("3"));
    }

    #[test]
    fn test_empty_header_gets_placeholder_name() {
        let grid = vec![
            text_row(&["Material", ""]),
            text_row(&["CR4", "x"]),
        ];
        let table = SheetCleaner::new(1.0).clean(grid).unwrap();
        assert_eq!(table.headers, vec!["Material", "Unnamed: 1"]);
    }

    #[test]
    fn test_all_rows_sparse_is_error() {
        let grid = vec![text_row(&["a", "", "", ""]), text_row(&["", "", "", ""])];
        let result = SheetCleaner::default().clean(grid);
        assert!(matches!(result, Err(ImportError::EmptySheet(_))));
    }
}
