// ==========================================
// 钢材物料短文本解析 - 文件解析器实现
// ==========================================
// 阶段 0: 文件读取与解析（不做表头识别，保留全部行）
// 支持: Excel (.xlsx/.xls/.xlsm/.ods) / CSV (.csv)
// ==========================================

use crate::domain::table::Cell;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::traits::{FileParser, RawGrid};
use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use std::fs::File;
use std::path::Path;
use tracing::debug;

const EXCEL_EXTENSIONS: [&str; 4] = ["xlsx", "xls", "xlsm", "ods"];

fn ensure_exists(path: &Path) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_to_grid(&self, file_path: &Path) -> ImportResult<RawGrid> {
        let path = file_path;
        ensure_exists(path)?;

        // 检查扩展名（无扩展名的临时文件放行）
        if path.extension().is_some() && extension_of(path) != "csv" {
            return Err(ImportError::UnsupportedFormat(extension_of(path)));
        }

        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(false) // 表头由清洗阶段确定
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        // 按字节读取，非 UTF-8 内容做有损转换
        let mut grid = Vec::new();
        for result in reader.byte_records() {
            let record = result?;
            let row: Vec<Cell> = record
                .iter()
                .map(|raw| {
                    let value = String::from_utf8_lossy(raw);
                    let value = value.trim().trim_start_matches('\u{feff}');
                    if value.is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(value.to_string())
                    }
                })
                .collect();
            grid.push(row);
        }

        debug!(rows = grid.len(), "CSV 解析完成");
        Ok(grid)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl ExcelParser {
    fn convert(cell: &Data) -> Cell {
        match cell {
            Data::Empty => Cell::Empty,
            Data::String(s) => {
                if s.trim().is_empty() {
                    Cell::Empty
                } else {
                    Cell::Text(s.trim().to_string())
                }
            }
            Data::Float(f) => Cell::Number(*f),
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Bool(b) => Cell::Bool(*b),
            other => Cell::Text(other.to_string()),
        }
    }
}

impl FileParser for ExcelParser {
    fn parse_to_grid(&self, file_path: &Path) -> ImportResult<RawGrid> {
        let path = file_path;
        ensure_exists(path)?;

        let ext = extension_of(path);
        if !EXCEL_EXTENSIONS.contains(&ext.as_str()) {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut workbook = open_workbook_auto(path)?;

        // 读取第一个 sheet
        let sheet_names = workbook.sheet_names();
        let Some(sheet_name) = sheet_names.first().cloned() else {
            return Err(ImportError::ExcelParseError(
                "Excel 文件无工作表".to_string(),
            ));
        };

        let range = workbook.worksheet_range(&sheet_name)?;
        if range.is_empty() {
            return Err(ImportError::EmptySheet(sheet_name));
        }

        let grid: RawGrid = range
            .rows()
            .map(|row| row.iter().map(Self::convert).collect())
            .collect();

        debug!(sheet = %sheet_name, rows = grid.len(), "Excel 解析完成");
        Ok(grid)
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl FileParser for UniversalFileParser {
    fn parse_to_grid(&self, file_path: &Path) -> ImportResult<RawGrid> {
        let ext = extension_of(file_path);
        match ext.as_str() {
            "csv" => CsvParser.parse_to_grid(file_path),
            e if EXCEL_EXTENSIONS.contains(&e) => ExcelParser.parse_to_grid(file_path),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_csv_parser_keeps_all_rows() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "Anfrage Nr. 4711,").unwrap();
        writeln!(temp_file, "Material,Menge").unwrap();
        writeln!(temp_file, "CR4 Z100MB 1.3x945,12").unwrap();

        let grid = CsvParser.parse_to_grid(temp_file.path()).unwrap();

        assert_eq!(grid.len(), 3);
        assert_eq!(grid[0][1], Cell::Empty);
        assert_eq!(grid[1][0], Cell::from("Material"));
        assert_eq!(grid[2][0], Cell::from("CR4 Z100MB 1.3x945"));
    }

    #[test]
    fn test_csv_parser_flexible_rows() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "a,b,c").unwrap();
        writeln!(temp_file, "1").unwrap();

        let grid = CsvParser.parse_to_grid(temp_file.path()).unwrap();
        assert_eq!(grid[0].len(), 3);
        assert_eq!(grid[1].len(), 1);
    }

    #[test]
    fn test_csv_parser_file_not_found() {
        let result = CsvParser.parse_to_grid(Path::new("non_existent.csv"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_universal_parser_rejects_unknown_extension() {
        let temp_file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        let result = UniversalFileParser.parse_to_grid(temp_file.path());
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(ext)) if ext == "txt"));
    }

    #[test]
    fn test_universal_parser_dispatches_csv() {
        let mut temp_file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(temp_file, "Material").unwrap();
        writeln!(temp_file, "DX51D").unwrap();

        let grid = UniversalFileParser.parse_to_grid(temp_file.path()).unwrap();
        assert_eq!(grid.len(), 2);
    }

    #[test]
    fn test_excel_cell_conversion() {
        assert_eq!(ExcelParser::convert(&Data::Float(945.0)), Cell::Number(945.0));
        assert_eq!(ExcelParser::convert(&Data::Int(3)), Cell::Number(3.0));
        assert_eq!(ExcelParser::convert(&Data::String("  ".into())), Cell::Empty);
        assert_eq!(
            ExcelParser::convert(&Data::String(" CR4 ".into())),
            Cell::from("CR4")
        );
    }
}
