// ==========================================
// 钢材物料短文本解析 - 结果导出 (CSV)
// ==========================================
// 列顺序: 原始列 → 尺寸/牌号/镀层/表面处理 → 公差（仅当本批有公差）
//         → 未识别余量 → 黄色/红色复核标记
// ==========================================

use crate::domain::extraction::RowOutput;
use crate::domain::report::RunReport;
use crate::export::error::ExportResult;
use csv::WriterBuilder;
use std::io::Write;
use std::path::Path;
use tracing::info;

pub const COL_THICKNESS: &str = "Dicke_";
pub const COL_WIDTH: &str = "Breit_";
pub const COL_LENGTH: &str = "Länge_";
pub const COL_GRADE: &str = "Güte_";
pub const COL_COATING: &str = "Auflage_";
pub const COL_TREATMENT: &str = "Oberfläche_";
pub const COL_THICKNESS_TOL: &str = "Dickentoleranz_";
pub const COL_WIDTH_TOL: &str = "Breitentoleranz_";
pub const COL_LENGTH_TOL: &str = "Längentoleranz_";
pub const COL_REMAINDER: &str = "Unmatched_Remainder_";
pub const COL_HIGHLIGHT: &str = "Highlight_Row_";
pub const COL_RED_HIGHLIGHT: &str = "Red_Highlight_Row_";

/// 导出表头
pub fn output_headers(report: &RunReport) -> Vec<String> {
    let mut headers = report.headers.clone();
    headers.extend(
        [
            COL_THICKNESS,
            COL_WIDTH,
            COL_LENGTH,
            COL_GRADE,
            COL_COATING,
            COL_TREATMENT,
        ]
        .iter()
        .map(|s| s.to_string()),
    );
    if report.has_tolerances {
        headers.extend(
            [COL_THICKNESS_TOL, COL_WIDTH_TOL, COL_LENGTH_TOL]
                .iter()
                .map(|s| s.to_string()),
        );
    }
    headers.extend(
        [COL_REMAINDER, COL_HIGHLIGHT, COL_RED_HIGHLIGHT]
            .iter()
            .map(|s| s.to_string()),
    );
    headers
}

fn flag(value: bool) -> String {
    if value { "True" } else { "False" }.to_string()
}

/// 单行导出记录
fn output_record(row: &RowOutput, column_count: usize, has_tolerances: bool) -> Vec<String> {
    let r = &row.result;
    let text = |v: &Option<String>| v.clone().unwrap_or_default();

    let mut record: Vec<String> = (0..column_count)
        .map(|i| row.original.get(i).map(|c| c.to_string()).unwrap_or_default())
        .collect();

    record.push(text(&r.thickness));
    record.push(text(&r.width));
    record.push(text(&r.length));
    // 有镀层前缀时输出 "牌号+前缀"
    let grade = if r.grade_designation.is_some() {
        &r.grade_designation
    } else {
        &r.grade
    };
    record.push(text(grade));
    record.push(text(&r.coating));
    record.push(text(&r.treatment));
    if has_tolerances {
        record.push(text(&r.thickness_tolerance));
        record.push(text(&r.width_tolerance));
        record.push(text(&r.length_tolerance));
    }
    record.push(r.unmatched_remainder.clone());
    record.push(flag(r.highlight_unmatched));
    record.push(flag(r.no_grade_found));
    record
}

/// 写出到任意 Writer
pub fn write_report<W: Write>(report: &RunReport, writer: W) -> ExportResult<()> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(output_headers(report))?;
    for row in &report.rows {
        wtr.write_record(output_record(row, report.headers.len(), report.has_tolerances))?;
    }
    wtr.flush()?;
    Ok(())
}

/// 写出到文件
pub fn write_report_to_path(report: &RunReport, path: &Path) -> ExportResult<()> {
    let file = std::fs::File::create(path)?;
    write_report(report, file)?;
    info!(path = %path.display(), rows = report.rows.len(), "结果已导出");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::extraction::ExtractionResult;
    use crate::domain::report::RunSummary;
    use crate::domain::table::Cell;

    fn report(has_tolerances: bool) -> RunReport {
        RunReport {
            run_id: "run-1".to_string(),
            headers: vec!["Pos".to_string(), "Material".to_string()],
            rows: vec![
                RowOutput {
                    row_index: 0,
                    original: vec![Cell::Number(1.0), Cell::from("C 1,3x945 CR4 Z100MB")],
                    result: ExtractionResult {
                        grade: Some("CR4".to_string()),
                        grade_designation: Some("CR4+Z".to_string()),
                        coating: Some("100".to_string()),
                        treatment: Some("MBO".to_string()),
                        thickness: Some("1,3".to_string()),
                        width: Some("945".to_string()),
                        ..Default::default()
                    },
                },
                RowOutput {
                    row_index: 1,
                    original: vec![Cell::Number(2.0)],
                    result: ExtractionResult {
                        no_grade_found: true,
                        ..Default::default()
                    },
                },
            ],
            diagnostics: vec![],
            summary: RunSummary::default(),
            has_tolerances,
        }
    }

    fn render(report: &RunReport) -> String {
        let mut buf = Vec::new();
        write_report(report, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_headers_without_tolerances() {
        let headers = output_headers(&report(false));
        assert_eq!(headers[2], COL_THICKNESS);
        assert_eq!(headers[5], COL_GRADE);
        assert_eq!(headers[8], COL_REMAINDER);
        assert!(!headers.iter().any(|h| h == COL_THICKNESS_TOL));
        assert_eq!(headers.len(), 11);
    }

    #[test]
    fn test_headers_with_tolerances() {
        let headers = output_headers(&report(true));
        assert_eq!(headers[8], COL_THICKNESS_TOL);
        assert_eq!(headers.len(), 14);
    }

    #[test]
    fn test_rows_rendered() {
        let out = render(&report(false));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[1],
            "1,\"C 1,3x945 CR4 Z100MB\",\"1,3\",945,,CR4+Z,100,MBO,,False,False"
        );
        assert_eq!(lines[2], "2,,,,,,,,,False,True");
    }
}
