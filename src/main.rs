// ==========================================
// 钢材物料短文本解析 - 命令行入口
// ==========================================
// 用法:
//   steel-material-extractor <schema.json>[,<schema2.json>] <input.csv|xlsx>
//                            [牌号字段|-] [尺寸字段|-] [output.csv]
// 说明:
//   - 牌号字段为 "-" 或缺省时自动识别
//   - 尺寸字段为 "-" 或缺省时与牌号字段相同
//   - 未指定输出文件时结果 CSV 写到 stdout，日志与汇总写到 stderr
// ==========================================

use anyhow::{bail, Context};
use std::path::PathBuf;
use std::sync::Arc;
use steel_material_extractor::api::{ExtractionApi, ExtractionRequest};
use steel_material_extractor::config::{ConfigManager, ExtractionConfigReader, StaticConfig};
use steel_material_extractor::db::get_default_db_path;
use steel_material_extractor::export::write_report;
use steel_material_extractor::i18n::{self, t, t_with_args};
use steel_material_extractor::repository::RunStatsRepository;
use steel_material_extractor::{logging, DiagnosticLevel, VERSION};

/// 可选位置参数（"-" 视为未指定）
fn optional_arg(args: &[String], idx: usize) -> Option<String> {
    args.get(idx)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && s != "-")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    i18n::init_from_env();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 2 {
        eprintln!("{}", t("cli.usage"));
        bail!("参数不足");
    }

    eprintln!("{}", t_with_args("cli.banner", &[("version", VERSION)]));

    let schema_paths: Vec<PathBuf> = args[0]
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect();

    // 配置与统计共用一个数据库；打不开时退回默认配置且不记录统计
    let db_path = get_default_db_path();
    let fallback: Arc<dyn ExtractionConfigReader> = Arc::new(StaticConfig::default());
    let (config, stats_repo) =
        match (ConfigManager::new(&db_path), RunStatsRepository::new(&db_path)) {
            (Ok(manager), Ok(repo)) => {
                let config: Arc<dyn ExtractionConfigReader> = Arc::new(manager);
                (config, Some(Arc::new(repo)))
            }
            (Err(e), _) => {
                tracing::warn!(db_path = %db_path, error = %e, "配置库不可用，使用默认配置");
                (fallback, None)
            }
            (_, Err(e)) => {
                tracing::warn!(db_path = %db_path, error = %e, "统计库不可用，使用默认配置");
                (fallback, None)
            }
        };

    let mut api = ExtractionApi::from_schema_files(&schema_paths, config)
        .context("知识库加载失败")?;
    if let Some(repo) = stats_repo {
        api = api.with_stats_repo(repo);
    }

    let request = ExtractionRequest {
        input_path: PathBuf::from(&args[1]),
        grade_field: optional_arg(&args, 2),
        dimension_field: optional_arg(&args, 3),
        supplier: std::env::var("STEEL_EXTRACTOR_SUPPLIER").ok(),
        output_path: optional_arg(&args, 4).map(PathBuf::from),
    };

    let response = api
        .process_file(&request)
        .await
        .with_context(|| format!("处理失败: {}", request.input_path.display()))?;

    if response.grade_field_detected {
        eprintln!(
            "{}",
            t_with_args("cli.grade_column_detected", &[("column", &response.grade_field)])
        );
    }

    let report = &response.report;
    for diagnostic in &report.diagnostics {
        if diagnostic.level >= DiagnosticLevel::Warning {
            let row = diagnostic
                .row
                .map(|r| r.to_string())
                .unwrap_or_else(|| "-".to_string());
            eprintln!(
                "[{}] {} #{}: {}",
                diagnostic.level, diagnostic.stage, row, diagnostic.message
            );
        }
    }

    let summary = &report.summary;
    eprintln!(
        "{}",
        t_with_args(
            "cli.summary",
            &[
                ("total", &summary.total_rows.to_string()),
                ("grade_found", &summary.grade_found.to_string()),
                ("no_grade", &summary.no_grade_found.to_string()),
                ("highlighted", &summary.highlighted.to_string()),
                ("skipped", &summary.skipped.to_string()),
            ],
        )
    );

    match &request.output_path {
        Some(path) => {
            let path = path.display().to_string();
            eprintln!("{}", t_with_args("cli.written", &[("path", &path)]));
        }
        None => write_report(report, std::io::stdout().lock()).context("结果输出失败")?,
    }

    Ok(())
}
