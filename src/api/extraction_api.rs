// ==========================================
// 钢材物料短文本解析 - 提取API
// ==========================================
// 职责: 文件 → 清洗 → (牌号列识别) → 并行提取 → 统计落库 → 导出
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::ExtractionConfigReader;
use crate::domain::report::{DashboardStats, RunRecord, RunReport};
use crate::domain::schema::KnowledgeBase;
use crate::domain::table::{FieldSelection, RawTable};
use crate::engine::{ExtractionOrchestrator, GradeColumnDetector};
use crate::export::write_report_to_path;
use crate::importer::{load_schema_files, DataCleaner, FileParser, SheetCleaner, UniversalFileParser};
use crate::repository::RunStatsRepository;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};

/// 提取请求
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionRequest {
    /// 输入文件（.csv/.xlsx/.xls）
    pub input_path: PathBuf,
    /// 牌号来源列（None 时自动识别）
    pub grade_field: Option<String>,
    /// 尺寸来源列（None 时与牌号列相同）
    pub dimension_field: Option<String>,
    /// 供应商（统计用，可选）
    pub supplier: Option<String>,
    /// 导出路径（可选）
    pub output_path: Option<PathBuf>,
}

/// 提取响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResponse {
    /// 运行报告（逐行结果 + 诊断 + 汇总）
    pub report: RunReport,
    /// 实际使用的牌号列
    pub grade_field: String,
    /// 实际使用的尺寸列
    pub dimension_field: String,
    /// 牌号列是否为自动识别
    pub grade_field_detected: bool,
    /// 统计是否已落库
    pub stats_recorded: bool,
    /// 耗时（毫秒）
    pub elapsed_ms: i64,
}

/// 提取API
pub struct ExtractionApi {
    kb: Arc<KnowledgeBase>,
    config: Arc<dyn ExtractionConfigReader>,
    stats_repo: Option<Arc<RunStatsRepository>>,
}

impl ExtractionApi {
    /// 创建新的ExtractionApi实例
    pub fn new(kb: Arc<KnowledgeBase>, config: Arc<dyn ExtractionConfigReader>) -> Self {
        Self {
            kb,
            config,
            stats_repo: None,
        }
    }

    /// 从知识库文件创建（多个文件按顺序合并）
    pub fn from_schema_files(
        schema_paths: &[PathBuf],
        config: Arc<dyn ExtractionConfigReader>,
    ) -> ApiResult<Self> {
        if schema_paths.is_empty() {
            return Err(ApiError::InvalidInput("未指定知识库文件".to_string()));
        }
        let kb = load_schema_files(schema_paths)?;
        Ok(Self::new(Arc::new(kb), config))
    }

    /// 启用运行统计落库
    pub fn with_stats_repo(mut self, repo: Arc<RunStatsRepository>) -> Self {
        self.stats_repo = Some(repo);
        self
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.kb
    }

    /// 处理单个文件
    ///
    /// # 参数
    /// - request: 输入文件、字段选择、供应商、导出路径
    ///
    /// # 返回
    /// - Ok(ExtractionResponse): 运行报告及实际使用的字段
    /// - Err(ApiError): 文件/配置错误（任何行处理前中止）
    #[instrument(skip(self, request), fields(input = %request.input_path.display()))]
    pub async fn process_file(&self, request: &ExtractionRequest) -> ApiResult<ExtractionResponse> {
        let started = Instant::now();
        let settings = self.config.load_settings().await?;

        // 1. 解析 + 清洗（阻塞 IO，放入 blocking 线程池）
        let input_path = request.input_path.clone();
        let sparse_row_threshold = settings.sparse_row_threshold;
        let table = tokio::task::spawn_blocking(move || -> ApiResult<RawTable> {
            let grid = UniversalFileParser.parse_to_grid(&input_path)?;
            Ok(SheetCleaner::new(sparse_row_threshold).clean(grid)?)
        })
        .await
        .map_err(|e| ApiError::InternalError(format!("文件解析任务失败: {}", e)))??;

        // 2. 字段选择
        let (grade_field, grade_field_detected) = match &request.grade_field {
            Some(field) => (field.clone(), false),
            None => {
                let detector =
                    GradeColumnDetector::new(&self.kb, settings.header_detection_threshold);
                (detector.detect(&table)?, true)
            }
        };
        let dimension_field = request
            .dimension_field
            .clone()
            .unwrap_or_else(|| grade_field.clone());
        let selection = FieldSelection {
            grade_field: Some(grade_field.clone()),
            dimension_field: Some(dimension_field.clone()),
        };

        // 3. 并行提取
        let orchestrator = Arc::new(ExtractionOrchestrator::new(Arc::clone(&self.kb), settings));
        let report = orchestrator.run_parallel(Arc::new(table), selection).await?;

        // 4. 统计落库
        let stats_recorded = self.record_stats(request, &report);

        // 5. 导出
        if let Some(output) = &request.output_path {
            write_report_to_path(&report, output)?;
        }

        let elapsed_ms = started.elapsed().as_millis() as i64;
        info!(
            run_id = %report.run_id,
            rows = report.summary.total_rows,
            no_grade = report.summary.no_grade_found,
            highlighted = report.summary.highlighted,
            elapsed_ms,
            "文件处理完成"
        );

        Ok(ExtractionResponse {
            report,
            grade_field,
            dimension_field,
            grade_field_detected,
            stats_recorded,
            elapsed_ms,
        })
    }

    /// 统计写入失败不影响提取结果，仅告警
    fn record_stats(&self, request: &ExtractionRequest, report: &RunReport) -> bool {
        let Some(repo) = &self.stats_repo else {
            return false;
        };
        let file_name = request
            .input_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let record = RunRecord::from_report(report, &file_name, request.supplier.as_deref());
        match repo.insert_run(&record) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, run_id = %report.run_id, "运行统计写入失败");
                false
            }
        }
    }

    /// 历史统计汇总
    pub fn dashboard_stats(&self) -> ApiResult<DashboardStats> {
        match &self.stats_repo {
            Some(repo) => Ok(repo.dashboard_stats()?),
            None => Ok(DashboardStats::default()),
        }
    }

    /// 最近的运行记录
    pub fn recent_runs(&self, limit: usize) -> ApiResult<Vec<RunRecord>> {
        let limit = limit.clamp(1, 100);
        match &self.stats_repo {
            Some(repo) => Ok(repo.list_recent_runs(limit)?),
            None => Ok(Vec::new()),
        }
    }

    /// 按 run_id 查询运行记录
    pub fn run_record(&self, run_id: &str) -> ApiResult<RunRecord> {
        let repo = self
            .stats_repo
            .as_ref()
            .ok_or_else(|| ApiError::NotFound(format!("运行记录(run_id={})", run_id)))?;
        repo.find_run(run_id)?
            .ok_or_else(|| ApiError::NotFound(format!("运行记录(run_id={})", run_id)))
    }

    /// 清空历史统计
    pub fn reset_stats(&self) -> ApiResult<usize> {
        match &self.stats_repo {
            Some(repo) => Ok(repo.reset()?),
            None => Ok(0),
        }
    }
}
