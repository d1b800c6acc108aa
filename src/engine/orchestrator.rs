// ==========================================
// 钢材物料短文本解析 - 提取编排器
// ==========================================
// 用途: 协调各匹配器，逐行生成结构化结果与复核标记
// 行内流程（严格线性，无回退）:
//   牌号 → 镀层/表面处理 → 余量清理 → 显著性标记 → 尺寸/公差
// 红线: 配置错误在处理任何行之前返回；单行问题只记诊断，不中止整批
// ==========================================

use crate::config::settings::ExtractionSettings;
use crate::domain::extraction::{ExtractionResult, RowOutput};
use crate::domain::report::{Diagnostic, RunReport, RunSummary};
use crate::domain::schema::KnowledgeBase;
use crate::domain::table::{FieldSelection, RawTable};
use crate::domain::types::PipelineStage;
use crate::engine::coating_matcher::CoatingTreatmentMatcher;
use crate::engine::dimension_parser::DimensionParser;
use crate::engine::error::ExtractionError;
use crate::engine::grade_matcher::GradeMatcher;
use crate::engine::normalizer::normalize;
use crate::engine::remainder::{is_significant, strip_dimension_tokens};
use crate::i18n::t_with_args;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// 已校验的列位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnPlan {
    grade_col: Option<usize>,
    dimension_col: Option<usize>,
}

/// 一段连续行的处理结果
#[derive(Debug, Default)]
struct ChunkOutput {
    rows: Vec<RowOutput>,
    diagnostics: Vec<Diagnostic>,
    skipped: usize,
}

/// 组合附加符号（小写化 "İ" 等字母时产生，如 U+0307）
fn is_combining_mark(c: char) -> bool {
    matches!(
        c,
        '\u{0300}'..='\u{036F}'
            | '\u{1AB0}'..='\u{1AFF}'
            | '\u{1DC0}'..='\u{1DFF}'
            | '\u{20D0}'..='\u{20FF}'
            | '\u{FE20}'..='\u{FE2F}'
    )
}

/// 去除牌号后的候选文本
///
/// 在归一化文本中定位牌号: 牌号之前的部分去掉字母及其附加符号（保留 'x'，尺寸分隔符），
/// 牌号之后的部分原样保留，两段以空格连接
pub fn reduce_candidate(description: &str, grade: &str) -> String {
    let normalized = normalize(description);
    let needle = normalize(grade);
    let keep = |c: &char| *c == 'x' || !(c.is_alphabetic() || is_combining_mark(*c));

    match normalized.find(needle.as_str()).filter(|_| !needle.is_empty()) {
        Some(idx) => {
            let before: String = normalized[..idx].chars().filter(keep).collect();
            let after = &normalized[idx + needle.len()..];
            format!("{} {}", before, after)
        }
        None => normalized.chars().filter(keep).collect(),
    }
}

// ==========================================
// ExtractionOrchestrator - 提取编排器
// ==========================================
pub struct ExtractionOrchestrator {
    kb: Arc<KnowledgeBase>,
    settings: ExtractionSettings,
    grade_matcher: GradeMatcher,
    coating_matcher: CoatingTreatmentMatcher,
    dimension_parser: DimensionParser,
}

impl ExtractionOrchestrator {
    /// 创建编排器
    ///
    /// # 参数
    /// - kb: 只读知识库（多个编排器/线程共享）
    /// - settings: 提取参数
    pub fn new(kb: Arc<KnowledgeBase>, settings: ExtractionSettings) -> Self {
        Self {
            grade_matcher: GradeMatcher::new(&kb),
            coating_matcher: CoatingTreatmentMatcher::new(&kb, settings.coating_conflict_policy),
            dimension_parser: DimensionParser::new(),
            kb,
            settings,
        }
    }

    pub fn settings(&self) -> &ExtractionSettings {
        &self.settings
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.kb
    }

    // ==========================================
    // 批处理入口
    // ==========================================

    /// 顺序处理整表
    #[instrument(skip(self, table), fields(rows = table.row_count()))]
    pub fn run(
        &self,
        table: &RawTable,
        selection: &FieldSelection,
    ) -> Result<RunReport, ExtractionError> {
        let plan = self.validate(table, selection)?;
        let mut diagnostics = self.configuration_diagnostics(selection);

        let chunk = self.process_range(table, plan, 0, table.row_count());
        diagnostics.extend(chunk.diagnostics);

        Ok(self.build_report(table, chunk.rows, diagnostics, chunk.skipped))
    }

    /// 分块并行处理整表（结果与 run 一致，按行序合并）
    #[instrument(skip(self, table), fields(rows = table.row_count()))]
    pub async fn run_parallel(
        self: Arc<Self>,
        table: Arc<RawTable>,
        selection: FieldSelection,
    ) -> Result<RunReport, ExtractionError> {
        let plan = self.validate(&table, &selection)?;
        let mut diagnostics = self.configuration_diagnostics(&selection);

        let total = table.row_count();
        let chunk_size = self.settings.parallel_chunk_size.max(1);

        let tasks = (0..total).step_by(chunk_size).map(|start| {
            let orchestrator = Arc::clone(&self);
            let table = Arc::clone(&table);
            let end = (start + chunk_size).min(total);
            tokio::task::spawn_blocking(move || {
                orchestrator.process_range(&table, plan, start, end)
            })
        });

        let results = join_all(tasks).await;
        debug!(chunks = results.len(), "并行分块完成");

        let mut rows = Vec::with_capacity(total);
        let mut skipped = 0;
        for result in results {
            let chunk = result.map_err(|e| ExtractionError::TaskFailed(e.to_string()))?;
            rows.extend(chunk.rows);
            diagnostics.extend(chunk.diagnostics);
            skipped += chunk.skipped;
        }

        Ok(self.build_report(&table, rows, diagnostics, skipped))
    }

    // ==========================================
    // 单行处理
    // ==========================================

    /// 处理单条描述（牌号与尺寸取自同一文本）
    pub fn extract_row(&self, description: &str) -> ExtractionResult {
        let mut diagnostics = Vec::new();
        let mut result = ExtractionResult::default();
        self.extract_grade_fields(0, description, &mut result, &mut diagnostics);
        self.extract_dimension_fields(0, description, &mut result, &mut diagnostics);
        result
    }

    fn process_range(
        &self,
        table: &RawTable,
        plan: ColumnPlan,
        start: usize,
        end: usize,
    ) -> ChunkOutput {
        let mut out = ChunkOutput::default();

        for row in start..end {
            let mut result = ExtractionResult::default();

            if let Some(col) = plan.grade_col {
                match table.cell(row, col).as_text() {
                    Some(text) => {
                        self.extract_grade_fields(row, text, &mut result, &mut out.diagnostics)
                    }
                    None => {
                        warn!(row, "描述为空或非文本，跳过牌号提取");
                        out.skipped += 1;
                        out.diagnostics.push(Diagnostic::warning(
                            Some(row),
                            PipelineStage::Input,
                            t_with_args("diagnostic.empty_description", &[("row", &row.to_string())]),
                        ));
                    }
                }
            }

            if let Some(col) = plan.dimension_col {
                if let Some(text) = table.cell(row, col).to_text() {
                    self.extract_dimension_fields(row, &text, &mut result, &mut out.diagnostics);
                }
            }

            out.rows.push(RowOutput {
                row_index: row,
                original: table.rows.get(row).cloned().unwrap_or_default(),
                result,
            });
        }
        out
    }

    fn extract_grade_fields(
        &self,
        row: usize,
        description: &str,
        result: &mut ExtractionResult,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let Some(found) = self.grade_matcher.find_grade(description) else {
            info!(row, "未找到牌号，标记红色");
            result.no_grade_found = true;
            diagnostics.push(Diagnostic::info(
                Some(row),
                PipelineStage::Grade,
                t_with_args("diagnostic.no_grade", &[("text", description)]),
            ));
            return;
        };

        let candidate = reduce_candidate(description, &found.grade);
        debug!(row, grade = %found.grade, kind = %found.kind, candidate = %candidate, "牌号命中");

        let outcome = self
            .coating_matcher
            .extract_coating_treatment(&candidate, Some(&found.grade));

        if !outcome.conflicting_needles.is_empty() {
            let dropped = outcome.conflicting_needles.join(", ");
            let policy = self.coating_matcher.policy().to_string();
            diagnostics.push(Diagnostic::warning(
                Some(row),
                PipelineStage::Coating,
                t_with_args(
                    "diagnostic.coating_conflict",
                    &[("policy", &policy), ("candidates", &dropped)],
                ),
            ));
        }

        let remainder = strip_dimension_tokens(&outcome.unmatched_remainder);
        let highlight = is_significant(&remainder, &self.settings);
        if highlight {
            info!(row, remainder = %remainder, "余量有意义，标记复核");
            diagnostics.push(Diagnostic::info(
                Some(row),
                PipelineStage::Remainder,
                t_with_args("diagnostic.unmatched_remainder", &[("remainder", &remainder)]),
            ));
        }

        result.grade = Some(found.grade);
        result.grade_designation = outcome.grade_with_prefix;
        result.coating = outcome.coating;
        result.treatment = outcome.treatment;
        result.unmatched_remainder = remainder;
        result.highlight_unmatched = highlight;
    }

    fn extract_dimension_fields(
        &self,
        row: usize,
        text: &str,
        result: &mut ExtractionResult,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        match self.dimension_parser.try_parse_dimensions(text) {
            Ok(dims) => result.apply_dimensions(dims),
            Err(e) => {
                warn!(row, error = %e, "尺寸解析失败");
                diagnostics.push(Diagnostic::error(
                    Some(row),
                    PipelineStage::Dimension,
                    t_with_args("diagnostic.dimension_failed", &[("error", &e.to_string())]),
                ));
            }
        }
        result.apply_tolerances(self.dimension_parser.extract_tolerances(text));
    }

    // ==========================================
    // 校验与汇总
    // ==========================================

    fn validate(
        &self,
        table: &RawTable,
        selection: &FieldSelection,
    ) -> Result<ColumnPlan, ExtractionError> {
        let resolve = |field: &Option<String>| -> Result<Option<usize>, ExtractionError> {
            match field {
                None => Ok(None),
                Some(name) => table.column_index(name).map(Some).ok_or_else(|| {
                    ExtractionError::MissingField {
                        field: name.clone(),
                        available: table.headers.clone(),
                    }
                }),
            }
        };

        let plan = ColumnPlan {
            grade_col: resolve(&selection.grade_field)?,
            dimension_col: resolve(&selection.dimension_field)?,
        };

        if plan.grade_col.is_some() && self.kb.grades().is_empty() {
            return Err(ExtractionError::EmptyKnowledgeBase);
        }
        Ok(plan)
    }

    fn configuration_diagnostics(&self, selection: &FieldSelection) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        if selection.grade_field.is_none() {
            warn!("未配置牌号字段，跳过牌号/镀层/表面处理提取");
            out.push(Diagnostic::warning(
                None,
                PipelineStage::Configuration,
                t_with_args("diagnostic.grade_field_unset", &[]),
            ));
        }
        if selection.dimension_field.is_none() {
            warn!("未配置尺寸字段，跳过尺寸/公差提取");
            out.push(Diagnostic::warning(
                None,
                PipelineStage::Configuration,
                t_with_args("diagnostic.dimension_field_unset", &[]),
            ));
        }
        out
    }

    fn build_report(
        &self,
        table: &RawTable,
        rows: Vec<RowOutput>,
        diagnostics: Vec<Diagnostic>,
        skipped: usize,
    ) -> RunReport {
        let summary = RunSummary {
            total_rows: rows.len(),
            grade_found: rows.iter().filter(|r| r.result.grade.is_some()).count(),
            no_grade_found: rows.iter().filter(|r| r.result.no_grade_found).count(),
            highlighted: rows.iter().filter(|r| r.result.highlight_unmatched).count(),
            skipped,
        };
        let has_tolerances = rows.iter().any(|r| r.result.has_tolerance());

        info!(
            total = summary.total_rows,
            grade_found = summary.grade_found,
            no_grade_found = summary.no_grade_found,
            highlighted = summary.highlighted,
            skipped = summary.skipped,
            has_tolerances,
            "提取完成"
        );

        RunReport {
            run_id: Uuid::new_v4().to_string(),
            headers: table.headers.clone(),
            rows,
            diagnostics,
            summary,
            has_tolerances,
        }
    }
}
