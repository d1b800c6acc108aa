// ==========================================
// 持久化集成测试
// ==========================================
// 测试目标: 配置与运行统计共用同一数据库文件，重开后数据仍在
// ==========================================

mod test_helpers;

use std::collections::BTreeMap;
use steel_material_extractor::config::{config_keys, ConfigManager, ExtractionConfigReader};
use steel_material_extractor::domain::{CoatingConflictPolicy, RunRecord};
use steel_material_extractor::repository::RunStatsRepository;
use test_helpers::create_test_db;

fn record(run_id: &str, supplier: &str, rows: usize) -> RunRecord {
    let mut grades = BTreeMap::new();
    grades.insert("CR4".to_string(), rows as u64);
    let mut frequencies = BTreeMap::new();
    frequencies.insert("grade".to_string(), grades);

    RunRecord {
        run_id: run_id.to_string(),
        file_name: format!("{run_id}.xlsx"),
        supplier: supplier.to_string(),
        processed_at: chrono::Utc::now(),
        rows_processed: rows,
        grade_found: rows,
        no_grade_found: 0,
        highlighted: 0,
        value_frequencies: frequencies,
    }
}

#[test]
fn test_run_stats_survive_reopen() {
    let (_db_file, db_path) = create_test_db();

    {
        let repo = RunStatsRepository::new(&db_path).unwrap();
        repo.insert_run(&record("run-a", "Thyssen", 4)).unwrap();
        repo.insert_run(&record("run-b", "Salzgitter", 6)).unwrap();
    }

    let repo = RunStatsRepository::new(&db_path).unwrap();
    let stats = repo.dashboard_stats().unwrap();
    assert_eq!(stats.total_files, 2);
    assert_eq!(stats.total_rows, 10);
    assert_eq!(stats.unique_suppliers, 2);
    assert_eq!(stats.frequencies["grade"]["CR4"], 10);

    let run = repo.find_run("run-b").unwrap().unwrap();
    assert_eq!(run.file_name, "run-b.xlsx");
    assert_eq!(run.value_frequencies["grade"]["CR4"], 6);
}

#[tokio::test]
async fn test_config_and_stats_share_database() {
    let (_db_file, db_path) = create_test_db();

    let config = ConfigManager::new(&db_path).unwrap();
    config
        .set_config_value(config_keys::COATING_CONFLICT_POLICY, "longest_match")
        .unwrap();
    config
        .set_config_value(config_keys::SIGNIFICANCE_KEYWORDS, "Bondal, HSA")
        .unwrap();

    let repo = RunStatsRepository::new(&db_path).unwrap();
    repo.insert_run(&record("run-c", "Unknown", 1)).unwrap();
    drop(config);

    let reopened = ConfigManager::new(&db_path).unwrap();
    let settings = reopened.load_settings().await.unwrap();
    assert_eq!(settings.coating_conflict_policy, CoatingConflictPolicy::LongestMatch);
    assert_eq!(settings.significance_keywords, vec!["bondal", "hsa"]);
    assert_eq!(reopened.get_config_snapshot().unwrap().len(), 2);

    assert_eq!(repo.dashboard_stats().unwrap().total_files, 1);
}
