// ==========================================
// 导入API 端到端测试
// ==========================================
// 范围: 上传入口（文件名 + 字节）/ 本地文件入口 / 配置组装
// ==========================================


use device_import::api::{ApiError, ImportApi, NO_FILE_MESSAGE};
use device_import::domain::ImportSummary;
use device_import::{logging, ImportConfig};
use std::io::Write;
use std::sync::Arc;
use tempfile::Builder;
use test_helpers::{default_importer, generated_csv, MockRegistry};
use tokio_util::sync::CancellationToken;

fn api_with(registry: Arc<MockRegistry>) -> ImportApi {
    ImportApi::new(Arc::new(default_importer(registry)))
}

#[tokio::test]
async fn test_upload_csv() {
    logging::init_test();

    let registry = Arc::new(MockRegistry::accepting());
    let api = api_with(registry.clone());

    let report = api.import_upload("devices.CSV", &generated_csv(4)).await;

    assert_eq!(report.total_rows, 4);
    assert_eq!(report.success_count, 4);
    assert_eq!(report.summary, ImportSummary::Clean);
    assert_eq!(registry.submitted().len(), 4);
}

#[tokio::test]
async fn test_empty_upload_is_rejected() {
    let registry = Arc::new(MockRegistry::accepting());
    let api = api_with(registry.clone());

    let report = api.import_upload("devices.csv", b"").await;

    assert_eq!(report.total_rows, 0);
    assert_eq!(
        report.summary,
        ImportSummary::Rejected(NO_FILE_MESSAGE.to_string())
    );
    assert_eq!(registry.exchange_count(), 0);
}

#[tokio::test]
async fn test_unsupported_extension_is_rejected() {
    let registry = Arc::new(MockRegistry::accepting());
    let api = api_with(registry.clone());

    let report = api.import_upload("devices.pdf", &generated_csv(2)).await;

    assert_eq!(report.total_rows, 0);
    assert!(report.summary.is_rejected());
    assert!(report.summary.message().contains("pdf"));
    assert!(registry.submitted().is_empty());
}

#[tokio::test]
async fn test_import_file_from_disk() {
    let registry = Arc::new(MockRegistry::accepting());
    let api = api_with(registry);

    let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(&generated_csv(3)).unwrap();
    file.flush().unwrap();

    let report = api
        .import_file(file.path(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.success_count, 3);
    assert!(report.errors.is_empty());
}

#[tokio::test]
async fn test_import_missing_file_is_an_error() {
    let registry = Arc::new(MockRegistry::accepting());
    let api = api_with(registry);
    let dir = tempfile::tempdir().unwrap();

    let result = api
        .import_file(&dir.path().join("absent.csv"), &CancellationToken::new())
        .await;

    assert!(matches!(result, Err(ApiError::FileRead { .. })));
}

#[tokio::test]
async fn test_report_serializes_for_callers() {
    let registry = Arc::new(MockRegistry::accepting().with_existing(&["INV-0002"]));
    let api = api_with(registry);

    let report = api.import_upload("devices.csv", &generated_csv(2)).await;
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["total_rows"], 2);
    assert_eq!(json["success_count"], 1);
    assert_eq!(json["errors"][0]["row_number"], 3);
    assert_eq!(json["summary"]["status"], "partial");
}

#[test]
fn test_api_builds_from_default_config() {
    let config = ImportConfig::embedded().unwrap();
    assert!(ImportApi::from_config(&config).is_ok());
}
