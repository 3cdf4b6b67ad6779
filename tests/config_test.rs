// ==========================================
// ImportConfig 集成测试
// ==========================================
// 测试目标: 验证配置文件加载、校验与自定义表头导入
// ==========================================

mod test_helpers;

use std::io::Write;
use std::path::Path;
use std::rc::Rc;
use stock_import::config::ImportConfig;
use stock_import::importer::{stock_file_importer, EventDispatcher};
use stock_import::{ImportError, StockFileColumn};
use tempfile::{Builder, NamedTempFile};
use test_helpers::RecordingStore;

fn write_file(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_config_from_file() {
    let file = write_file(
        ".json",
        r#"{
            "database_path": "/tmp/stock_import_test.db",
            "batch_size": 10,
            "headers": {
                "code": "SKU",
                "name": "Title",
                "description": "Details",
                "stock": "Qty",
                "cost": "Unit Price",
                "discontinued": "Retired"
            },
            "unique_fields": ["code", "name"]
        }"#,
    );

    let config = ImportConfig::from_file(file.path()).unwrap();

    assert_eq!(config.database_path(), "/tmp/stock_import_test.db");
    assert_eq!(config.batch_size, 10);
    assert_eq!(config.unique_fields, vec![StockFileColumn::Code, StockFileColumn::Name]);
    assert!(config.validate().is_ok());

    let headers = config.file_headers();
    assert_eq!(headers.get(StockFileColumn::Code), Some("sku"));
    assert_eq!(headers.get(StockFileColumn::Cost), Some("unit_price"));
}

#[test]
fn test_missing_config_file() {
    let result = ImportConfig::from_file(Path::new("/nonexistent/config.json"));

    assert!(matches!(result, Err(ImportError::ConfigReadError { .. })));
}

#[test]
fn test_malformed_config_file() {
    let file = write_file(".json", "{ batch_size: ");

    let result = ImportConfig::from_file(file.path());

    assert!(matches!(result, Err(ImportError::ConfigReadError { .. })));
}

#[test]
fn test_unknown_column_in_headers_is_rejected() {
    let file = write_file(".json", r#"{"headers": {"colour": "Colour"}}"#);

    assert!(ImportConfig::from_file(file.path()).is_err());
}

#[test]
fn test_import_with_custom_headers() {
    let file = write_file(".json", r#"{"headers": {
        "code": "SKU", "name": "Title", "description": "Details",
        "stock": "Qty", "cost": "Unit Price", "discontinued": "Retired"
    }}"#);
    let config = ImportConfig::from_file(file.path()).unwrap();

    let csv = write_file(
        ".csv",
        "SKU,Title,Details,Qty,Unit Price,Retired\nA001,Lamp,Desk lamp,20,15.00,\nA002,Bulb,,20,1.00,\n",
    );
    let mut importer = stock_file_importer(
        RecordingStore::new(),
        Rc::new(EventDispatcher::new()),
        config.batch_size,
        config.unique_fields.clone(),
    )
    .unwrap();

    let result = importer.import(csv.path(), &config.file_headers()).unwrap();

    assert_eq!(result.processed(), 2);
    assert_eq!(result.success(), 1);
    assert!(result.errors()[0].fields.contains_key("description"));
    assert_eq!(importer.storage().product_store().persisted_codes(), vec!["A001"]);
}
