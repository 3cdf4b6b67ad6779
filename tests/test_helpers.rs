// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时数据库、临时 CSV 文件、记录调用序列的存储替身
// ==========================================

#![allow(dead_code)]

use rusqlite::Connection;
use std::error::Error;
use std::io::Write;
use stock_import::db::init_schema;
use stock_import::importer::normalize_header;
use stock_import::repository::RepositoryResult;
use stock_import::{FileHeaders, Product, ProductStore, StockFileColumn};
use tempfile::{Builder, NamedTempFile};

/// 默认表头行
pub const STOCK_HEADER: &str = "Product Code,Product Name,Product Description,Stock,Cost in GBP,Discontinued";

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_string_lossy().to_string();

    let conn = Connection::open(&db_path)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 写入临时 CSV 文件（自动加表头）
pub fn write_csv(rows: &[String]) -> NamedTempFile {
    let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(file, "{}", STOCK_HEADER).unwrap();
    for row in rows {
        writeln!(file, "{}", row).unwrap();
    }
    file.flush().unwrap();
    file
}

/// 生成 n 条全部有效的数据行
pub fn valid_rows(count: usize) -> Vec<String> {
    (1..=count)
        .map(|i| format!("P{:05},Product {},Description {},20,10.00,", i, i, i))
        .collect()
}

/// 规范化后的默认表头
pub fn stock_headers() -> FileHeaders {
    let mut headers = FileHeaders::stock_defaults();
    headers.map(normalize_header);
    headers
}

// ==========================================
// RecordingStore - 记录调用序列的存储替身
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Persist(String),
    Flush(usize),
    Clear,
}

#[derive(Debug, Default)]
pub struct RecordingStore {
    pub calls: Vec<StoreCall>,
    pub persisted: Vec<Product>,
    pending: Vec<Product>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 各次 flush 的记录数
    pub fn flush_sizes(&self) -> Vec<usize> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                StoreCall::Flush(count) => Some(*count),
                _ => None,
            })
            .collect()
    }

    pub fn persisted_codes(&self) -> Vec<&str> {
        self.persisted.iter().map(|p| p.code.as_str()).collect()
    }
}

impl ProductStore for RecordingStore {
    fn persist(&mut self, product: Product) {
        self.calls.push(StoreCall::Persist(product.code.clone()));
        self.pending.push(product);
    }

    fn flush(&mut self) -> RepositoryResult<usize> {
        let count = self.pending.len();
        self.calls.push(StoreCall::Flush(count));
        self.persisted.append(&mut self.pending);
        Ok(count)
    }

    fn clear(&mut self) {
        self.calls.push(StoreCall::Clear);
        self.pending.clear();
    }

    fn scheduled_insertions(&self) -> &[Product] {
        &self.pending
    }

    fn exists_persisted(&self, column: StockFileColumn, value: &str) -> RepositoryResult<bool> {
        Ok(self
            .persisted
            .iter()
            .any(|p| p.field_value(column).as_deref() == Some(value)))
    }
}
