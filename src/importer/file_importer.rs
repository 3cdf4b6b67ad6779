// ==========================================
// 库存文件导入系统 - 文件导入器（编排）
// ==========================================
// 流程: Reader.rows -> Parser.process -> Storage.store -> ImportResult
// 红线: 本次运行的无效实体监听器随运行结束注销（包括出错提前返回）
// ==========================================

use crate::domain::{FileHeaders, ImportResult, StockFileColumn};
use crate::importer::entity_factory::ProductEntityFactory;
use crate::importer::entity_storage::DbEntityStorage;
use crate::importer::entity_validator::ProductValidator;
use crate::importer::error::Result;
use crate::importer::events::{EventDispatcher, InvalidEntityEvent};
use crate::importer::file_parser::FileParser;
use crate::importer::file_reader::CsvFileReader;
use crate::importer::importer_trait::{EntityStorage, FileReader, RowValidator};
use crate::importer::row_validator::StockCsvRowValidator;
use crate::repository::ProductStore;
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use tracing::{error, info, instrument, Span};
use uuid::Uuid;

// ==========================================
// FileImporter
// ==========================================
pub struct FileImporter<R: FileReader, V: RowValidator, E: EntityStorage> {
    reader: R,
    parser: FileParser<V>,
    storage: E,
    dispatcher: Rc<EventDispatcher>,
}

/// 默认组装的 CSV 库存导入器
pub type StockFileImporter<S> = FileImporter<CsvFileReader, StockCsvRowValidator, DbEntityStorage<S>>;

impl<R: FileReader, V: RowValidator, E: EntityStorage> FileImporter<R, V, E> {
    /// 组装导入器（各组件须共享同一个事件分发器）
    pub fn new(reader: R, parser: FileParser<V>, storage: E, dispatcher: Rc<EventDispatcher>) -> Self {
        Self {
            reader,
            parser,
            storage,
            dispatcher,
        }
    }

    pub fn dispatcher(&self) -> &Rc<EventDispatcher> {
        &self.dispatcher
    }

    pub fn storage(&self) -> &E {
        &self.storage
    }

    pub fn into_storage(self) -> E {
        self.storage
    }

    /// 导入文件
    ///
    /// # 返回
    /// - Ok(ImportResult): 行级/实体级失败已计入结果
    /// - Err: 准备阶段失败（文件不存在、格式不符）或中途的读取/存储失败
    #[instrument(skip_all, fields(run_id))]
    pub fn import<P: AsRef<Path>>(&mut self, path: P, headers: &FileHeaders) -> Result<ImportResult> {
        let path = path.as_ref();
        let run_id = Uuid::new_v4().to_string();
        Span::current().record("run_id", run_id.as_str());
        info!(file = %path.display(), batch_size = self.storage.batch_size(), "开始导入库存文件");

        let rows = self
            .reader
            .set_file_path(path)
            .and_then(|_| self.reader.rows())
            .map_err(|e| {
                error!(error = %e, "源文件无法读取");
                e
            })?;

        let result = Rc::new(RefCell::new(ImportResult::new()));

        // 本次运行的观察者: skipped + 1，并记录错误明细
        let guard = {
            let result = Rc::clone(&result);
            self.dispatcher
                .scoped_invalid_entity_listener(move |event: &InvalidEntityEvent<'_>| {
                    let mut result = result.borrow_mut();
                    result.increment_skipped(1);
                    result.add_errors(
                        event.subject().to_error_subject(),
                        event.violations().to_field_messages(),
                    );
                })
        };

        let valid_rows = self.parser.process(rows, headers, Rc::clone(&result));
        let stored = self.storage.store(valid_rows, headers);
        drop(guard);

        let summary = stored.map_err(|e| {
            error!(error = %e, "导入中止");
            e
        })?;

        let mut result = Rc::try_unwrap(result)
            .map(RefCell::into_inner)
            .unwrap_or_else(|shared| shared.borrow().clone());
        result.increment_vetoed(summary.vetoed as i64);

        info!(
            processed = result.processed(),
            success = result.success(),
            skipped = result.skipped(),
            vetoed = result.vetoed(),
            flushes = summary.flushes,
            "导入完成"
        );
        Ok(result)
    }
}

/// 按默认组件组装 CSV 库存导入器
///
/// # 参数
/// - store: 本次运行独占的存储会话
/// - unique_fields: 唯一性校验字段
pub fn stock_file_importer<S: ProductStore>(
    store: S,
    dispatcher: Rc<EventDispatcher>,
    batch_size: usize,
    unique_fields: Vec<StockFileColumn>,
) -> Result<StockFileImporter<S>> {
    let factory = ProductEntityFactory::new(ProductValidator::new(unique_fields), Rc::clone(&dispatcher));
    let storage = DbEntityStorage::new(store, factory, Rc::clone(&dispatcher)).with_batch_size(batch_size)?;
    let parser = FileParser::new(StockCsvRowValidator::new(), Rc::clone(&dispatcher));

    Ok(FileImporter::new(CsvFileReader::new(), parser, storage, dispatcher))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;
    use crate::domain::ErrorSubject;
    use crate::importer::error::ImportError;
    use crate::importer::header_normalizer::normalize_header;
    use crate::repository::SqliteProductStore;
    use rusqlite::Connection;
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    const HEADER: &str = "Product Code,Product Name,Product Description,Stock,Cost in GBP,Discontinued\n";

    fn csv_file(body: &str) -> NamedTempFile {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        write!(file, "{}{}", HEADER, body).unwrap();
        file.flush().unwrap();
        file
    }

    fn headers() -> FileHeaders {
        let mut headers = FileHeaders::stock_defaults();
        headers.map(normalize_header);
        headers
    }

    fn importer(dispatcher: Rc<EventDispatcher>) -> StockFileImporter<SqliteProductStore> {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        stock_file_importer(
            SqliteProductStore::from_connection(conn),
            dispatcher,
            100,
            vec![StockFileColumn::Code],
        )
        .unwrap()
    }

    #[test]
    fn test_row_and_entity_failures_are_counted() {
        let file = csv_file(
            "P0001,TV,32 inch,10,399.99,\n\
             P0002,,Radio,15,20,\n\
             P0001,TV again,Duplicate,12,50,yes\n\
             P0003,Cd Player,Nice,11,3,yes\n",
        );
        let mut importer = importer(Rc::new(EventDispatcher::new()));

        let result = importer.import(file.path(), &headers()).unwrap();

        assert_eq!(result.processed(), 4);
        assert_eq!(result.skipped(), 2);
        assert_eq!(result.success(), 2);
        assert!(matches!(result.errors()[0].subject, ErrorSubject::Row(_)));
        assert!(result.errors()[0].fields.contains_key("name"));
        assert!(matches!(&result.errors()[1].subject, ErrorSubject::Product(p) if p.code == "P0001"));
        assert_eq!(importer.storage().product_store().count().unwrap(), 2);
    }

    #[test]
    fn test_listener_does_not_leak_between_runs() {
        let dispatcher = Rc::new(EventDispatcher::new());
        let mut importer = importer(Rc::clone(&dispatcher));
        let file = csv_file("P0001,,desc,20,10,\n");

        let first = importer.import(file.path(), &headers()).unwrap();
        assert_eq!(dispatcher.invalid_entity_listener_count(), 0);
        let second = importer.import(file.path(), &headers()).unwrap();

        assert_eq!(first.skipped(), 1);
        assert_eq!(second.skipped(), 1);
        assert_eq!(second.errors().len(), 1);
    }

    #[test]
    fn test_setup_failure_registers_nothing() {
        let dispatcher = Rc::new(EventDispatcher::new());
        let mut importer = importer(Rc::clone(&dispatcher));

        let result = importer.import("/nonexistent/stock.csv", &headers());

        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
        assert_eq!(dispatcher.invalid_entity_listener_count(), 0);
    }

    #[test]
    fn test_vetoed_records_are_tallied_separately() {
        let dispatcher = Rc::new(EventDispatcher::new());
        dispatcher.add_before_persist_listener(crate::importer::events::CancelSaveListener);
        let mut importer = importer(Rc::clone(&dispatcher));
        let file = csv_file("P0001,TV,desc,20,10,\nP0002,Radio,desc,20,10,\n");

        let result = importer.import(file.path(), &headers()).unwrap();

        assert_eq!(result.processed(), 2);
        assert_eq!(result.skipped(), 0);
        assert_eq!(result.vetoed(), 2);
        assert!(!result.has_errors());
        assert_eq!(importer.storage().product_store().count().unwrap(), 0);
    }
}
