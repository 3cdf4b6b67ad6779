// ==========================================
// 库存文件导入系统 - 导入层
// ==========================================
// 职责: 库存文件 -> 行校验 -> 实体构造/校验 -> 可否决的批量落库
// 模型: 单线程、同步、按需拉取的惰性管道
// ==========================================

// 模块声明
pub mod entity_factory;
pub mod entity_storage;
pub mod entity_validator;
pub mod error;
pub mod events;
pub mod file_importer;
pub mod file_parser;
pub mod file_reader;
pub mod header_normalizer;
pub mod importer_trait;
pub mod row_validator;

// 重导出核心类型
pub use entity_factory::ProductEntityFactory;
pub use entity_storage::{DbEntityStorage, DEFAULT_BATCH_SIZE};
pub use entity_validator::ProductValidator;
pub use error::{ImportError, Result};
pub use events::{
    BeforePersistEvent, BeforePersistListener, CancelSaveListener, EventDispatcher, InvalidEntityEvent,
    InvalidEntityListener, InvalidSubject, ListenerGuard, ListenerId,
};
pub use file_importer::{stock_file_importer, FileImporter, StockFileImporter};
pub use file_parser::{FileParser, ValidRows};
pub use file_reader::{CsvFileReader, CsvRows};
pub use header_normalizer::normalize_header;
pub use row_validator::{Constraint, FieldRule, StockCsvRowValidator};

// 重导出 Trait 接口
pub use importer_trait::{EntityFactory, EntityStorage, FileReader, RowValidator, StoreSummary};
