// ==========================================
// 库存文件导入系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、值对象、逻辑列类型
// 红线: 不含数据访问逻辑,不含导入流程逻辑
// ==========================================

pub mod file_headers;
pub mod import_result;
pub mod product;
pub mod raw_row;
pub mod types;
pub mod violation;

// 重导出核心类型
pub use file_headers::FileHeaders;
pub use import_result::{ErrorSubject, ImportErrorEntry, ImportResult};
pub use product::Product;
pub use raw_row::RawRow;
pub use types::StockFileColumn;
pub use violation::{FieldMessages, Violation, ViolationList};
