// ==========================================
// 库存文件导入系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供持久化协作方接口,屏蔽数据库细节
// 约束: 所有值使用参数化查询
// ==========================================

pub mod error;
pub mod product_store;
pub mod product_store_impl;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use product_store::ProductStore;
pub use product_store_impl::SqliteProductStore;
