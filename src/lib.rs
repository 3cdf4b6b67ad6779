// ==========================================
// 库存文件导入系统 - 核心库
// ==========================================
// 管道: 读取 -> 行校验 -> 实体构造/校验 -> 可否决的批量落库 -> 导入结果
// 技术栈: Rust + SQLite
// 运行模型: 单进程、单次遍历、同步
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与值对象
pub mod domain;

// 数据仓储层 - 持久化协作方
pub mod repository;

// 导入层 - 导入管道
pub mod importer;

// 配置层 - 导入配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    ErrorSubject, FieldMessages, FileHeaders, ImportErrorEntry, ImportResult, Product, RawRow,
    StockFileColumn, Violation, ViolationList,
};

// 导入管道
pub use importer::{
    stock_file_importer, CancelSaveListener, EventDispatcher, FileImporter, ImportError,
    StockFileImporter,
};

// 仓储
pub use repository::{ProductStore, SqliteProductStore};

// 配置
pub use config::ImportConfig;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "库存文件导入系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
