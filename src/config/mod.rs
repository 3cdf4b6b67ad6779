// ==========================================
// 库存文件导入系统 - 配置层
// ==========================================
// 职责: 导入配置加载、环境变量覆写、校验
// 存储: JSON 配置文件（可选）
// ==========================================

pub mod import_config;

// 重导出核心配置
pub use import_config::{config_keys, get_default_db_path, ImportConfig};
