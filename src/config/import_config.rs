// ==========================================
// 库存文件导入系统 - 导入配置
// ==========================================
// 来源优先级: 命令行参数 > 环境变量 > 配置文件(JSON) > 默认值
// 环境变量: STOCK_IMPORT_DB_PATH / STOCK_IMPORT_BATCH_SIZE
// ==========================================

use crate::domain::{FileHeaders, StockFileColumn};
use crate::importer::entity_storage::DEFAULT_BATCH_SIZE;
use crate::importer::error::{ImportError, Result};
use crate::importer::header_normalizer::normalize_header;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// 配置键
pub mod config_keys {
    pub const ENV_DB_PATH: &str = "STOCK_IMPORT_DB_PATH";
    pub const ENV_BATCH_SIZE: &str = "STOCK_IMPORT_BATCH_SIZE";

    pub const DATABASE_PATH: &str = "database_path";
    pub const BATCH_SIZE: &str = "batch_size";
    pub const HEADERS: &str = "headers";
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_unique_fields() -> Vec<StockFileColumn> {
    vec![StockFileColumn::Code]
}

// ==========================================
// ImportConfig
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportConfig {
    #[serde(default)]
    pub database_path: Option<String>,

    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// 逻辑列 -> 文件表头原文
    #[serde(default = "FileHeaders::stock_defaults")]
    pub headers: FileHeaders,

    #[serde(default = "default_unique_fields")]
    pub unique_fields: Vec<StockFileColumn>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            batch_size: default_batch_size(),
            headers: FileHeaders::stock_defaults(),
            unique_fields: default_unique_fields(),
        }
    }
}

impl ImportConfig {
    /// 从 JSON 文件加载（缺失的键取默认值）
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| ImportError::ConfigReadError {
            key: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config: ImportConfig = serde_json::from_str(&raw)?;
        debug!(path = %path.display(), "配置文件已加载");
        Ok(config)
    }

    /// 应用环境变量覆写
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// 按给定查找函数应用覆写（空白值忽略）
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(path) = lookup(config_keys::ENV_DB_PATH) {
            self.database_path = Some(path);
        }

        if let Some(raw) = lookup(config_keys::ENV_BATCH_SIZE) {
            self.batch_size = raw.parse::<usize>().map_err(|e| ImportError::ConfigValueError {
                key: config_keys::ENV_BATCH_SIZE.to_string(),
                value: raw.clone(),
                message: e.to_string(),
            })?;
        }

        Ok(())
    }

    /// 校验配置
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(ImportError::ConfigValueError {
                key: config_keys::BATCH_SIZE.to_string(),
                value: "0".to_string(),
                message: "批次大小必须大于 0".to_string(),
            });
        }

        if let Some((column, header)) = self
            .headers
            .all()
            .iter()
            .find(|(_, header)| header.trim().is_empty())
        {
            return Err(ImportError::ConfigValueError {
                key: format!("{}.{}", config_keys::HEADERS, column),
                value: header.clone(),
                message: "表头不能为空".to_string(),
            });
        }

        if let Some(path) = &self.database_path {
            if path.trim().is_empty() {
                return Err(ImportError::ConfigValueError {
                    key: config_keys::DATABASE_PATH.to_string(),
                    value: path.clone(),
                    message: "数据库路径不能为空".to_string(),
                });
            }
        }

        Ok(())
    }

    /// 按读取器规则规范化后的表头映射
    pub fn file_headers(&self) -> FileHeaders {
        let mut headers = self.headers.clone();
        headers.map(normalize_header);
        headers
    }

    /// 数据库路径（未配置时取默认路径）
    pub fn database_path(&self) -> String {
        self.database_path.clone().unwrap_or_else(get_default_db_path)
    }
}

/// 默认数据库路径
///
/// 顺序: STOCK_IMPORT_DB_PATH -> <用户数据目录>/stock-import/stock_import.db -> ./stock_import.db
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var(config_keys::ENV_DB_PATH) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./stock_import.db");
    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("stock-import");
        // 目录创建失败时退回当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("stock_import.db");
        }
    }

    path.to_string_lossy().to_string()
}
