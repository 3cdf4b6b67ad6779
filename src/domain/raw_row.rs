// ==========================================
// 库存文件导入系统 - 原始行记录
// ==========================================
// 用途: 读取器产出，解析器消费一次，不可修改
// ==========================================

use crate::domain::file_headers::FileHeaders;
use crate::domain::types::StockFileColumn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 原始行记录（规范化表头 → 原始字符串值）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow {
    pub line: u64,                      // 源文件行号（表头为第 1 行）
    values: HashMap<String, String>,    // 列缺失时无对应 key
}

impl RawRow {
    pub fn new(line: u64, values: HashMap<String, String>) -> Self {
        Self { line, values }
    }

    /// 按规范化表头取值
    pub fn get(&self, header: &str) -> Option<&str> {
        self.values.get(header).map(String::as_str)
    }

    /// 通过逻辑列取值（表头映射缺失或行内缺列均返回 None）
    pub fn column(&self, headers: &FileHeaders, column: StockFileColumn) -> Option<&str> {
        headers.get(column).and_then(|header| self.get(header))
    }

    pub fn values(&self) -> &HashMap<String, String> {
        &self.values
    }
}

impl<K, V> FromIterator<(K, V)> for RawRow
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            line: 0,
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}
