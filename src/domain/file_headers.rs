// ==========================================
// 库存文件导入系统 - 文件表头映射
// ==========================================
// 职责: 逻辑列 → 文件表头文本 的映射（值对象）
// 用途: 行校验器 / 实体工厂通过逻辑列定位行内字段
// ==========================================

use crate::domain::types::StockFileColumn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 文件表头映射
///
/// 构造后内容不变，仅允许通过 `set` / `map` 整体替换或转换
/// （例如按读取器的表头规范化规则统一大小写与分隔符）。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileHeaders {
    headers: BTreeMap<StockFileColumn, String>,
}

impl FileHeaders {
    pub fn new(headers: BTreeMap<StockFileColumn, String>) -> Self {
        Self { headers }
    }

    /// 默认表头（"Product Code" / "Product Name" / ...）
    pub fn stock_defaults() -> Self {
        StockFileColumn::ALL
            .iter()
            .map(|column| (*column, column.default_header().to_string()))
            .collect()
    }

    /// 整体替换映射
    pub fn set(&mut self, headers: BTreeMap<StockFileColumn, String>) {
        self.headers = headers;
    }

    pub fn all(&self) -> &BTreeMap<StockFileColumn, String> {
        &self.headers
    }

    pub fn has(&self, column: StockFileColumn) -> bool {
        self.headers.contains_key(&column)
    }

    /// 按逻辑列取表头文本
    pub fn get(&self, column: StockFileColumn) -> Option<&str> {
        self.headers.get(&column).map(String::as_str)
    }

    /// 对全部表头文本应用转换函数
    pub fn map<F>(&mut self, mapper: F)
    where
        F: Fn(&str) -> String,
    {
        for value in self.headers.values_mut() {
            *value = mapper(value);
        }
    }
}

impl FromIterator<(StockFileColumn, String)> for FileHeaders {
    fn from_iter<T: IntoIterator<Item = (StockFileColumn, String)>>(iter: T) -> Self {
        Self {
            headers: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_is_stable_until_set() {
        let mut headers = FileHeaders::stock_defaults();

        assert_eq!(headers.get(StockFileColumn::Code), Some("Product Code"));
        assert_eq!(headers.get(StockFileColumn::Code), Some("Product Code"));

        let mut replacement = BTreeMap::new();
        replacement.insert(StockFileColumn::Code, "sku".to_string());
        headers.set(replacement);

        assert_eq!(headers.get(StockFileColumn::Code), Some("sku"));
        assert_eq!(headers.get(StockFileColumn::Name), None);
        assert!(!headers.has(StockFileColumn::Name));
    }

    #[test]
    fn test_map_transforms_every_value() {
        let mut headers = FileHeaders::stock_defaults();
        headers.map(|h| h.to_lowercase());

        assert_eq!(headers.get(StockFileColumn::Cost), Some("cost in gbp"));
        assert_eq!(headers.all().len(), 6);
    }

    #[test]
    fn test_deserialize_from_config_object() {
        let json = r#"{"code": "SKU", "stock": "Qty"}"#;
        let headers: FileHeaders = serde_json::from_str(json).unwrap();

        assert_eq!(headers.get(StockFileColumn::Code), Some("SKU"));
        assert_eq!(headers.get(StockFileColumn::Stock), Some("Qty"));
        assert!(!headers.has(StockFileColumn::Cost));
    }
}
