// ==========================================
// 库存文件导入系统 - 导入结果
// ==========================================
// 职责: 一次导入运行的计数与逐项错误汇总
// 红线: processed >= skipped >= 0，负增量按 0 处理
// ==========================================

use crate::domain::product::Product;
use crate::domain::raw_row::RawRow;
use crate::domain::violation::FieldMessages;
use serde::{Deserialize, Serialize};

/// 错误主体：未通过行校验的原始行，或未通过实体校验的产品
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ErrorSubject {
    Row(RawRow),
    Product(Product),
}

impl ErrorSubject {
    /// 展示用标识（产品代码；原始行取 code 列的值）
    pub fn identifier(&self, code_header: Option<&str>) -> String {
        match self {
            ErrorSubject::Product(product) => product.code.clone(),
            ErrorSubject::Row(row) => code_header
                .and_then(|header| row.get(header))
                .unwrap_or_default()
                .to_string(),
        }
    }

    /// 源文件行号（实体无行号）
    pub fn line(&self) -> Option<u64> {
        match self {
            ErrorSubject::Row(row) => Some(row.line),
            ErrorSubject::Product(_) => None,
        }
    }
}

/// 单条错误记录 (主体, 字段 → 消息)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportErrorEntry {
    pub subject: ErrorSubject,
    pub fields: FieldMessages,
}

// ==========================================
// ImportResult - 导入结果
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportResult {
    processed: usize,
    skipped: usize,
    vetoed: usize, // 被落库前钩子否决的记录数（不计入 skipped）
    errors: Vec<ImportErrorEntry>,
}

impl ImportResult {
    pub fn new() -> Self {
        Self::default()
    }

    fn clamp(by: i64) -> usize {
        usize::try_from(by.max(0)).unwrap_or(usize::MAX)
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    /// 增加已处理计数（负数按 0 处理）
    pub fn increment_processed(&mut self, by: i64) -> &mut Self {
        self.processed = self.processed.saturating_add(Self::clamp(by));
        self
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// 增加跳过计数（负数按 0 处理）
    pub fn increment_skipped(&mut self, by: i64) -> &mut Self {
        self.skipped = self.skipped.saturating_add(Self::clamp(by));
        self
    }

    /// 成功数 = processed - skipped（不为负）
    pub fn success(&self) -> usize {
        self.processed.saturating_sub(self.skipped)
    }

    pub fn vetoed(&self) -> usize {
        self.vetoed
    }

    pub fn increment_vetoed(&mut self, by: i64) -> &mut Self {
        self.vetoed = self.vetoed.saturating_add(Self::clamp(by));
        self
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ImportErrorEntry] {
        &self.errors
    }

    pub fn add_errors(&mut self, subject: ErrorSubject, fields: FieldMessages) -> &mut Self {
        self.errors.push(ImportErrorEntry { subject, fields });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_increments_are_clamped() {
        let mut result = ImportResult::new();
        result.increment_processed(5).increment_processed(-3);
        result.increment_skipped(2).increment_skipped(-10);

        assert_eq!(result.processed(), 5);
        assert_eq!(result.skipped(), 2);
        assert_eq!(result.success(), 3);
        assert_eq!(result.processed(), result.skipped() + result.success());
    }

    #[test]
    fn test_success_never_negative() {
        let mut result = ImportResult::new();
        result.increment_skipped(4);

        assert_eq!(result.success(), 0);
    }

    #[test]
    fn test_add_errors_keeps_order() {
        let mut result = ImportResult::new();
        assert!(!result.has_errors());

        let mut fields = FieldMessages::new();
        fields.insert("name", "不能为空");
        result.add_errors(ErrorSubject::Product(Product::new("P0001", "", "desc")), fields.clone());
        result.add_errors(ErrorSubject::Product(Product::new("P0002", "", "desc")), fields);

        assert!(result.has_errors());
        assert_eq!(result.errors().len(), 2);
        assert_eq!(result.errors()[1].subject.identifier(None), "P0002");
    }

    #[test]
    fn test_row_subject_identifier_uses_code_header() {
        let row: RawRow = [("product_code", "P0009")].into_iter().collect();
        let subject = ErrorSubject::Row(row);

        assert_eq!(subject.identifier(Some("product_code")), "P0009");
        assert_eq!(subject.identifier(None), "");
        assert_eq!(subject.line(), Some(0));
    }
}
