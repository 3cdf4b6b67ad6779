// ==========================================
// 库存文件导入系统 - 文件解析器
// ==========================================
// 职责: 逐行校验原始行，只产出有效行（惰性、保持顺序）
// 计数: 每拉取一行 processed + 1；skipped 由无效实体事件的订阅方负责
// ==========================================

use crate::domain::{FileHeaders, ImportResult, RawRow};
use crate::importer::error::Result;
use crate::importer::events::{EventDispatcher, InvalidEntityEvent};
use crate::importer::importer_trait::RowValidator;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

pub struct FileParser<V: RowValidator> {
    validator: V,
    dispatcher: Rc<EventDispatcher>,
}

impl<V: RowValidator> FileParser<V> {
    pub fn new(validator: V, dispatcher: Rc<EventDispatcher>) -> Self {
        Self { validator, dispatcher }
    }

    pub fn validator(&self) -> &V {
        &self.validator
    }

    /// 包装原始行序列为有效行序列
    ///
    /// 不预读：下游每拉取一次，上游最多前进到下一条有效行
    pub fn process<'a, I>(
        &'a self,
        rows: I,
        headers: &'a FileHeaders,
        result: Rc<RefCell<ImportResult>>,
    ) -> ValidRows<'a, I, V>
    where
        I: Iterator<Item = Result<RawRow>>,
    {
        ValidRows {
            parser: self,
            rows,
            headers,
            result,
        }
    }
}

/// 有效行序列
pub struct ValidRows<'a, I, V: RowValidator> {
    parser: &'a FileParser<V>,
    rows: I,
    headers: &'a FileHeaders,
    result: Rc<RefCell<ImportResult>>,
}

impl<I, V> Iterator for ValidRows<'_, I, V>
where
    I: Iterator<Item = Result<RawRow>>,
    V: RowValidator,
{
    type Item = Result<RawRow>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let row = match self.rows.next()? {
                Ok(row) => row,
                Err(e) => return Some(Err(e)),
            };

            self.result.borrow_mut().increment_processed(1);

            let violations = self.parser.validator.validate(&row, self.headers);
            if violations.is_empty() {
                return Some(Ok(row));
            }

            debug!(line = row.line, violations = violations.len(), "行校验未通过，跳过");
            self.parser
                .dispatcher
                .dispatch_invalid_entity(&InvalidEntityEvent::row(&row, &violations));
        }
    }
}
