// ==========================================
// 库存文件导入系统 - 产品实体工厂
// ==========================================
// 职责: 有效原始行 -> Product（类型转换）-> 实体级校验
// 失败: 发布无效实体事件并返回 None
// ==========================================

use crate::domain::{FileHeaders, Product, RawRow, StockFileColumn, ViolationList};
use crate::importer::entity_validator::ProductValidator;
use crate::importer::error::Result;
use crate::importer::events::{EventDispatcher, InvalidEntityEvent};
use crate::importer::importer_trait::EntityFactory;
use crate::repository::ProductStore;
use chrono::{DateTime, Utc};
use std::rc::Rc;
use tracing::debug;

/// 停产标记的真值
const DISCONTINUED_FLAG: &str = "yes";

pub struct ProductEntityFactory {
    validator: ProductValidator,
    dispatcher: Rc<EventDispatcher>,
}

impl ProductEntityFactory {
    pub fn new(validator: ProductValidator, dispatcher: Rc<EventDispatcher>) -> Self {
        Self { validator, dispatcher }
    }

    /// 填充实体（纯函数，除时间戳外无隐含状态）
    ///
    /// # 返回
    /// - (Product, 类型转换产生的违规)
    pub fn populate(&self, row: &RawRow, headers: &FileHeaders, now: DateTime<Utc>) -> (Product, ViolationList) {
        let mut violations = ViolationList::new();
        let text = |column: StockFileColumn| row.column(headers, column).map(str::trim).unwrap_or("");

        let mut product = Product::new(
            text(StockFileColumn::Code),
            text(StockFileColumn::Name),
            text(StockFileColumn::Description),
        );

        match parse_stock(text(StockFileColumn::Stock)) {
            Some(stock) => product.stock = stock,
            None => violations.add(StockFileColumn::Stock.as_str(), "必须为整数"),
        }

        match parse_cost(text(StockFileColumn::Cost)) {
            Some(cost) => product.cost = cost,
            None => violations.add(StockFileColumn::Cost.as_str(), "必须为数值"),
        }

        if text(StockFileColumn::Discontinued) == DISCONTINUED_FLAG {
            product.discontinued_at = Some(now);
        }

        (product, violations)
    }
}

/// 库存转整数（"12" / "12.0" 可接受，"12.5" 不可）
fn parse_stock(raw: &str) -> Option<i64> {
    if let Ok(value) = raw.parse::<i64>() {
        return Some(value);
    }
    let value = raw.parse::<f64>().ok().filter(|v| v.is_finite())?;
    if value.fract() == 0.0 && value.abs() <= i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}

/// 成本转两位小数字符串
fn parse_cost(raw: &str) -> Option<String> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| format!("{:.2}", v))
}

impl EntityFactory for ProductEntityFactory {
    fn create(&self, row: &RawRow, headers: &FileHeaders, store: &dyn ProductStore) -> Result<Option<Product>> {
        let (product, mut violations) = self.populate(row, headers, Utc::now());
        violations.extend(self.validator.validate(&product, store)?);

        if violations.is_empty() {
            return Ok(Some(product));
        }

        debug!(
            line = row.line,
            code = %product.code,
            violations = violations.len(),
            "实体校验未通过，跳过"
        );
        self.dispatcher
            .dispatch_invalid_entity(&InvalidEntityEvent::product(&product, &violations));
        Ok(None)
    }
}
