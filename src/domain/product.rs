// ==========================================
// 库存文件导入系统 - 产品领域模型
// ==========================================
// 对齐: product_data 表
// 用途: 实体工厂创建，实体存储落库，其他组件只读
// ==========================================

use crate::domain::types::StockFileColumn;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 产品代码最大长度（数据库列宽）
pub const CODE_MAX_LENGTH: usize = 10;
/// 产品名称最大长度
pub const NAME_MAX_LENGTH: usize = 50;
/// 产品描述最大长度
pub const DESCRIPTION_MAX_LENGTH: usize = 255;
/// 成本上限（不含）
pub const MAX_COST: f64 = 1000.0;

// ==========================================
// Product - 产品
// ==========================================
// 红线: code 在已落库记录与本批次待写入记录中均唯一
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    // ===== 主键 =====
    pub id: Option<i64>, // 代理主键（落库时由存储分配）

    // ===== 基础信息 =====
    pub code: String,        // 产品代码（唯一）
    pub name: String,        // 产品名称
    pub description: String, // 产品描述

    // ===== 库存与成本 =====
    pub stock: i64,   // 库存数量（非负整数）
    pub cost: String, // 成本（decimal(10,2) 字符串）

    // ===== 时间信息 =====
    pub added_at: Option<DateTime<Utc>>,        // 入库时间（落库时缺省为当前时间）
    pub discontinued_at: Option<DateTime<Utc>>, // 停产时间
    pub updated_at: Option<DateTime<Utc>>,      // 最后更新时间（每次落库刷新）
}

impl Product {
    pub fn new(code: impl Into<String>, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: None,
            code: code.into(),
            name: name.into(),
            description: description.into(),
            stock: 0,
            cost: "0.00".to_string(),
            added_at: None,
            discontinued_at: None,
            updated_at: None,
        }
    }

    /// 成本数值
    pub fn cost_value(&self) -> Option<f64> {
        self.cost.parse::<f64>().ok()
    }

    pub fn is_discontinued(&self) -> bool {
        self.discontinued_at.is_some()
    }

    /// 按逻辑列读取字段值（用于唯一性校验）
    pub fn field_value(&self, column: StockFileColumn) -> Option<String> {
        match column {
            StockFileColumn::Code => Some(self.code.clone()),
            StockFileColumn::Name => Some(self.name.clone()),
            StockFileColumn::Description => Some(self.description.clone()),
            StockFileColumn::Stock => Some(self.stock.to_string()),
            StockFileColumn::Cost => Some(self.cost.clone()),
            StockFileColumn::Discontinued => self.discontinued_at.map(|t| t.to_rfc3339()),
        }
    }

    /// 落库前生命周期钩子
    ///
    /// - added_at 未设置时取当前时间
    /// - updated_at 每次落库刷新
    pub fn pre_persist(&mut self, now: DateTime<Utc>) {
        if self.added_at.is_none() {
            self.added_at = Some(now);
        }
        self.updated_at = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_pre_persist_defaults_added_at() {
        let mut product = Product::new("P0001", "TV", "32 inch");
        let now = Utc::now();

        product.pre_persist(now);

        assert_eq!(product.added_at, Some(now));
        assert_eq!(product.updated_at, Some(now));
    }

    #[test]
    fn test_pre_persist_keeps_existing_added_at() {
        let mut product = Product::new("P0001", "TV", "32 inch");
        let earlier = Utc::now() - Duration::days(3);
        product.added_at = Some(earlier);
        let now = Utc::now();

        product.pre_persist(now);

        assert_eq!(product.added_at, Some(earlier));
        assert_eq!(product.updated_at, Some(now));
    }

    #[test]
    fn test_field_value_for_unique_columns() {
        let mut product = Product::new("P0001", "TV", "32 inch");
        product.cost = "12.50".to_string();

        assert_eq!(product.field_value(StockFileColumn::Code), Some("P0001".to_string()));
        assert_eq!(product.field_value(StockFileColumn::Cost), Some("12.50".to_string()));
        assert_eq!(product.field_value(StockFileColumn::Discontinued), None);
        assert_eq!(product.cost_value(), Some(12.5));
    }
}
