// ==========================================
// 库存文件导入系统 - 产品实体校验器
// ==========================================
// 职责: 实体级字段约束 + 唯一性约束
// 唯一性: 先查本批次待写入记录（尚未 flush，数据库约束无法发现），
//         未发现冲突时再查已落库记录
// ==========================================

use crate::domain::product::{CODE_MAX_LENGTH, DESCRIPTION_MAX_LENGTH, MAX_COST, NAME_MAX_LENGTH};
use crate::domain::{Product, StockFileColumn, ViolationList};
use crate::repository::{ProductStore, RepositoryResult};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ProductValidator {
    unique_fields: Vec<StockFileColumn>,
}

impl ProductValidator {
    pub fn new(unique_fields: Vec<StockFileColumn>) -> Self {
        Self { unique_fields }
    }

    pub fn unique_fields(&self) -> &[StockFileColumn] {
        &self.unique_fields
    }

    /// 完整校验：字段约束 + 唯一性
    pub fn validate(&self, product: &Product, store: &dyn ProductStore) -> RepositoryResult<ViolationList> {
        let mut violations = self.validate_fields(product);

        let pending = self.validate_unique_pending(product, store.scheduled_insertions());
        if pending.is_empty() {
            violations.extend(self.validate_unique_persisted(product, store)?);
        } else {
            violations.extend(pending);
        }

        Ok(violations)
    }

    /// 字段约束
    pub fn validate_fields(&self, product: &Product) -> ViolationList {
        let mut violations = ViolationList::new();

        let code_len = product.code.trim().chars().count();
        if code_len == 0 {
            violations.add(StockFileColumn::Code.as_str(), "不能为空");
        } else if code_len > CODE_MAX_LENGTH {
            violations.add(
                StockFileColumn::Code.as_str(),
                format!("长度不能超过 {} 个字符", CODE_MAX_LENGTH),
            );
        }
        if product.name.chars().count() > NAME_MAX_LENGTH {
            violations.add(
                StockFileColumn::Name.as_str(),
                format!("长度不能超过 {} 个字符", NAME_MAX_LENGTH),
            );
        }
        if product.description.chars().count() > DESCRIPTION_MAX_LENGTH {
            violations.add(
                StockFileColumn::Description.as_str(),
                format!("长度不能超过 {} 个字符", DESCRIPTION_MAX_LENGTH),
            );
        }
        if product.stock < 0 {
            violations.add(StockFileColumn::Stock.as_str(), "不能为负数");
        }
        match product.cost_value() {
            Some(cost) if cost < 0.0 => violations.add(StockFileColumn::Cost.as_str(), "不能为负数"),
            Some(cost) if cost >= MAX_COST => {
                violations.add(StockFileColumn::Cost.as_str(), format!("必须小于 {}", MAX_COST))
            }
            Some(_) => {}
            None => violations.add(StockFileColumn::Cost.as_str(), "必须为数值"),
        }

        violations
    }

    /// 本批次待写入记录唯一性
    ///
    /// 找到第一条冲突记录后，检查其全部唯一字段，每个相同字段一条违规，然后停止
    pub fn validate_unique_pending(&self, product: &Product, pending: &[Product]) -> ViolationList {
        let mut violations = ViolationList::new();

        for staged in pending {
            let conflicts: Vec<StockFileColumn> = self
                .unique_fields
                .iter()
                .copied()
                .filter(|column| {
                    let value = product.field_value(*column);
                    value.is_some() && value == staged.field_value(*column)
                })
                .collect();

            if !conflicts.is_empty() {
                debug!(code = %product.code, fields = ?conflicts, "与本批次待写入记录冲突");
                for column in conflicts {
                    violations.add(column.as_str(), "与本批次待写入记录重复");
                }
                break;
            }
        }

        violations
    }

    /// 已落库记录唯一性
    pub fn validate_unique_persisted(
        &self,
        product: &Product,
        store: &dyn ProductStore,
    ) -> RepositoryResult<ViolationList> {
        let mut violations = ViolationList::new();

        for column in &self.unique_fields {
            if let Some(value) = product.field_value(*column) {
                if store.exists_persisted(*column, &value)? {
                    violations.add(column.as_str(), "该值已存在");
                }
            }
        }

        Ok(violations)
    }
}

impl Default for ProductValidator {
    fn default() -> Self {
        Self::new(vec![StockFileColumn::Code])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;
    use crate::repository::SqliteProductStore;
    use rusqlite::Connection;

    fn product(code: &str, name: &str) -> Product {
        let mut p = Product::new(code, name, "desc");
        p.stock = 20;
        p.cost = "10.00".to_string();
        p
    }

    fn store() -> SqliteProductStore {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        SqliteProductStore::from_connection(conn)
    }

    #[test]
    fn test_field_constraints() {
        let validator = ProductValidator::default();
        let mut p = product("", "TV");
        p.stock = -1;
        p.cost = "1000.00".to_string();

        let violations = validator.validate_fields(&p);

        assert!(violations.has_field("code"));
        assert!(violations.has_field("stock"));
        assert!(violations.has_field("cost"));
        assert!(validator.validate_fields(&product("P0001", "TV")).is_empty());
    }

    #[test]
    fn test_pending_conflict_reports_each_matching_field_once() {
        let validator = ProductValidator::new(vec![StockFileColumn::Code, StockFileColumn::Name]);
        let pending = vec![product("P0001", "TV"), product("P0001", "TV")];

        let violations = validator.validate_unique_pending(&product("P0001", "TV"), &pending);

        assert_eq!(violations.len(), 2);
        assert!(violations.has_field("code"));
        assert!(violations.has_field("name"));
    }

    #[test]
    fn test_pending_without_conflict() {
        let validator = ProductValidator::default();
        let pending = vec![product("P0001", "TV")];

        assert!(validator
            .validate_unique_pending(&product("P0002", "TV"), &pending)
            .is_empty());
    }

    #[test]
    fn test_pending_conflict_detected_before_flush() {
        let validator = ProductValidator::default();
        let mut store = store();
        store.persist(product("P0001", "TV"));

        let violations = validator.validate(&product("P0001", "Radio"), &store).unwrap();

        assert!(violations.has_field("code"));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_persisted_conflict() {
        let validator = ProductValidator::default();
        let mut store = store();
        store.persist(product("P0001", "TV"));
        store.flush().unwrap();
        store.clear();

        let violations = validator.validate(&product("P0001", "Radio"), &store).unwrap();

        assert_eq!(violations.len(), 1);
        assert!(violations.has_field("code"));
    }
}
