// ==========================================
// 库存文件导入系统 - 产品存储实现（SQLite）
// ==========================================
// 职责: 暂存区 + 事务化批量写入 product_data
// 红线: 一个实例只服务一次导入运行，不跨运行共享
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::{Product, StockFileColumn};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::product_store::ProductStore;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use tracing::debug;

fn column_name(column: StockFileColumn) -> &'static str {
    match column {
        StockFileColumn::Code => "product_code",
        StockFileColumn::Name => "product_name",
        StockFileColumn::Description => "product_desc",
        StockFileColumn::Stock => "stock",
        StockFileColumn::Cost => "cost",
        StockFileColumn::Discontinued => "discontinued_at",
    }
}

fn parse_timestamp(raw: Option<String>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

// ==========================================
// SqliteProductStore
// ==========================================
pub struct SqliteProductStore {
    conn: Connection,
    pending: Vec<Product>, // 已暂存未提交
    managed: Vec<Product>, // 已提交的工作集（clear 时释放）
}

impl SqliteProductStore {
    /// 创建新的 Store 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径（表结构需已初始化）
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self::from_connection(conn))
    }

    /// 从已有连接创建
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn,
            pending: Vec::new(),
            managed: Vec::new(),
        }
    }

    /// 已提交工作集大小
    pub fn managed_len(&self) -> usize {
        self.managed.len()
    }

    /// 统计 product_data 表记录数
    pub fn count(&self) -> RepositoryResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM product_data", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// 按产品代码查询
    pub fn find_by_code(&self, code: &str) -> RepositoryResult<Option<Product>> {
        let product = self
            .conn
            .query_row(
                r#"
                SELECT id, product_code, product_name, product_desc, stock, cost,
                       added_at, discontinued_at, updated_at
                FROM product_data
                WHERE product_code = ?1
                "#,
                params![code],
                Self::map_row,
            )
            .optional()?;
        Ok(product)
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<Product> {
        Ok(Product {
            id: row.get(0)?,
            code: row.get(1)?,
            name: row.get(2)?,
            description: row.get(3)?,
            stock: row.get(4)?,
            cost: row.get(5)?,
            added_at: parse_timestamp(row.get(6)?),
            discontinued_at: parse_timestamp(row.get(7)?),
            updated_at: parse_timestamp(row.get(8)?),
        })
    }

    /// 在事务中批量插入，返回按顺序分配的主键
    fn insert_products_tx(tx: &Transaction, products: &[Product]) -> RepositoryResult<Vec<i64>> {
        let mut stmt = tx.prepare(
            r#"
            INSERT INTO product_data (
                product_code, product_name, product_desc, stock, cost,
                added_at, discontinued_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )?;

        let mut ids = Vec::with_capacity(products.len());
        for product in products {
            stmt.execute(params![
                product.code,
                product.name,
                product.description,
                product.stock,
                product.cost,
                product.added_at.map(|t| t.to_rfc3339()),
                product.discontinued_at.map(|t| t.to_rfc3339()),
                product.updated_at.map(|t| t.to_rfc3339()),
            ])?;
            ids.push(tx.last_insert_rowid());
        }

        Ok(ids)
    }
}

impl ProductStore for SqliteProductStore {
    fn persist(&mut self, mut product: Product) {
        product.pre_persist(Utc::now());
        self.pending.push(product);
    }

    /// 事务化提交暂存区
    fn flush(&mut self) -> RepositoryResult<usize> {
        if self.pending.is_empty() {
            return Ok(0);
        }

        let tx = self
            .conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        let ids = Self::insert_products_tx(&tx, &self.pending)?;
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let count = self.pending.len();
        for (mut product, id) in self.pending.drain(..).zip(ids) {
            product.id = Some(id);
            self.managed.push(product);
        }

        debug!(count = count, managed = self.managed.len(), "暂存区已提交");
        Ok(count)
    }

    fn clear(&mut self) {
        self.pending.clear();
        self.managed.clear();
    }

    fn scheduled_insertions(&self) -> &[Product] {
        &self.pending
    }

    fn exists_persisted(&self, column: StockFileColumn, value: &str) -> RepositoryResult<bool> {
        let sql = format!(
            "SELECT 1 FROM product_data WHERE {} = ?1 LIMIT 1",
            column_name(column)
        );
        let found = self
            .conn
            .query_row(&sql, params![value], |_row| Ok(true))
            .optional()?
            .unwrap_or(false);
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;

    fn create_store() -> SqliteProductStore {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        SqliteProductStore::from_connection(conn)
    }

    fn product(code: &str) -> Product {
        let mut p = Product::new(code, format!("Name {}", code), "desc");
        p.stock = 12;
        p.cost = "4.50".to_string();
        p
    }

    #[test]
    fn test_persist_stages_until_flush() {
        let mut store = create_store();
        store.persist(product("P0001"));
        store.persist(product("P0002"));

        assert_eq!(store.scheduled_insertions().len(), 2);
        assert!(store.scheduled_insertions()[0].added_at.is_some());
        assert_eq!(store.count().unwrap(), 0);

        let flushed = store.flush().unwrap();

        assert_eq!(flushed, 2);
        assert_eq!(store.count().unwrap(), 2);
        assert!(store.scheduled_insertions().is_empty());
        assert_eq!(store.managed_len(), 2);
    }

    #[test]
    fn test_clear_releases_working_set() {
        let mut store = create_store();
        store.persist(product("P0001"));
        store.flush().unwrap();

        store.clear();

        assert_eq!(store.managed_len(), 0);
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_flush_empty_is_noop() {
        let mut store = create_store();
        assert_eq!(store.flush().unwrap(), 0);
    }

    #[test]
    fn test_flush_rolls_back_whole_batch_on_unique_violation() {
        let mut store = create_store();
        store.persist(product("P0001"));
        store.flush().unwrap();

        store.persist(product("P0002"));
        store.persist(product("P0001"));
        let result = store.flush();

        assert!(matches!(result, Err(RepositoryError::UniqueConstraintViolation(_))));
        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.scheduled_insertions().len(), 2);
    }

    #[test]
    fn test_exists_persisted_and_find_by_code() {
        let mut store = create_store();
        store.persist(product("P0001"));

        assert!(!store.exists_persisted(StockFileColumn::Code, "P0001").unwrap());
        store.flush().unwrap();
        assert!(store.exists_persisted(StockFileColumn::Code, "P0001").unwrap());

        let found = store.find_by_code("P0001").unwrap().unwrap();
        assert!(found.id.is_some());
        assert_eq!(found.stock, 12);
        assert_eq!(found.cost, "4.50");
        assert!(found.updated_at.is_some());
        assert!(store.find_by_code("P9999").unwrap().is_none());
    }
}
