// ==========================================
// 库存文件导入系统 - 产品存储 Trait（工作单元）
// ==========================================
// 职责: 定义持久化协作方的窄接口（persist / flush / clear）
// 红线: 不含校验与导入流程规则，只做暂存与落库
// ==========================================

use crate::domain::{Product, StockFileColumn};
use crate::repository::error::RepositoryResult;

// ==========================================
// ProductStore Trait
// ==========================================
// 用途: 实体存储（批量落库）与实体校验（唯一性）的数据访问
// 实现者: SqliteProductStore
pub trait ProductStore {
    /// 暂存产品，等待下一次 flush
    ///
    /// 暂存时执行落库前生命周期钩子（added_at 缺省 / updated_at 刷新）
    fn persist(&mut self, product: Product);

    /// 提交全部暂存产品
    ///
    /// # 返回
    /// - Ok(usize): 本次提交的记录数
    /// - Err: 数据库错误（整批回滚，暂存区保持不变）
    fn flush(&mut self) -> RepositoryResult<usize>;

    /// 释放工作集（已提交实体缓存与暂存区）
    fn clear(&mut self);

    /// 已暂存但尚未提交的产品
    fn scheduled_insertions(&self) -> &[Product];

    /// 已落库记录中是否存在该列值
    fn exists_persisted(&self, column: StockFileColumn, value: &str) -> RepositoryResult<bool>;
}
