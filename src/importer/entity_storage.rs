// ==========================================
// 库存文件导入系统 - 实体存储（批量落库）
// ==========================================
// 职责: 逐条构造实体 -> 落库前事件（可否决）-> 暂存 -> 按批次 flush + clear
// 红线: 批次边界由累计暂存数驱动，不依赖序列长度
// 红线: 一个 store 调用独占存储会话的暂存区
// ==========================================

use crate::domain::{FileHeaders, RawRow};
use crate::importer::entity_factory::ProductEntityFactory;
use crate::importer::error::{ImportError, Result};
use crate::importer::events::{BeforePersistEvent, EventDispatcher};
use crate::importer::importer_trait::{EntityFactory, EntityStorage, StoreSummary};
use crate::repository::ProductStore;
use std::rc::Rc;
use tracing::{debug, info, warn};

/// 默认批次大小
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// 超过该批次大小时待写入唯一性扫描成本明显上升
pub const LARGE_BATCH_SIZE: usize = 1000;

pub struct DbEntityStorage<S: ProductStore, F: EntityFactory = ProductEntityFactory> {
    store: S,
    factory: F,
    dispatcher: Rc<EventDispatcher>,
    batch_size: usize,
}

impl<S: ProductStore, F: EntityFactory> DbEntityStorage<S, F> {
    pub fn new(store: S, factory: F, dispatcher: Rc<EventDispatcher>) -> Self {
        Self {
            store,
            factory,
            dispatcher,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// 设置批次大小（必须 > 0）
    pub fn with_batch_size(mut self, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(ImportError::ConfigValueError {
                key: "batch_size".to_string(),
                value: batch_size.to_string(),
                message: "批次大小必须大于 0".to_string(),
            });
        }
        if batch_size > LARGE_BATCH_SIZE {
            warn!(
                batch_size = batch_size,
                "批次过大，待写入记录唯一性检查为线性扫描，性能可能下降"
            );
        }
        self.batch_size = batch_size;
        Ok(self)
    }

    pub fn product_store(&self) -> &S {
        &self.store
    }

    pub fn into_product_store(self) -> S {
        self.store
    }

    /// 提交当前批次并释放工作集
    fn flush_batch(&mut self, staged_total: usize) -> Result<usize> {
        let count = self.store.flush()?;
        self.store.clear();
        info!(count = count, staged_total = staged_total, "批次已提交");
        Ok(count)
    }
}

impl<S: ProductStore, F: EntityFactory> EntityStorage for DbEntityStorage<S, F> {
    fn store<I>(&mut self, rows: I, headers: &FileHeaders) -> Result<StoreSummary>
    where
        I: Iterator<Item = Result<RawRow>>,
    {
        let mut summary = StoreSummary::default();

        for row in rows {
            let row = row?;
            let product = match self.factory.create(&row, headers, &self.store)? {
                Some(product) => product,
                None => continue,
            };

            let mut event = BeforePersistEvent::new(&product);
            if self.dispatcher.dispatch_before_persist(&mut event) {
                summary.vetoed += 1;
                debug!(code = %product.code, line = row.line, "落库已被监听器否决");
                continue;
            }

            self.store.persist(product);
            summary.staged += 1;

            if summary.staged % self.batch_size == 0 {
                self.flush_batch(summary.staged)?;
                summary.flushes += 1;
            }
        }

        // 最后一个不满批次
        if summary.staged % self.batch_size != 0 {
            self.flush_batch(summary.staged)?;
            summary.flushes += 1;
        }

        Ok(summary)
    }

    fn batch_size(&self) -> usize {
        self.batch_size
    }
}
