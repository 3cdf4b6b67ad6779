// ==========================================
// 库存文件导入系统 - 导入管道 Trait
// ==========================================
// 职责: 定义管道各阶段接口（不包含实现）
// 管道: FileReader -> FileParser(RowValidator) -> EntityStorage(EntityFactory)
// ==========================================

use crate::domain::{FileHeaders, Product, RawRow, ViolationList};
use crate::importer::error::Result;
use crate::repository::ProductStore;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ==========================================
// FileReader Trait
// ==========================================
// 用途: 文件校验 + 惰性行序列
// 实现者: CsvFileReader
pub trait FileReader {
    /// 惰性行序列（有限、不可重启；重读需再次调用 rows）
    type Rows: Iterator<Item = Result<RawRow>>;

    /// 设置源文件
    ///
    /// # 返回
    /// - Err(FileNotFound): 路径不存在
    /// - Err(UnsupportedFormat): 扩展名不符
    /// - Err(InvalidFormat): 内容不是预期的文本格式
    fn set_file_path(&mut self, path: &Path) -> Result<()>;

    /// 打开文件并返回惰性行序列（表头已规范化）
    fn rows(&self) -> Result<Self::Rows>;
}

// ==========================================
// RowValidator Trait
// ==========================================
// 用途: 原始行的字段级/跨字段校验（无副作用）
// 实现者: StockCsvRowValidator
pub trait RowValidator {
    fn validate(&self, row: &RawRow, headers: &FileHeaders) -> ViolationList;
}

// ==========================================
// EntityFactory Trait
// ==========================================
// 用途: 原始行 -> 产品实体 + 实体级校验
// 实现者: ProductEntityFactory
pub trait EntityFactory {
    /// 创建产品实体
    ///
    /// # 参数
    /// - store: 当前存储会话（用于待写入批次/已落库唯一性校验）
    ///
    /// # 返回
    /// - Ok(Some): 校验通过的实体
    /// - Ok(None): 校验失败（已发布无效实体事件）
    /// - Err: 存储查询失败
    fn create(&self, row: &RawRow, headers: &FileHeaders, store: &dyn ProductStore) -> Result<Option<Product>>;
}

// ==========================================
// EntityStorage Trait
// ==========================================
// 用途: 消费有效行序列，构造实体并按批次落库
// 实现者: DbEntityStorage
pub trait EntityStorage {
    fn store<I>(&mut self, rows: I, headers: &FileHeaders) -> Result<StoreSummary>
    where
        I: Iterator<Item = Result<RawRow>>;

    fn batch_size(&self) -> usize;
}

/// 一次 store 调用的落库统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSummary {
    pub staged: usize,  // 已暂存（未被否决）的记录数
    pub vetoed: usize,  // 被落库前钩子否决的记录数
    pub flushes: usize, // flush 次数
}
