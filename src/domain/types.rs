// ==========================================
// 库存文件导入系统 - 领域类型定义
// ==========================================
// 职责: 定义库存文件可识别的逻辑列（封闭枚举）
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 库存文件逻辑列 (Stock File Column)
// ==========================================
// 红线: 封闭枚举，与具体文件表头文本解耦
// 序列化格式: snake_case（与配置文件 key 一致）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockFileColumn {
    Code,         // 产品代码
    Name,         // 产品名称
    Description,  // 产品描述
    Stock,        // 库存数量
    Cost,         // 成本（GBP）
    Discontinued, // 停产标记
}

impl StockFileColumn {
    /// 全部逻辑列（按文件约定顺序）
    pub const ALL: [StockFileColumn; 6] = [
        StockFileColumn::Code,
        StockFileColumn::Name,
        StockFileColumn::Description,
        StockFileColumn::Stock,
        StockFileColumn::Cost,
        StockFileColumn::Discontinued,
    ];

    /// 转换为字符串标识（同时作为违规记录的字段 key）
    pub fn as_str(&self) -> &'static str {
        match self {
            StockFileColumn::Code => "code",
            StockFileColumn::Name => "name",
            StockFileColumn::Description => "description",
            StockFileColumn::Stock => "stock",
            StockFileColumn::Cost => "cost",
            StockFileColumn::Discontinued => "discontinued",
        }
    }

    /// 默认表头文本
    pub fn default_header(&self) -> &'static str {
        match self {
            StockFileColumn::Code => "Product Code",
            StockFileColumn::Name => "Product Name",
            StockFileColumn::Description => "Product Description",
            StockFileColumn::Stock => "Stock",
            StockFileColumn::Cost => "Cost in GBP",
            StockFileColumn::Discontinued => "Discontinued",
        }
    }
}

impl fmt::Display for StockFileColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StockFileColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "code" => Ok(StockFileColumn::Code),
            "name" => Ok(StockFileColumn::Name),
            "description" => Ok(StockFileColumn::Description),
            "stock" => Ok(StockFileColumn::Stock),
            "cost" => Ok(StockFileColumn::Cost),
            "discontinued" => Ok(StockFileColumn::Discontinued),
            other => Err(format!("未知的逻辑列: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_round_trip_through_str() {
        for column in StockFileColumn::ALL {
            assert_eq!(column.as_str().parse::<StockFileColumn>(), Ok(column));
        }
    }

    #[test]
    fn test_column_from_unknown_str() {
        assert!("price".parse::<StockFileColumn>().is_err());
    }

    #[test]
    fn test_column_serde_snake_case() {
        let json = serde_json::to_string(&StockFileColumn::Discontinued).unwrap();
        assert_eq!(json, "\"discontinued\"");
    }
}
