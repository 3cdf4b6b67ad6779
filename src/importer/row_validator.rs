// ==========================================
// 库存文件导入系统 - 原始行校验器
// ==========================================
// 职责: 按逻辑列执行声明式约束
// 规则: 每列一组有序约束，遇到第一个失败即停止（后续约束默认前面已通过）
// 红线: 纯函数，无副作用；多余列忽略
// ==========================================

use crate::domain::product::{CODE_MAX_LENGTH, DESCRIPTION_MAX_LENGTH, MAX_COST, NAME_MAX_LENGTH};
use crate::domain::{FileHeaders, RawRow, StockFileColumn, ViolationList};
use crate::importer::importer_trait::RowValidator;

/// 低价阈值（成本低于该值时触发最低库存约束）
pub const CHEAP_UP_TO: f64 = 5.0;
/// 低价商品的最低库存（不含）
pub const CHEAP_MIN_QUANTITY: f64 = 10.0;

/// 判断字符串是否为有限数值（拒绝 inf / NaN 等文本）
pub fn is_numeric(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
        && value.parse::<f64>().map(f64::is_finite).unwrap_or(false)
}

fn parse_number(value: &str) -> Option<f64> {
    if is_numeric(value) {
        value.trim().parse::<f64>().ok()
    } else {
        None
    }
}

// ==========================================
// Constraint - 单条约束
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    NotBlank,
    MaxLength(usize),
    Numeric,
    NonNegative,
    LessThan(f64),
    OneOf(&'static [&'static str]),
    /// 同行 cost < cheap_up_to 时，要求本列 > min_quantity
    CheapStockMinimum { cheap_up_to: f64, min_quantity: f64 },
}

impl Constraint {
    fn check(&self, value: &str, row: &RawRow, headers: &FileHeaders) -> bool {
        match self {
            Constraint::NotBlank => !value.trim().is_empty(),
            Constraint::MaxLength(max) => value.trim().chars().count() <= *max,
            Constraint::Numeric => is_numeric(value),
            Constraint::NonNegative => parse_number(value).map(|v| v >= 0.0).unwrap_or(false),
            Constraint::LessThan(limit) => parse_number(value).map(|v| v < *limit).unwrap_or(false),
            Constraint::OneOf(allowed) => allowed.contains(&value.trim()),
            Constraint::CheapStockMinimum {
                cheap_up_to,
                min_quantity,
            } => {
                // 成本缺失或为空按 0 处理；非数值时条件不成立
                let cost = match row.column(headers, StockFileColumn::Cost).map(str::trim) {
                    None | Some("") => Some(0.0),
                    Some(raw) => parse_number(raw),
                };
                match cost {
                    Some(cost) if cost < *cheap_up_to => {
                        parse_number(value).map(|v| v > *min_quantity).unwrap_or(false)
                    }
                    _ => true,
                }
            }
        }
    }

    fn message(&self) -> String {
        match self {
            Constraint::NotBlank => "不能为空".to_string(),
            Constraint::MaxLength(max) => format!("长度不能超过 {} 个字符", max),
            Constraint::Numeric => "必须为数值".to_string(),
            Constraint::NonNegative => "不能为负数".to_string(),
            Constraint::LessThan(limit) => format!("必须小于 {}", limit),
            Constraint::OneOf(allowed) => format!("取值必须为 {:?} 之一", allowed),
            Constraint::CheapStockMinimum {
                cheap_up_to,
                min_quantity,
            } => format!("成本低于 {} 时库存必须大于 {}", cheap_up_to, min_quantity),
        }
    }
}

/// 单列规则
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRule {
    pub column: StockFileColumn,
    pub required: bool,
    pub constraints: Vec<Constraint>,
}

impl FieldRule {
    pub fn required(column: StockFileColumn, constraints: Vec<Constraint>) -> Self {
        Self {
            column,
            required: true,
            constraints,
        }
    }

    pub fn optional(column: StockFileColumn, constraints: Vec<Constraint>) -> Self {
        Self {
            column,
            required: false,
            constraints,
        }
    }
}

// ==========================================
// StockCsvRowValidator
// ==========================================
#[derive(Debug, Clone)]
pub struct StockCsvRowValidator {
    rules: Vec<FieldRule>,
}

impl StockCsvRowValidator {
    pub fn new() -> Self {
        use Constraint::*;

        let rules = vec![
            FieldRule::required(StockFileColumn::Code, vec![NotBlank, MaxLength(CODE_MAX_LENGTH)]),
            FieldRule::required(StockFileColumn::Name, vec![NotBlank, MaxLength(NAME_MAX_LENGTH)]),
            FieldRule::required(
                StockFileColumn::Description,
                vec![NotBlank, MaxLength(DESCRIPTION_MAX_LENGTH)],
            ),
            FieldRule::required(
                StockFileColumn::Stock,
                vec![
                    NotBlank,
                    Numeric,
                    NonNegative,
                    CheapStockMinimum {
                        cheap_up_to: CHEAP_UP_TO,
                        min_quantity: CHEAP_MIN_QUANTITY,
                    },
                ],
            ),
            FieldRule::required(StockFileColumn::Cost, vec![NotBlank, Numeric, LessThan(MAX_COST)]),
            FieldRule::optional(StockFileColumn::Discontinued, vec![OneOf(&["yes", ""])]),
        ];

        Self { rules }
    }

    /// 自定义规则集
    pub fn with_rules(rules: Vec<FieldRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }
}

impl Default for StockCsvRowValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl RowValidator for StockCsvRowValidator {
    fn validate(&self, row: &RawRow, headers: &FileHeaders) -> ViolationList {
        let mut violations = ViolationList::new();

        for rule in &self.rules {
            let field = rule.column.as_str();
            let value = match row.column(headers, rule.column) {
                Some(value) => value,
                None if rule.required => {
                    violations.add(field, "缺少该列");
                    continue;
                }
                None => continue,
            };

            if let Some(failed) = rule
                .constraints
                .iter()
                .find(|constraint| !constraint.check(value, row, headers))
            {
                violations.add(field, failed.message());
            }
        }

        violations
    }
}
