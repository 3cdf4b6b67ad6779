// ==========================================
// 库存文件导入系统 - 表头规范化
// ==========================================
// 规则: 驼峰拆分 + 空白/连字符转下划线 + 小写
// 示例: "Product Code" -> "product_code"
//       "Cost in GBP"  -> "cost_in_gbp"
//       "ProductCode"  -> "product_code"
// 红线: 读取器与 FileHeaders 必须使用同一规则
// ==========================================

/// 规范化单个表头文本
pub fn normalize_header(header: &str) -> String {
    let mut out = String::with_capacity(header.len() + 4);
    let mut prev: Option<char> = None;

    for ch in header.trim().chars() {
        if ch.is_whitespace() || ch == '-' || ch == '_' {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            prev = Some('_');
            continue;
        }

        // 小写字母/数字后紧跟大写字母时拆词
        if ch.is_uppercase() {
            if let Some(p) = prev {
                if (p.is_lowercase() || p.is_ascii_digit()) && !out.ends_with('_') {
                    out.push('_');
                }
            }
        }

        out.extend(ch.to_lowercase());
        prev = Some(ch);
    }

    while out.ends_with('_') {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_default_headers() {
        assert_eq!(normalize_header("Product Code"), "product_code");
        assert_eq!(normalize_header("Product Description"), "product_description");
        assert_eq!(normalize_header("Cost in GBP"), "cost_in_gbp");
        assert_eq!(normalize_header("Stock"), "stock");
    }

    #[test]
    fn test_normalize_camel_case_and_separators() {
        assert_eq!(normalize_header("ProductCode"), "product_code");
        assert_eq!(normalize_header("  product-name "), "product_name");
        assert_eq!(normalize_header("Cost  in__GBP"), "cost_in_gbp");
        assert_eq!(normalize_header("Item2Name"), "item2_name");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize_header("Cost in GBP");
        assert_eq!(normalize_header(&once), once);
    }
}
