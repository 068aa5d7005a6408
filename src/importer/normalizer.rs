// ==========================================
// FlexiMart 零售数据 ETL 管道 - 字段标准化器
// ==========================================
// 职责: 电话/日期/分类/占位邮箱/数值的纯函数标准化
// 红线: 无状态、无副作用；解析失败返回 None，从不报错
// ==========================================

use chrono::NaiveDate;

/// 印度国家码（电话标准化用）
const COUNTRY_CODE: &str = "91";

/// 日期回退格式（宽松解析失败后按序尝试，首个成功者生效）
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%m-%d-%Y"];

/// 标准化电话号码为 +91-XXXXXXXXXX
///
/// # 规则
/// 1. 剔除所有非数字字符
/// 2. 以国家码 91 开头且共 12 位 → 去掉国家码
/// 3. 以 0 开头 → 去掉首位 0
/// 4. 恰好剩余 10 位 → 格式化；否则返回 None（不视为错误）
pub fn normalize_phone(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    let digits = if digits.starts_with(COUNTRY_CODE) && digits.len() == 12 {
        digits[2..].to_string()
    } else {
        digits
    };

    let digits = match digits.strip_prefix('0') {
        Some(rest) => rest.to_string(),
        None => digits,
    };

    if digits.len() == 10 {
        Some(format!("+{}-{}", COUNTRY_CODE, digits))
    } else {
        None
    }
}

/// 解析多格式日期为 ISO 日期
///
/// # 规则
/// 1. 空白输入 → None
/// 2. 先做宽松解析（ISO 日期时间、斜杠年月日）
/// 3. 再按 DATE_FORMATS 顺序尝试，首个成功者生效
/// 4. 全部失败 → None（不视为错误）
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    // 宽松解析：带时间的 ISO 变体与 YYYY/MM/DD
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt.date());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y/%m/%d") {
        return Some(date);
    }

    // 固定格式按序回退
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
            return Some(date);
        }
    }

    None
}

/// 标准化商品分类
///
/// # 规则
/// - 空白/缺失 → "Unknown"
/// - 大小写不敏感命中 {Electronics, Fashion, Groceries} → 规范写法
/// - 其他非空值 → 逐词标题化透传
pub fn normalize_category(raw: Option<&str>) -> String {
    let value = match raw {
        Some(v) if !v.trim().is_empty() => v.trim(),
        _ => return "Unknown".to_string(),
    };

    match value.to_lowercase().as_str() {
        "electronics" => "Electronics".to_string(),
        "fashion" => "Fashion".to_string(),
        "groceries" => "Groceries".to_string(),
        _ => title_case(value),
    }
}

/// 生成确定性占位邮箱（仅在真实邮箱缺失时使用）
///
/// # 规则
/// - 有源编号 → unknown+<编号>@fleximart.com
/// - 无源编号 → unknown+row<行号>@fleximart.com
pub fn gen_placeholder_email(source_id: Option<&str>, row_number: usize) -> String {
    let base = match source_id {
        Some(id) if !id.trim().is_empty() => id.trim().to_string(),
        _ => format!("row{}", row_number),
    };
    format!("unknown+{}@fleximart.com", base)
}

/// 宽松数值转换（非数值 → None，不视为错误）
///
/// # 规则
/// - "nan"/"inf" 等非有限值同样归一为缺失：
///   NaN 会污染中位数口径，且绑定到 SQLite 时落为 NULL
pub fn coerce_f64(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|f| f.is_finite())
}

/// 保留两位小数的四舍五入（小计/总额口径）
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 计算中位数（偶数个取中间两数均值）
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}

/// 逐词标题化（首字母大写，其余小写）
fn title_case(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_phone_with_separators() {
        assert_eq!(
            normalize_phone("+91 98765-43210"),
            Some("+91-9876543210".to_string())
        );
    }

    #[test]
    fn test_normalize_phone_country_code_stripped() {
        assert_eq!(
            normalize_phone("919876543210"),
            Some("+91-9876543210".to_string())
        );
    }

    #[test]
    fn test_normalize_phone_leading_zero_stripped() {
        assert_eq!(
            normalize_phone("09876543210"),
            Some("+91-9876543210".to_string())
        );
    }

    #[test]
    fn test_normalize_phone_too_short() {
        assert_eq!(normalize_phone("12345"), None);
    }

    #[test]
    fn test_normalize_phone_too_long() {
        // 13 位且不以 91 开头的 12 位规则不适用
        assert_eq!(normalize_phone("9198765432101"), None);
    }

    #[test]
    fn test_parse_date_iso() {
        assert_eq!(
            parse_date("2024-06-15"),
            NaiveDate::from_ymd_opt(2024, 6, 15)
        );
    }

    #[test]
    fn test_parse_date_slash_ddmmyyyy() {
        assert_eq!(
            parse_date("15/06/2024"),
            NaiveDate::from_ymd_opt(2024, 6, 15)
        );
    }

    #[test]
    fn test_parse_date_dash_mmddyyyy() {
        assert_eq!(
            parse_date("06-15-2024"),
            NaiveDate::from_ymd_opt(2024, 6, 15)
        );
    }

    #[test]
    fn test_parse_date_datetime_and_slash_iso() {
        assert_eq!(
            parse_date("2024-06-15 10:30:00"),
            NaiveDate::from_ymd_opt(2024, 6, 15)
        );
        assert_eq!(
            parse_date("2024/06/15"),
            NaiveDate::from_ymd_opt(2024, 6, 15)
        );
    }

    #[test]
    fn test_parse_date_blank_and_garbage() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("   "), None);
        assert_eq!(parse_date("not-a-date"), None);
    }

    #[test]
    fn test_parse_date_idempotent_on_own_output() {
        for input in ["2024-06-15", "15/06/2024", "06-15-2024", "2024-06-15 10:30:00"] {
            let first = parse_date(input).unwrap();
            let reparsed = parse_date(&first.format("%Y-%m-%d").to_string());
            assert_eq!(reparsed, Some(first));
        }
    }

    #[test]
    fn test_normalize_category_known_values() {
        assert_eq!(normalize_category(Some("electronics")), "Electronics");
        assert_eq!(normalize_category(Some("FASHION")), "Fashion");
        assert_eq!(normalize_category(Some("  groceries ")), "Groceries");
    }

    #[test]
    fn test_normalize_category_unknown_titlecased() {
        assert_eq!(normalize_category(Some("home appliances")), "Home Appliances");
        assert_eq!(normalize_category(Some("TOYS")), "Toys");
    }

    #[test]
    fn test_normalize_category_empty_is_unknown() {
        assert_eq!(normalize_category(None), "Unknown");
        assert_eq!(normalize_category(Some("   ")), "Unknown");
    }

    #[test]
    fn test_gen_placeholder_email() {
        assert_eq!(
            gen_placeholder_email(Some("C017"), 5),
            "unknown+C017@fleximart.com"
        );
        assert_eq!(
            gen_placeholder_email(None, 5),
            "unknown+row5@fleximart.com"
        );
        assert_eq!(
            gen_placeholder_email(Some("  "), 7),
            "unknown+row7@fleximart.com"
        );
    }

    #[test]
    fn test_coerce_f64() {
        assert_eq!(coerce_f64(Some("12.5")), Some(12.5));
        assert_eq!(coerce_f64(Some(" 3 ")), Some(3.0));
        assert_eq!(coerce_f64(Some("abc")), None);
        assert_eq!(coerce_f64(None), None);
    }

    #[test]
    fn test_coerce_f64_non_finite_is_missing() {
        // parse::<f64> 能解析这些字面量，但它们不是可用数值
        assert_eq!(coerce_f64(Some("nan")), None);
        assert_eq!(coerce_f64(Some("NaN")), None);
        assert_eq!(coerce_f64(Some("inf")), None);
        assert_eq!(coerce_f64(Some("-inf")), None);
        assert_eq!(coerce_f64(Some("infinity")), None);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(3.14159), 3.14);
        assert_eq!(round2(0.1 + 0.2), 0.3);
        assert_eq!(round2(2.5 * 1.555), 3.89);
    }

    #[test]
    fn test_median_odd_even_empty() {
        assert_eq!(median(&[100.0, 200.0, 300.0]), Some(200.0));
        assert_eq!(median(&[100.0, 200.0]), Some(150.0));
        assert_eq!(median(&[]), None);
    }
}
