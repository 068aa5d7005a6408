// ==========================================
// FlexiMart 零售数据 ETL 管道 - 字段映射器实现
// ==========================================
// 职责: 源表头 → 原始记录结构体（TRIM + 空白归一为 None）
// 红线: 映射层不做类型转换；数值/日期的宽松解析在清洗层进行，
//       解析失败归一为缺失值而非错误
// ==========================================

use crate::domain::{RawCustomerRecord, RawProductRecord, RawSalesRecord};
use std::collections::HashMap;

pub struct FieldMapper;

impl FieldMapper {
    /// 映射客户原始行
    ///
    /// # 参数
    /// - row: 原始行记录（HashMap<列名, 值>）
    /// - row_number: 行号（1 起，用于占位邮箱）
    pub fn map_to_raw_customer(
        &self,
        row: &HashMap<String, String>,
        row_number: usize,
    ) -> RawCustomerRecord {
        RawCustomerRecord {
            customer_id: self.get_string(row, "customer_id"),
            first_name: self.get_string(row, "first_name"),
            last_name: self.get_string(row, "last_name"),
            email: self.get_string(row, "email"),
            phone: self.get_string(row, "phone"),
            city: self.get_string(row, "city"),
            registration_date: self.get_string(row, "registration_date"),
            row_number,
        }
    }

    /// 映射商品原始行
    pub fn map_to_raw_product(
        &self,
        row: &HashMap<String, String>,
        row_number: usize,
    ) -> RawProductRecord {
        RawProductRecord {
            product_id: self.get_string(row, "product_id"),
            product_name: self.get_string(row, "product_name"),
            category: self.get_string(row, "category"),
            price: self.get_string(row, "price"),
            stock_quantity: self.get_string(row, "stock_quantity"),
            row_number,
        }
    }

    /// 映射销售交易原始行
    pub fn map_to_raw_sales(
        &self,
        row: &HashMap<String, String>,
        row_number: usize,
    ) -> RawSalesRecord {
        RawSalesRecord {
            transaction_id: self.get_string(row, "transaction_id"),
            customer_id: self.get_string(row, "customer_id"),
            product_id: self.get_string(row, "product_id"),
            transaction_date: self.get_string(row, "transaction_date"),
            quantity: self.get_string(row, "quantity"),
            unit_price: self.get_string(row, "unit_price"),
            status: self.get_string(row, "status"),
            row_number,
        }
    }

    /// 提取字符串字段（TRIM，空白 → None）
    fn get_string(&self, row: &HashMap<String, String>, key: &str) -> Option<String> {
        row.get(key).and_then(|v| {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_customer_basic() {
        let mut row = HashMap::new();
        row.insert("customer_id".to_string(), "C001".to_string());
        row.insert("email".to_string(), "a@b.com".to_string());
        row.insert("first_name".to_string(), "Asha".to_string());

        let mapper = FieldMapper;
        let record = mapper.map_to_raw_customer(&row, 1);

        assert_eq!(record.customer_id, Some("C001".to_string()));
        assert_eq!(record.email, Some("a@b.com".to_string()));
        assert_eq!(record.first_name, Some("Asha".to_string()));
        assert_eq!(record.phone, None);
        assert_eq!(record.row_number, 1);
    }

    #[test]
    fn test_map_trim_whitespace() {
        let mut row = HashMap::new();
        row.insert("customer_id".to_string(), "  C001  ".to_string());

        let mapper = FieldMapper;
        let record = mapper.map_to_raw_customer(&row, 1);

        assert_eq!(record.customer_id, Some("C001".to_string()));
    }

    #[test]
    fn test_map_empty_as_none() {
        let mut row = HashMap::new();
        row.insert("product_id".to_string(), "P001".to_string());
        row.insert("price".to_string(), "   ".to_string());

        let mapper = FieldMapper;
        let record = mapper.map_to_raw_product(&row, 3);

        assert_eq!(record.product_id, Some("P001".to_string()));
        assert_eq!(record.price, None);
        assert_eq!(record.row_number, 3);
    }

    #[test]
    fn test_map_sales_keeps_raw_strings() {
        let mut row = HashMap::new();
        row.insert("transaction_id".to_string(), "T100".to_string());
        row.insert("quantity".to_string(), "abc".to_string());

        let mapper = FieldMapper;
        let record = mapper.map_to_raw_sales(&row, 2);

        // 非数值不在映射层报错，交由清洗层归一为缺失
        assert_eq!(record.quantity, Some("abc".to_string()));
    }
}
