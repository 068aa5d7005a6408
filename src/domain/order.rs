// ==========================================
// FlexiMart 零售数据 ETL 管道 - 销售/订单领域模型
// ==========================================
// 对齐: orders / order_items 表
// 说明: 销售行是瞬态数据，仅存在于转换阶段；
//       Order/OrderItem 携带外部标识，入库时再解析为代理键
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// RawSalesRecord - 销售交易原始行
// ==========================================
// 用途: 字段映射层输出，校验聚合层输入
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSalesRecord {
    pub transaction_id: Option<String>,
    pub customer_id: Option<String>,       // 外部客户编号（需在清洗后客户域内）
    pub product_id: Option<String>,        // 外部商品编号（需在清洗后商品域内）
    pub transaction_date: Option<String>,  // 原始日期字符串（多格式）
    pub quantity: Option<String>,          // 原始数量字符串（可能非数值）
    pub unit_price: Option<String>,        // 原始单价字符串（可能非数值）
    pub status: Option<String>,

    // ===== 元信息 =====
    pub row_number: usize, // 源文件行号（1 起）
}

// ==========================================
// ValidSalesRow - 通过校验的销售行
// ==========================================
// 不变量: 外键在清洗域内、日期解析成功、数量/单价均为数值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidSalesRow {
    pub transaction_id: String,
    pub customer_id: String,          // 外部客户编号
    pub product_id: String,           // 外部商品编号
    pub transaction_date: NaiveDate,
    pub status: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub subtotal: f64, // round(quantity * unit_price, 2)
}

// ==========================================
// Order - 聚合后的订单
// ==========================================
// 分组键: (transaction_id, customer_id, transaction_date, status)
// 不变量: total_amount == 其明细 subtotal 之和（生成时刻）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub transaction_id: String,       // 外部交易号（入库时映射为 order_id）
    pub customer_id: String,          // 外部客户编号（经 email 解析为代理键）
    pub order_date: NaiveDate,
    pub status: String,
    pub total_amount: f64,
}

// ==========================================
// OrderItem - 订单明细
// ==========================================
// 一条有效销售行对应一条明细
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub transaction_id: String, // 外部交易号（入库时解析为 order_id）
    pub product_id: String,     // 外部商品编号（入库时解析为代理键）
    pub quantity: f64,
    pub unit_price: f64,
    pub subtotal: f64,
}
