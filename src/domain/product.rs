// ==========================================
// FlexiMart 零售数据 ETL 管道 - 商品领域模型
// ==========================================
// 对齐: products 表（(product_name, category) 为自然键）
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// RawProductRecord - 商品原始行
// ==========================================
// 用途: 字段映射层输出，清洗层输入
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawProductRecord {
    // ===== 外部标识 =====
    pub product_id: Option<String>, // 源系统商品编号（仅用于销售行外键匹配）

    // ===== 基础信息 =====
    pub product_name: Option<String>,
    pub category: Option<String>,       // 原始分类（大小写混杂/可能缺失）
    pub price: Option<String>,          // 原始价格字符串（可能非数值）
    pub stock_quantity: Option<String>, // 原始库存字符串（可能非数值）

    // ===== 元信息 =====
    pub row_number: usize, // 源文件行号（1 起）
}

// ==========================================
// CleanProduct - 清洗后的商品
// ==========================================
// 红线: price 非空且 >= 0（中位数补全），stock_quantity 非空（默认 0）
// 用途: 清洗层写出，入库层按 (product_name, category) 做 UPSERT
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanProduct {
    pub source_id: Option<String>, // 源系统商品编号（外部键 → (名称,分类) 的桥梁）
    pub product_name: String,
    pub category: String,    // Electronics/Fashion/Groceries/标题化其他值/Unknown
    pub price: f64,          // 已补全，>= 0
    pub stock_quantity: i64, // 已补全，缺失默认 0
}
