// ==========================================
// FlexiMart 零售数据 ETL 管道 - 客户领域模型
// ==========================================
// 对齐: customers 表（email 为自然键，customer_id 为库内代理键）
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// RawCustomerRecord - 客户原始行
// ==========================================
// 用途: 字段映射层输出，清洗层输入
// 约定: 空白字段统一为 None（映射层负责 TRIM）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCustomerRecord {
    // ===== 外部标识 =====
    pub customer_id: Option<String>, // 源系统客户编号（仅用于销售行外键匹配）

    // ===== 基础信息 =====
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,             // 自然键（清洗前可能缺失）
    pub phone: Option<String>,             // 原始电话（格式混杂）
    pub city: Option<String>,
    pub registration_date: Option<String>, // 原始日期字符串（多格式）

    // ===== 元信息 =====
    pub row_number: usize, // 源文件行号（1 起），用于占位邮箱
}

// ==========================================
// CleanCustomer - 清洗后的客户
// ==========================================
// 红线: email 非空且唯一（真实邮箱或确定性占位邮箱）
// 用途: 清洗层写出，入库层按 email 做 UPSERT
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanCustomer {
    pub source_id: Option<String>, // 源系统客户编号（外部键 → email 的桥梁）
    pub first_name: String,
    pub last_name: String,
    pub email: String,                        // 自然键，已 TRIM
    pub phone: Option<String>,                // +91-XXXXXXXXXX 或 None
    pub city: Option<String>,
    pub registration_date: Option<NaiveDate>, // ISO 日期或 None
}
