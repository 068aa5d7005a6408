// ==========================================
// FlexiMart 零售数据 ETL 管道 - 数据质量指标
// ==========================================
// 职责: 各阶段计数器的类型化定义与汇总
// 红线: 不使用全局累加器，各阶段返回自身指标，按字段合并
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// CustomerMetrics - 客户清洗阶段计数器
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerMetrics {
    pub processed: usize,               // 读入行数
    pub exact_duplicates_removed: usize, // 整行重复剔除数
    pub emails_filled: usize,           // 占位邮箱填充数（填充前统计）
    pub loaded: usize,                  // 清洗后行数
}

// ==========================================
// ProductMetrics - 商品清洗阶段计数器
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductMetrics {
    pub processed: usize,       // 读入行数
    pub prices_imputed: usize,  // 中位数补全的价格数
    pub stock_defaulted: usize, // 默认为 0 的库存数
    pub loaded: usize,          // 清洗后行数
}

// ==========================================
// SalesMetrics - 销售校验聚合阶段计数器
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesMetrics {
    pub processed: usize,                      // 读入行数
    pub duplicate_transactions_removed: usize, // 整行/交易号重复剔除数
    pub invalid_rows_dropped: usize,           // 外键/日期/数值校验失败剔除数
    pub orders_produced: usize,                // 聚合产出订单数
    pub order_items_produced: usize,           // 聚合产出明细数
}

// ==========================================
// LoadMetrics - 入库阶段计数器
// ==========================================
// 说明: skipped 计数覆盖代理键解析失败的静默跳过
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadMetrics {
    pub customers_upserted: usize,
    pub products_upserted: usize,
    pub orders_inserted: usize,
    pub order_items_inserted: usize,
    pub orders_skipped_unresolved: usize,      // 客户代理键解析失败
    pub order_items_skipped_unresolved: usize, // 订单/商品代理键解析失败
}

// ==========================================
// PipelineMetrics - 全管道指标汇总
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineMetrics {
    pub customers: CustomerMetrics,
    pub products: ProductMetrics,
    pub sales: SalesMetrics,
    pub load: LoadMetrics,
}

impl PipelineMetrics {
    /// 按字段合并各阶段指标（纯聚合，无跨阶段计算）
    pub fn collect(
        customers: CustomerMetrics,
        products: ProductMetrics,
        sales: SalesMetrics,
        load: LoadMetrics,
    ) -> Self {
        Self {
            customers,
            products,
            sales,
            load,
        }
    }
}
