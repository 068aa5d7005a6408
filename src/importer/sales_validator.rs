// ==========================================
// FlexiMart 零售数据 ETL 管道 - 销售校验聚合器实现
// ==========================================
// 职责: 销售行去重 / 引用完整性校验 / 订单与明细聚合
// 有效行判定: 客户外键在清洗域内 AND 商品外键在清洗域内
//             AND 日期解析成功 AND 数量/单价均为数值
// 分组键: (transaction_id, customer_id, transaction_date, status)
// ==========================================

use crate::domain::{
    CleanCustomer, CleanProduct, Order, OrderItem, RawSalesRecord, SalesMetrics, ValidSalesRow,
};
use crate::importer::normalizer;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// 销售校验聚合结果（订单集 + 明细集 + 阶段计数器）
#[derive(Debug, Clone)]
pub struct SalesAggregateResult {
    pub orders: Vec<Order>,
    pub order_items: Vec<OrderItem>,
    pub metrics: SalesMetrics,
}

// 标准化后、校验前的中间行
#[derive(Debug, Clone)]
struct NormalizedSales {
    transaction_id: String,
    customer_id: Option<String>,
    product_id: Option<String>,
    transaction_date: Option<NaiveDate>,
    status: String,
    quantity: Option<f64>,
    unit_price: Option<f64>,
}

impl NormalizedSales {
    fn dedupe_key(&self) -> (String, String, String, String, String, String, String) {
        (
            self.transaction_id.clone(),
            self.customer_id.clone().unwrap_or_default(),
            self.product_id.clone().unwrap_or_default(),
            self.transaction_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            self.status.clone(),
            self.quantity.map(|q| q.to_string()).unwrap_or_default(),
            self.unit_price.map(|p| p.to_string()).unwrap_or_default(),
        )
    }
}

pub struct SalesValidator;

impl SalesValidator {
    /// 校验销售行并聚合为订单/明细
    ///
    /// # 流程
    /// 1. 标准化（TRIM 已在映射层完成；数值宽松转换、日期解析）
    /// 2. 整行去重，随后按 transaction_id 去重（保留首次出现）
    /// 3. 校验外键/日期/数值，失败行剔除并计数
    /// 4. 计算小计并按分组键聚合为订单，逐行产出明细
    pub fn validate_and_aggregate(
        &self,
        records: Vec<RawSalesRecord>,
        customers: &[CleanCustomer],
        products: &[CleanProduct],
    ) -> SalesAggregateResult {
        let processed = records.len();

        // === 步骤 1: 标准化 ===
        let normalized: Vec<NormalizedSales> = records
            .into_iter()
            .map(|r| NormalizedSales {
                transaction_id: r.transaction_id.unwrap_or_default(),
                customer_id: r.customer_id,
                product_id: r.product_id,
                transaction_date: r
                    .transaction_date
                    .as_deref()
                    .and_then(normalizer::parse_date),
                status: r.status.unwrap_or_default(),
                quantity: normalizer::coerce_f64(r.quantity.as_deref()),
                unit_price: normalizer::coerce_f64(r.unit_price.as_deref()),
            })
            .collect();

        // === 步骤 2: 整行去重 + 交易号去重 ===
        let mut seen_rows = HashSet::new();
        let mut seen_txns = HashSet::new();
        let mut deduped = Vec::new();
        for record in normalized {
            if !seen_rows.insert(record.dedupe_key()) {
                continue;
            }
            if !seen_txns.insert(record.transaction_id.clone()) {
                continue;
            }
            deduped.push(record);
        }
        let duplicate_transactions_removed = processed - deduped.len();

        // === 步骤 3: 引用完整性与必填校验 ===
        let customer_domain: HashSet<&str> = customers
            .iter()
            .filter_map(|c| c.source_id.as_deref())
            .collect();
        let product_domain: HashSet<&str> = products
            .iter()
            .filter_map(|p| p.source_id.as_deref())
            .collect();

        let after_dedupe = deduped.len();
        let mut valid_rows = Vec::new();
        for record in deduped {
            let customer_ok = record
                .customer_id
                .as_deref()
                .map(|id| customer_domain.contains(id))
                .unwrap_or(false);
            let product_ok = record
                .product_id
                .as_deref()
                .map(|id| product_domain.contains(id))
                .unwrap_or(false);

            let (date, quantity, unit_price) = match (
                record.transaction_date,
                record.quantity,
                record.unit_price,
            ) {
                (Some(d), Some(q), Some(p)) if customer_ok && product_ok => (d, q, p),
                _ => {
                    debug!(
                        transaction_id = %record.transaction_id,
                        customer_ok,
                        product_ok,
                        "销售行校验失败，剔除"
                    );
                    continue;
                }
            };

            let subtotal = normalizer::round2(quantity * unit_price);
            valid_rows.push(ValidSalesRow {
                transaction_id: record.transaction_id,
                // 校验已保证两个外键存在
                customer_id: record.customer_id.unwrap_or_default(),
                product_id: record.product_id.unwrap_or_default(),
                transaction_date: date,
                status: record.status,
                quantity,
                unit_price,
                subtotal,
            });
        }
        let invalid_rows_dropped = after_dedupe - valid_rows.len();

        // === 步骤 4: 聚合（保持首次出现顺序） ===
        let mut order_index: HashMap<(String, String, NaiveDate, String), usize> = HashMap::new();
        let mut orders: Vec<Order> = Vec::new();
        let mut order_items = Vec::new();

        for row in &valid_rows {
            let group_key = (
                row.transaction_id.clone(),
                row.customer_id.clone(),
                row.transaction_date,
                row.status.clone(),
            );

            match order_index.get(&group_key) {
                Some(&idx) => {
                    let order = &mut orders[idx];
                    order.total_amount = normalizer::round2(order.total_amount + row.subtotal);
                }
                None => {
                    order_index.insert(group_key, orders.len());
                    orders.push(Order {
                        transaction_id: row.transaction_id.clone(),
                        customer_id: row.customer_id.clone(),
                        order_date: row.transaction_date,
                        status: row.status.clone(),
                        total_amount: row.subtotal,
                    });
                }
            }

            order_items.push(OrderItem {
                transaction_id: row.transaction_id.clone(),
                product_id: row.product_id.clone(),
                quantity: row.quantity,
                unit_price: row.unit_price,
                subtotal: row.subtotal,
            });
        }

        let metrics = SalesMetrics {
            processed,
            duplicate_transactions_removed,
            invalid_rows_dropped,
            orders_produced: orders.len(),
            order_items_produced: order_items.len(),
        };

        SalesAggregateResult {
            orders,
            order_items,
            metrics,
        }
    }
}
