// ==========================================
// FlexiMart 零售数据 ETL 管道 - 领域层
// ==========================================
// 职责: 实体定义与指标结构
// ==========================================

pub mod customer;
pub mod metrics;
pub mod order;
pub mod product;

pub use customer::{CleanCustomer, RawCustomerRecord};
pub use metrics::{CustomerMetrics, LoadMetrics, PipelineMetrics, ProductMetrics, SalesMetrics};
pub use order::{Order, OrderItem, RawSalesRecord, ValidSalesRow};
pub use product::{CleanProduct, RawProductRecord};
