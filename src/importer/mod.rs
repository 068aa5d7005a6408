// ==========================================
// FlexiMart 零售数据 ETL 管道 - 导入层
// ==========================================
// 职责: 外部表格数据 → 清洗后的实体 → 订单聚合
// 支持: CSV / Excel
// ==========================================

// 模块声明
pub mod customer_cleaner;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod normalizer;
pub mod pipeline;
pub mod product_cleaner;
pub mod sales_validator;

// 重导出核心类型
pub use customer_cleaner::{CustomerCleanResult, CustomerCleaner};
pub use error::{ImportError, ImportResult};
pub use field_mapper::FieldMapper;
pub use file_parser::{CsvParser, ExcelParser, FileParser, UniversalFileParser};
pub use pipeline::{EtlPipeline, PipelineRunResult};
pub use product_cleaner::{ProductCleanResult, ProductCleaner};
pub use sales_validator::{SalesAggregateResult, SalesValidator};
