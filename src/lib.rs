// ==========================================
// FlexiMart 零售数据 ETL 管道 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 流程: 解析 → 映射 → 清洗 → 校验聚合 → 入库 → 报告
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与指标
pub mod domain;

// 导入层 - 解析/清洗/校验/聚合
pub mod importer;

// 数据仓储层 - 模式管理与入库
pub mod repository;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 数据质量报告
pub mod report;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体
pub use domain::{
    CleanCustomer, CleanProduct, Order, OrderItem, RawCustomerRecord, RawProductRecord,
    RawSalesRecord,
};

// 指标
pub use domain::{CustomerMetrics, LoadMetrics, PipelineMetrics, ProductMetrics, SalesMetrics};

// 导入层
pub use importer::{
    CsvParser, CustomerCleaner, EtlPipeline, ExcelParser, FieldMapper, FileParser, ImportError,
    ImportResult, PipelineRunResult, ProductCleaner, SalesValidator, UniversalFileParser,
};

// 仓储层
pub use repository::{
    LoadRepository, RepositoryError, RepositoryResult, SchemaManager, SqliteLoadRepository,
};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "FlexiMart 零售数据 ETL 管道";
