// ==========================================
// FlexiMart 零售数据 ETL 管道 - 管道编排器
// ==========================================
// 职责: 整合 ETL 流程，从文件到数据库
// 流程: 预检 → 解析 → 映射 → 清洗 → 校验聚合 → 建模 → 入库 → 指标汇总
// 并发模型: 单线程顺序批处理，无挂起点
// ==========================================

use crate::domain::{PipelineMetrics, RawCustomerRecord, RawProductRecord, RawSalesRecord};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::FieldMapper;
use crate::importer::file_parser::{FileParser, UniversalFileParser};
use crate::importer::{CustomerCleaner, ProductCleaner, SalesValidator};
use crate::repository::LoadRepository;
use chrono::{DateTime, Local};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// 一次管道运行的结果
#[derive(Debug, Clone)]
pub struct PipelineRunResult {
    pub run_id: String,                // 运行标识（UUID）
    pub metrics: PipelineMetrics,      // 全阶段指标
    pub generated_at: DateTime<Local>, // 报告时间戳
    pub elapsed: Duration,
}

// ==========================================
// EtlPipeline - 管道编排器
// ==========================================
pub struct EtlPipeline<R>
where
    R: LoadRepository,
{
    // 数据访问层
    repo: R,

    // 管道组件
    file_parser: Box<dyn FileParser>,
    field_mapper: FieldMapper,
    customer_cleaner: CustomerCleaner,
    product_cleaner: ProductCleaner,
    sales_validator: SalesValidator,
}

impl<R> EtlPipeline<R>
where
    R: LoadRepository,
{
    /// 创建管道实例（默认使用按扩展名分发的通用解析器）
    pub fn new(repo: R) -> Self {
        Self::with_parser(repo, Box::new(UniversalFileParser))
    }

    /// 指定解析器创建管道实例
    pub fn with_parser(repo: R, file_parser: Box<dyn FileParser>) -> Self {
        Self {
            repo,
            file_parser,
            field_mapper: FieldMapper,
            customer_cleaner: CustomerCleaner,
            product_cleaner: ProductCleaner,
            sales_validator: SalesValidator,
        }
    }

    /// 执行完整 ETL 运行
    ///
    /// # 参数
    /// - customers_path / products_path / sales_path: 三个原始抽取文件
    ///
    /// # 返回
    /// - Ok(PipelineRunResult): 运行结果（指标 + 时间戳）
    /// - Err: 预检失败（文件缺失）、解析失败、数据库失败
    #[instrument(skip_all, fields(run_id))]
    pub fn run(
        &mut self,
        customers_path: &Path,
        products_path: &Path,
        sales_path: &Path,
    ) -> ImportResult<PipelineRunResult> {
        let start_time = Instant::now();
        let run_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("run_id", run_id.as_str());

        info!(
            customers = %customers_path.display(),
            products = %products_path.display(),
            sales = %sales_path.display(),
            "开始 ETL 运行"
        );

        // === 步骤 0: 预检（任一输入缺失即中止，不做任何转换） ===
        for path in [customers_path, products_path, sales_path] {
            if !path.exists() {
                return Err(ImportError::FileNotFound(path.display().to_string()));
            }
        }

        // === 步骤 1: 解析三个抽取文件 ===
        debug!("步骤 1: 解析文件");
        let customer_rows = self.file_parser.parse_to_raw_records(customers_path)?;
        let product_rows = self.file_parser.parse_to_raw_records(products_path)?;
        let sales_rows = self.file_parser.parse_to_raw_records(sales_path)?;
        info!(
            customers = customer_rows.len(),
            products = product_rows.len(),
            sales = sales_rows.len(),
            "文件解析完成"
        );

        // === 步骤 2: 字段映射 ===
        debug!("步骤 2: 字段映射");
        let raw_customers: Vec<RawCustomerRecord> = customer_rows
            .iter()
            .enumerate()
            .map(|(idx, row)| self.field_mapper.map_to_raw_customer(row, idx + 1))
            .collect();
        let raw_products: Vec<RawProductRecord> = product_rows
            .iter()
            .enumerate()
            .map(|(idx, row)| self.field_mapper.map_to_raw_product(row, idx + 1))
            .collect();
        let raw_sales: Vec<RawSalesRecord> = sales_rows
            .iter()
            .enumerate()
            .map(|(idx, row)| self.field_mapper.map_to_raw_sales(row, idx + 1))
            .collect();

        // === 步骤 3: 客户清洗 ===
        debug!("步骤 3: 客户清洗");
        let customer_result = self.customer_cleaner.clean(raw_customers);
        info!(
            processed = customer_result.metrics.processed,
            dupes = customer_result.metrics.exact_duplicates_removed,
            emails_filled = customer_result.metrics.emails_filled,
            loaded = customer_result.metrics.loaded,
            "客户清洗完成"
        );

        // === 步骤 4: 商品清洗 ===
        debug!("步骤 4: 商品清洗");
        let product_result = self.product_cleaner.clean(raw_products);
        info!(
            processed = product_result.metrics.processed,
            prices_imputed = product_result.metrics.prices_imputed,
            stock_defaulted = product_result.metrics.stock_defaulted,
            loaded = product_result.metrics.loaded,
            "商品清洗完成"
        );

        // === 步骤 5: 销售校验与聚合 ===
        debug!("步骤 5: 销售校验与聚合");
        let sales_result = self.sales_validator.validate_and_aggregate(
            raw_sales,
            &customer_result.customers,
            &product_result.products,
        );
        info!(
            processed = sales_result.metrics.processed,
            dupes = sales_result.metrics.duplicate_transactions_removed,
            dropped = sales_result.metrics.invalid_rows_dropped,
            orders = sales_result.metrics.orders_produced,
            order_items = sales_result.metrics.order_items_produced,
            "销售校验与聚合完成"
        );

        // === 步骤 6: 幂等创建目标模式 ===
        debug!("步骤 6: 创建目标模式");
        self.repo.ensure_schema()?;

        // === 步骤 7: 单事务入库（UPSERT + 两阶段代理键解析） ===
        debug!("步骤 7: 入库");
        let load_metrics = self.repo.load_all(
            &customer_result.customers,
            &product_result.products,
            &sales_result.orders,
            &sales_result.order_items,
        )?;
        info!(
            customers = load_metrics.customers_upserted,
            products = load_metrics.products_upserted,
            orders = load_metrics.orders_inserted,
            order_items = load_metrics.order_items_inserted,
            orders_skipped = load_metrics.orders_skipped_unresolved,
            items_skipped = load_metrics.order_items_skipped_unresolved,
            "入库完成"
        );

        // === 步骤 8: 指标汇总 ===
        let metrics = PipelineMetrics::collect(
            customer_result.metrics,
            product_result.metrics,
            sales_result.metrics,
            load_metrics,
        );

        let elapsed = start_time.elapsed();
        info!(
            elapsed_ms = elapsed.as_millis(),
            metrics = %serde_json::to_string(&metrics).unwrap_or_default(),
            "ETL 运行完成"
        );

        Ok(PipelineRunResult {
            run_id,
            metrics,
            generated_at: Local::now(),
            elapsed,
        })
    }
}
