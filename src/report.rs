// ==========================================
// FlexiMart 零售数据 ETL 管道 - 数据质量报告
// ==========================================
// 职责: 将各阶段计数器写出为纯文本报告
// 说明: 报告面向业务方，保持英文固定版式
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::PipelineRunResult;
use std::fs;
use std::path::Path;

/// 渲染报告文本
pub fn render_report(result: &PipelineRunResult) -> String {
    let m = &result.metrics;
    let lines = [
        "FlexiMart Data Quality Report".to_string(),
        format!(
            "Generated: {} (run {})",
            result.generated_at.format("%Y-%m-%d %H:%M:%S"),
            result.run_id
        ),
        String::new(),
        "Customers:".to_string(),
        format!("  Records processed: {}", m.customers.processed),
        format!(
            "  Exact duplicates removed: {}",
            m.customers.exact_duplicates_removed
        ),
        format!("  Missing emails handled: {}", m.customers.emails_filled),
        format!("  Final records loaded: {}", m.customers.loaded),
        String::new(),
        "Products:".to_string(),
        format!("  Records processed: {}", m.products.processed),
        format!("  Missing prices imputed: {}", m.products.prices_imputed),
        format!("  Missing stock defaulted: {}", m.products.stock_defaulted),
        format!("  Final records loaded: {}", m.products.loaded),
        String::new(),
        "Sales:".to_string(),
        format!("  Records processed: {}", m.sales.processed),
        format!(
            "  Duplicate transactions removed: {}",
            m.sales.duplicate_transactions_removed
        ),
        format!(
            "  Rows dropped due to missing/invalid FKs or dates: {}",
            m.sales.invalid_rows_dropped
        ),
        format!("  Orders produced: {}", m.sales.orders_produced),
        format!("  Order items produced: {}", m.sales.order_items_produced),
        String::new(),
        "Load:".to_string(),
        format!("  Customers upserted: {}", m.load.customers_upserted),
        format!("  Products upserted: {}", m.load.products_upserted),
        format!("  Orders inserted: {}", m.load.orders_inserted),
        format!("  Order items inserted: {}", m.load.order_items_inserted),
        format!(
            "  Orders skipped (unresolved keys): {}",
            m.load.orders_skipped_unresolved
        ),
        format!(
            "  Order items skipped (unresolved keys): {}",
            m.load.order_items_skipped_unresolved
        ),
    ];
    lines.join("\n")
}

/// 写出报告文件（父目录按需创建）
pub fn write_report(result: &PipelineRunResult, out_path: &Path) -> ImportResult<()> {
    if let Some(parent) = out_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| ImportError::ReportWriteError {
                path: out_path.display().to_string(),
                message: e.to_string(),
            })?;
        }
    }

    fs::write(out_path, render_report(result)).map_err(|e| ImportError::ReportWriteError {
        path: out_path.display().to_string(),
        message: e.to_string(),
    })?;

    tracing::info!(path = %out_path.display(), "数据质量报告已写出");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CustomerMetrics, PipelineMetrics};
    use std::time::Duration;

    fn sample_result() -> PipelineRunResult {
        PipelineRunResult {
            run_id: "test-run".to_string(),
            metrics: PipelineMetrics {
                customers: CustomerMetrics {
                    processed: 10,
                    exact_duplicates_removed: 1,
                    emails_filled: 2,
                    loaded: 8,
                },
                ..Default::default()
            },
            generated_at: chrono::Local::now(),
            elapsed: Duration::from_millis(5),
        }
    }

    #[test]
    fn test_render_report_sections() {
        let text = render_report(&sample_result());
        assert!(text.starts_with("FlexiMart Data Quality Report"));
        assert!(text.contains("Customers:"));
        assert!(text.contains("  Records processed: 10"));
        assert!(text.contains("Products:"));
        assert!(text.contains("Sales:"));
        assert!(text.contains("Load:"));
    }

    #[test]
    fn test_write_report_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let out_path = dir.path().join("reports/data_quality_report.txt");

        write_report(&sample_result(), &out_path).unwrap();

        let text = std::fs::read_to_string(&out_path).unwrap();
        assert!(text.contains("Missing emails handled: 2"));
    }
}
