// ==========================================
// FlexiMart 零售数据 ETL 管道 - 命令行入口
// ==========================================
// 职责: 参数解析 / 日志初始化 / 管道调用 / 报告写出
// ==========================================

use anyhow::Context;
use clap::Parser;
use fleximart_etl::importer::EtlPipeline;
use fleximart_etl::repository::SqliteLoadRepository;
use fleximart_etl::{logging, report};
use std::path::PathBuf;
use tracing::info;

/// FlexiMart 零售数据 ETL 管道
#[derive(Parser, Debug)]
#[command(name = "fleximart-etl", version, about)]
struct Args {
    /// 原始抽取目录（customers_raw / products_raw / sales_raw）
    #[arg(long, default_value = "./data")]
    data_dir: PathBuf,

    /// SQLite 数据库文件路径
    #[arg(long, default_value = "./fleximart.db")]
    db_path: PathBuf,

    /// 数据质量报告输出路径
    #[arg(long, default_value = "./reports/data_quality_report.txt")]
    report_path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 初始化日志系统
    logging::init();

    info!("==================================================");
    info!("{}", fleximart_etl::APP_NAME);
    info!("系统版本: {}", fleximart_etl::VERSION);
    info!("==================================================");
    info!("数据目录: {}", args.data_dir.display());
    info!("数据库: {}", args.db_path.display());

    let customers_path = args.data_dir.join("customers_raw.csv");
    let products_path = args.data_dir.join("products_raw.csv");
    let sales_path = args.data_dir.join("sales_raw.csv");

    let repo = SqliteLoadRepository::new(
        args.db_path
            .to_str()
            .context("数据库路径包含非法字符")?,
    )?;

    let mut pipeline = EtlPipeline::new(repo);
    let result = pipeline.run(&customers_path, &products_path, &sales_path)?;

    report::write_report(&result, &args.report_path)?;

    println!("[SUCCESS] ETL completed.");
    Ok(())
}
