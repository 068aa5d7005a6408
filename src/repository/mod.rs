// ==========================================
// FlexiMart 零售数据 ETL 管道 - 数据仓储层
// ==========================================
// 职责: 目标关系模式的创建与幂等入库
// ==========================================

pub mod error;
pub mod load_repo;
pub mod schema;

pub use error::{RepositoryError, RepositoryResult};
pub use load_repo::{LoadRepository, SqliteLoadRepository};
pub use schema::SchemaManager;
