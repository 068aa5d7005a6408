// ==========================================
// FlexiMart 零售数据 ETL 管道 - 入库仓储实现
// ==========================================
// 职责: 按自然键 UPSERT 客户/商品，两阶段解析代理键后写入订单/明细
// 事务口径: 四类实体在同一事务内提交，任一阶段失败整体回滚
// 两阶段解析: UPSERT 完成后一次性读回 自然键 → 代理键 映射，
//             订单/明细写入只做 O(1) 查表，绝不逐行回查
// ==========================================

use crate::domain::{CleanCustomer, CleanProduct, LoadMetrics, Order, OrderItem};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::schema::SchemaManager;
use rusqlite::{params, Connection, Transaction};
use std::collections::HashMap;
use tracing::{debug, warn};

// ==========================================
// LoadRepository Trait
// ==========================================
// 用途: 入库接口（管道最终阶段）
// 实现者: SqliteLoadRepository
pub trait LoadRepository {
    /// 幂等创建目标模式
    fn ensure_schema(&self) -> RepositoryResult<()>;

    /// 在单一事务内入库全部实体
    ///
    /// # 参数
    /// - customers/products: 清洗后的实体（同时提供 外部键 → 自然键 的桥梁）
    /// - orders/order_items: 聚合结果（携带外部标识，待解析为代理键）
    ///
    /// # 返回
    /// - Ok(LoadMetrics): 各实体写入与跳过计数
    /// - Err: 数据库失败（已整体回滚）
    fn load_all(
        &mut self,
        customers: &[CleanCustomer],
        products: &[CleanProduct],
        orders: &[Order],
        order_items: &[OrderItem],
    ) -> RepositoryResult<LoadMetrics>;
}

// 读回的 自然键 → 代理键 映射（阶段二查表依据）
struct SurrogateKeys {
    customer_by_email: HashMap<String, i64>,
    product_by_name_cat: HashMap<(String, String), i64>,
}

// ==========================================
// SqliteLoadRepository
// ==========================================
pub struct SqliteLoadRepository {
    conn: Connection,
}

impl SqliteLoadRepository {
    /// 打开数据库文件并创建仓储实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self { conn })
    }

    /// 内存数据库仓储（测试用）
    pub fn in_memory() -> RepositoryResult<Self> {
        let conn = crate::db::open_in_memory_connection()
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self { conn })
    }

    /// 底层连接（测试断言用）
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    // 阶段一: 按 email UPSERT 客户（代理键保持稳定）
    fn upsert_customers_tx(
        tx: &Transaction,
        customers: &[CleanCustomer],
    ) -> RepositoryResult<usize> {
        let mut stmt = tx.prepare(
            r#"
            INSERT INTO customers (first_name, last_name, email, phone, city, registration_date)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(email) DO UPDATE SET
              phone = excluded.phone,
              city = excluded.city,
              registration_date = excluded.registration_date
            "#,
        )?;

        let mut count = 0;
        for customer in customers {
            stmt.execute(params![
                customer.first_name,
                customer.last_name,
                customer.email,
                customer.phone,
                customer.city,
                customer
                    .registration_date
                    .map(|d| d.format("%Y-%m-%d").to_string()),
            ])?;
            count += 1;
        }

        Ok(count)
    }

    // 阶段一: 按 (名称, 分类) UPSERT 商品
    fn upsert_products_tx(tx: &Transaction, products: &[CleanProduct]) -> RepositoryResult<usize> {
        let mut stmt = tx.prepare(
            r#"
            INSERT INTO products (product_name, category, price, stock_quantity)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(product_name, category) DO UPDATE SET
              price = excluded.price,
              stock_quantity = excluded.stock_quantity
            "#,
        )?;

        let mut count = 0;
        for product in products {
            stmt.execute(params![
                product.product_name,
                product.category,
                product.price,
                product.stock_quantity,
            ])?;
            count += 1;
        }

        Ok(count)
    }

    // 阶段二前置: 整表读回 自然键 → 代理键 映射（一次读回，O(1) 查表）
    fn read_surrogate_keys(tx: &Transaction) -> RepositoryResult<SurrogateKeys> {
        let mut customer_by_email = HashMap::new();
        {
            let mut stmt = tx.prepare("SELECT customer_id, email FROM customers")?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
            })?;
            for row in rows {
                let (id, email) = row?;
                customer_by_email.insert(email, id);
            }
        }

        let mut product_by_name_cat = HashMap::new();
        {
            let mut stmt =
                tx.prepare("SELECT product_id, product_name, category FROM products")?;
            let rows = stmt.query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?;
            for row in rows {
                let (id, name, category) = row?;
                product_by_name_cat.insert((name, category), id);
            }
        }

        Ok(SurrogateKeys {
            customer_by_email,
            product_by_name_cat,
        })
    }

    // 阶段二: 写入订单（外部客户编号 → email → 代理键），返回 交易号 → order_id 映射
    fn insert_orders_tx(
        tx: &Transaction,
        orders: &[Order],
        email_by_source: &HashMap<&str, &str>,
        keys: &SurrogateKeys,
        metrics: &mut LoadMetrics,
    ) -> RepositoryResult<HashMap<String, i64>> {
        let mut stmt = tx.prepare(
            r#"
            INSERT INTO orders (customer_id, order_date, total_amount, status)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )?;

        let mut order_id_by_txn = HashMap::new();
        for order in orders {
            let surrogate = email_by_source
                .get(order.customer_id.as_str())
                .and_then(|email| keys.customer_by_email.get(*email));

            let customer_id = match surrogate {
                Some(&id) => id,
                None => {
                    // 解析失败：跳过并计数（不写入悬挂引用）
                    warn!(
                        transaction_id = %order.transaction_id,
                        customer_id = %order.customer_id,
                        "订单客户代理键解析失败，跳过"
                    );
                    metrics.orders_skipped_unresolved += 1;
                    continue;
                }
            };

            stmt.execute(params![
                customer_id,
                order.order_date.format("%Y-%m-%d").to_string(),
                order.total_amount,
                order.status,
            ])?;
            order_id_by_txn.insert(order.transaction_id.clone(), tx.last_insert_rowid());
            metrics.orders_inserted += 1;
        }

        Ok(order_id_by_txn)
    }

    // 阶段二: 写入明细（交易号 → order_id；外部商品编号 → (名称,分类) → 代理键）
    fn insert_order_items_tx(
        tx: &Transaction,
        order_items: &[OrderItem],
        name_cat_by_source: &HashMap<&str, (&str, &str)>,
        keys: &SurrogateKeys,
        order_id_by_txn: &HashMap<String, i64>,
        metrics: &mut LoadMetrics,
    ) -> RepositoryResult<()> {
        let mut stmt = tx.prepare(
            r#"
            INSERT INTO order_items (order_id, product_id, quantity, unit_price, subtotal)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )?;

        for item in order_items {
            let order_id = order_id_by_txn.get(&item.transaction_id);
            let product_id = name_cat_by_source
                .get(item.product_id.as_str())
                .and_then(|(name, category)| {
                    keys.product_by_name_cat
                        .get(&(name.to_string(), category.to_string()))
                });

            let (order_id, product_id) = match (order_id, product_id) {
                (Some(&o), Some(&p)) => (o, p),
                _ => {
                    warn!(
                        transaction_id = %item.transaction_id,
                        product_id = %item.product_id,
                        "明细代理键解析失败，跳过"
                    );
                    metrics.order_items_skipped_unresolved += 1;
                    continue;
                }
            };

            stmt.execute(params![
                order_id,
                product_id,
                item.quantity as i64,
                item.unit_price,
                item.subtotal,
            ])?;
            metrics.order_items_inserted += 1;
        }

        Ok(())
    }
}

impl LoadRepository for SqliteLoadRepository {
    fn ensure_schema(&self) -> RepositoryResult<()> {
        SchemaManager::ensure_schema(&self.conn)
    }

    fn load_all(
        &mut self,
        customers: &[CleanCustomer],
        products: &[CleanProduct],
        orders: &[Order],
        order_items: &[OrderItem],
    ) -> RepositoryResult<LoadMetrics> {
        let mut metrics = LoadMetrics::default();

        let tx = self
            .conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        // === 阶段一: 自然键 UPSERT ===
        metrics.customers_upserted = Self::upsert_customers_tx(&tx, customers)?;
        metrics.products_upserted = Self::upsert_products_tx(&tx, products)?;
        debug!(
            customers = metrics.customers_upserted,
            products = metrics.products_upserted,
            "自然键 UPSERT 完成"
        );

        // === 阶段二: 读回代理键并写入订单/明细 ===
        let keys = Self::read_surrogate_keys(&tx)?;

        // 外部键 → 自然键 桥梁（由清洗集合一次性构建）
        let email_by_source: HashMap<&str, &str> = customers
            .iter()
            .filter_map(|c| c.source_id.as_deref().map(|id| (id, c.email.as_str())))
            .collect();
        let name_cat_by_source: HashMap<&str, (&str, &str)> = products
            .iter()
            .filter_map(|p| {
                p.source_id
                    .as_deref()
                    .map(|id| (id, (p.product_name.as_str(), p.category.as_str())))
            })
            .collect();

        let order_id_by_txn =
            Self::insert_orders_tx(&tx, orders, &email_by_source, &keys, &mut metrics)?;
        Self::insert_order_items_tx(
            &tx,
            order_items,
            &name_cat_by_source,
            &keys,
            &order_id_by_txn,
            &mut metrics,
        )?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        Ok(metrics)
    }
}
