// ==========================================
// FlexiMart 零售数据 ETL 管道 - 模式管理器
// ==========================================
// 职责: 幂等创建目标关系模式（4 张表 + 商品自然键唯一索引）
// 红线: 每次运行均可安全调用，不改动已有数据
// ==========================================

use crate::repository::error::RepositoryResult;
use rusqlite::Connection;

pub struct SchemaManager;

impl SchemaManager {
    /// 幂等创建目标模式
    ///
    /// # 约束
    /// - customers.email: UNIQUE NOT NULL（自然键）
    /// - products(product_name, category): 唯一索引（自然键，支撑 UPSERT）
    /// - orders.customer_id / order_items.{order_id, product_id}: 外键
    pub fn ensure_schema(conn: &Connection) -> RepositoryResult<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS customers (
              customer_id INTEGER PRIMARY KEY AUTOINCREMENT,
              first_name TEXT NOT NULL,
              last_name TEXT NOT NULL,
              email TEXT UNIQUE NOT NULL,
              phone TEXT,
              city TEXT,
              registration_date DATE
            );

            CREATE TABLE IF NOT EXISTS products (
              product_id INTEGER PRIMARY KEY AUTOINCREMENT,
              product_name TEXT NOT NULL,
              category TEXT NOT NULL,
              price REAL NOT NULL,
              stock_quantity INTEGER DEFAULT 0
            );

            -- 自然键唯一索引，支撑按 (名称, 分类) UPSERT
            CREATE UNIQUE INDEX IF NOT EXISTS ux_products_name_cat
              ON products (product_name, category);

            CREATE TABLE IF NOT EXISTS orders (
              order_id INTEGER PRIMARY KEY AUTOINCREMENT,
              customer_id INTEGER NOT NULL,
              order_date DATE NOT NULL,
              total_amount REAL NOT NULL,
              status TEXT DEFAULT 'Pending',
              FOREIGN KEY (customer_id) REFERENCES customers(customer_id)
            );

            CREATE TABLE IF NOT EXISTS order_items (
              order_item_id INTEGER PRIMARY KEY AUTOINCREMENT,
              order_id INTEGER NOT NULL,
              product_id INTEGER NOT NULL,
              quantity INTEGER NOT NULL,
              unit_price REAL NOT NULL,
              subtotal REAL NOT NULL,
              FOREIGN KEY (order_id) REFERENCES orders(order_id),
              FOREIGN KEY (product_id) REFERENCES products(product_id)
            );
            "#,
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory_connection;

    #[test]
    fn test_ensure_schema_creates_tables() {
        let conn = open_in_memory_connection().unwrap();
        SchemaManager::ensure_schema(&conn).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table'
                 AND name IN ('customers','products','orders','order_items')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 4);
    }

    #[test]
    fn test_ensure_schema_is_idempotent() {
        let conn = open_in_memory_connection().unwrap();
        SchemaManager::ensure_schema(&conn).unwrap();

        conn.execute(
            "INSERT INTO customers (first_name, last_name, email) VALUES ('A', 'B', 'a@b.com')",
            [],
        )
        .unwrap();

        // 再次创建不应报错，也不应改动已有数据
        SchemaManager::ensure_schema(&conn).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM customers", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_products_natural_key_unique() {
        let conn = open_in_memory_connection().unwrap();
        SchemaManager::ensure_schema(&conn).unwrap();

        conn.execute(
            "INSERT INTO products (product_name, category, price) VALUES ('Mouse', 'Electronics', 10.0)",
            [],
        )
        .unwrap();
        let dup = conn.execute(
            "INSERT INTO products (product_name, category, price) VALUES ('Mouse', 'Electronics', 12.0)",
            [],
        );
        assert!(dup.is_err());
    }
}
