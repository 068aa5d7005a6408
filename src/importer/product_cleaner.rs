// ==========================================
// FlexiMart 零售数据 ETL 管道 - 商品清洗器实现
// ==========================================
// 职责: 分类标准化 / 价格中位数补全 / 库存默认值 / 自然键去重
// 补全口径: 先取同分类中位数，分类无已知价格时回退全局中位数
// ==========================================

use crate::domain::{CleanProduct, ProductMetrics, RawProductRecord};
use crate::importer::normalizer;
use std::collections::{HashMap, HashSet};

/// 商品清洗结果（清洗集合 + 阶段计数器）
#[derive(Debug, Clone)]
pub struct ProductCleanResult {
    pub products: Vec<CleanProduct>,
    pub metrics: ProductMetrics,
}

// 标准化后、价格补全前的中间行
#[derive(Debug, Clone)]
struct NormalizedProduct {
    source_id: Option<String>,
    product_name: String,
    category: String,
    price: Option<f64>,
    stock_quantity: Option<f64>,
}

pub struct ProductCleaner;

impl ProductCleaner {
    /// 清洗商品原始行
    ///
    /// # 流程
    /// 1. 标准化分类，宽松转换价格/库存（非数值 → 缺失）
    /// 2. 统计缺失价格并按分类中位数补全（回退全局中位数）
    /// 3. 缺失库存默认 0
    /// 4. 按 (product_name, category) 去重，保留首次出现
    pub fn clean(&self, records: Vec<RawProductRecord>) -> ProductCleanResult {
        let processed = records.len();

        // === 步骤 1: 标准化 ===
        let normalized: Vec<NormalizedProduct> = records
            .into_iter()
            .map(|r| NormalizedProduct {
                source_id: r.product_id,
                product_name: r.product_name.unwrap_or_default(),
                category: normalizer::normalize_category(r.category.as_deref()),
                price: normalizer::coerce_f64(r.price.as_deref()),
                stock_quantity: normalizer::coerce_f64(r.stock_quantity.as_deref()),
            })
            .collect();

        // === 步骤 2: 中位数口径（补全前基于已知价格计算） ===
        let mut prices_by_category: HashMap<String, Vec<f64>> = HashMap::new();
        let mut all_prices = Vec::new();
        for record in &normalized {
            if let Some(price) = record.price {
                prices_by_category
                    .entry(record.category.clone())
                    .or_default()
                    .push(price);
                all_prices.push(price);
            }
        }
        let category_median: HashMap<String, f64> = prices_by_category
            .into_iter()
            .filter_map(|(category, prices)| {
                normalizer::median(&prices).map(|m| (category, m))
            })
            .collect();
        let global_median = normalizer::median(&all_prices);

        // === 步骤 3: 补全 + 去重 ===
        let mut prices_imputed = 0;
        let mut stock_defaulted = 0;
        let mut seen_keys = HashSet::new();
        let mut products = Vec::new();

        for record in normalized {
            let price = match record.price {
                Some(p) => p,
                None => {
                    prices_imputed += 1;
                    category_median
                        .get(&record.category)
                        .copied()
                        .or(global_median)
                        // 整个抽取无任何可解析价格时的兜底
                        .unwrap_or(0.0)
                }
            };

            let stock_quantity = match record.stock_quantity {
                Some(s) => s as i64,
                None => {
                    stock_defaulted += 1;
                    0
                }
            };

            let key = (record.product_name.clone(), record.category.clone());
            if !seen_keys.insert(key) {
                continue;
            }

            products.push(CleanProduct {
                source_id: record.source_id,
                product_name: record.product_name,
                category: record.category,
                price,
                stock_quantity,
            });
        }

        let metrics = ProductMetrics {
            processed,
            prices_imputed,
            stock_defaulted,
            loaded: products.len(),
        };

        ProductCleanResult { products, metrics }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(
        id: &str,
        name: &str,
        category: Option<&str>,
        price: Option<&str>,
        stock: Option<&str>,
        row: usize,
    ) -> RawProductRecord {
        RawProductRecord {
            product_id: Some(id.to_string()),
            product_name: Some(name.to_string()),
            category: category.map(|c| c.to_string()),
            price: price.map(|p| p.to_string()),
            stock_quantity: stock.map(|s| s.to_string()),
            row_number: row,
        }
    }

    #[test]
    fn test_clean_imputes_category_median() {
        // Electronics 已知价格 [100, 200, 300] → 缺失价补 200
        let cleaner = ProductCleaner;
        let result = cleaner.clean(vec![
            raw("P001", "Mouse", Some("Electronics"), Some("100"), Some("5"), 1),
            raw("P002", "Keyboard", Some("Electronics"), Some("200"), Some("5"), 2),
            raw("P003", "Monitor", Some("Electronics"), Some("300"), Some("5"), 3),
            raw("P004", "Webcam", Some("Electronics"), None, Some("5"), 4),
        ]);

        let webcam = result
            .products
            .iter()
            .find(|p| p.product_name == "Webcam")
            .unwrap();
        assert_eq!(webcam.price, 200.0);
        assert_eq!(result.metrics.prices_imputed, 1);
    }

    #[test]
    fn test_clean_falls_back_to_global_median() {
        // Fashion 分类无已知价格 → 回退全局中位数
        let cleaner = ProductCleaner;
        let result = cleaner.clean(vec![
            raw("P001", "Mouse", Some("Electronics"), Some("100"), Some("5"), 1),
            raw("P002", "Monitor", Some("Electronics"), Some("300"), Some("5"), 2),
            raw("P003", "Saree", Some("Fashion"), None, Some("5"), 3),
        ]);

        let saree = result
            .products
            .iter()
            .find(|p| p.product_name == "Saree")
            .unwrap();
        assert_eq!(saree.price, 200.0);
    }

    #[test]
    fn test_clean_non_numeric_price_imputed() {
        let cleaner = ProductCleaner;
        let result = cleaner.clean(vec![
            raw("P001", "Mouse", Some("Electronics"), Some("150"), Some("5"), 1),
            raw("P002", "Webcam", Some("Electronics"), Some("N/A"), Some("5"), 2),
        ]);

        let webcam = result
            .products
            .iter()
            .find(|p| p.product_name == "Webcam")
            .unwrap();
        assert_eq!(webcam.price, 150.0);
        assert_eq!(result.metrics.prices_imputed, 1);
    }

    #[test]
    fn test_clean_non_finite_price_treated_as_missing() {
        // "nan" 价格既不能入中位数口径，也不能直接落库
        let cleaner = ProductCleaner;
        let result = cleaner.clean(vec![
            raw("P001", "Mouse", Some("Electronics"), Some("100"), Some("5"), 1),
            raw("P002", "Keyboard", Some("Electronics"), Some("300"), Some("5"), 2),
            raw("P003", "Webcam", Some("Electronics"), Some("nan"), Some("5"), 3),
        ]);

        let webcam = result
            .products
            .iter()
            .find(|p| p.product_name == "Webcam")
            .unwrap();
        assert_eq!(webcam.price, 200.0);
        assert_eq!(result.metrics.prices_imputed, 1);
        assert!(result.products.iter().all(|p| p.price.is_finite()));
    }

    #[test]
    fn test_clean_stock_defaulted_to_zero() {
        let cleaner = ProductCleaner;
        let result = cleaner.clean(vec![
            raw("P001", "Mouse", Some("Electronics"), Some("100"), None, 1),
            raw("P002", "Keyboard", Some("Electronics"), Some("200"), Some("bad"), 2),
        ]);

        assert!(result.products.iter().all(|p| p.stock_quantity == 0));
        assert_eq!(result.metrics.stock_defaulted, 2);
    }

    #[test]
    fn test_clean_dedupes_by_name_and_category() {
        let cleaner = ProductCleaner;
        let result = cleaner.clean(vec![
            raw("P001", "Mouse", Some("Electronics"), Some("100"), Some("5"), 1),
            raw("P009", "Mouse", Some("electronics"), Some("120"), Some("9"), 2),
            raw("P002", "Mouse", Some("Fashion"), Some("80"), Some("3"), 3),
        ]);

        // 分类标准化后 (Mouse, Electronics) 重复，保留首次出现
        assert_eq!(result.products.len(), 2);
        let kept = result
            .products
            .iter()
            .find(|p| p.category == "Electronics")
            .unwrap();
        assert_eq!(kept.price, 100.0);
        assert_eq!(kept.source_id, Some("P001".to_string()));
    }

    #[test]
    fn test_clean_missing_category_is_unknown() {
        let cleaner = ProductCleaner;
        let result = cleaner.clean(vec![raw("P001", "Mystery", None, Some("10"), Some("1"), 1)]);
        assert_eq!(result.products[0].category, "Unknown");
    }

    #[test]
    fn test_clean_is_idempotent() {
        let cleaner = ProductCleaner;
        let first = cleaner.clean(vec![
            raw("P001", "Mouse", Some("Electronics"), Some("100"), Some("5"), 1),
            raw("P002", "Saree", Some("Fashion"), Some("80"), Some("3"), 2),
        ]);

        let reinput: Vec<RawProductRecord> = first
            .products
            .iter()
            .enumerate()
            .map(|(i, p)| RawProductRecord {
                product_id: p.source_id.clone(),
                product_name: Some(p.product_name.clone()),
                category: Some(p.category.clone()),
                price: Some(p.price.to_string()),
                stock_quantity: Some(p.stock_quantity.to_string()),
                row_number: i + 1,
            })
            .collect();

        let second = cleaner.clean(reinput);
        assert_eq!(second.products, first.products);
        assert_eq!(second.metrics.prices_imputed, 0);
        assert_eq!(second.metrics.stock_defaulted, 0);
    }
}
