// ==========================================
// FlexiMart 零售数据 ETL 管道 - 客户清洗器实现
// ==========================================
// 职责: TRIM / 电话与日期标准化 / 整行去重 / 占位邮箱 / email 去重
// 顺序约束: 缺失邮箱计数在填充占位邮箱之前完成
// ==========================================

use crate::domain::{CleanCustomer, CustomerMetrics, RawCustomerRecord};
use crate::importer::normalizer;
use chrono::NaiveDate;
use std::collections::HashSet;

/// 客户清洗结果（清洗集合 + 阶段计数器）
#[derive(Debug, Clone)]
pub struct CustomerCleanResult {
    pub customers: Vec<CleanCustomer>,
    pub metrics: CustomerMetrics,
}

// 标准化后、填充占位邮箱前的中间行
#[derive(Debug, Clone)]
struct NormalizedCustomer {
    source_id: Option<String>,
    first_name: String,
    last_name: String,
    email: Option<String>, // 尚未填充
    phone: Option<String>,
    city: Option<String>,
    registration_date: Option<NaiveDate>,
    row_number: usize,
}

impl NormalizedCustomer {
    // 整行去重键（email 取原始值参与比较）
    fn dedupe_key(&self) -> (String, String, String, String, String, String, String) {
        (
            self.source_id.clone().unwrap_or_default(),
            self.first_name.clone(),
            self.last_name.clone(),
            self.email.clone().unwrap_or_default(),
            self.phone.clone().unwrap_or_default(),
            self.city.clone().unwrap_or_default(),
            self.registration_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        )
    }
}

pub struct CustomerCleaner;

impl CustomerCleaner {
    /// 清洗客户原始行
    ///
    /// # 流程
    /// 1. 标准化电话与注册日期（映射层已 TRIM 其余文本字段）
    /// 2. 整行去重
    /// 3. 统计缺失邮箱（填充前口径）
    /// 4. 填充确定性占位邮箱并 TRIM
    /// 5. 按 email 去重，保留首次出现
    pub fn clean(&self, records: Vec<RawCustomerRecord>) -> CustomerCleanResult {
        let processed = records.len();

        // === 步骤 1: 标准化 ===
        let normalized: Vec<NormalizedCustomer> = records
            .into_iter()
            .map(|r| NormalizedCustomer {
                source_id: r.customer_id,
                first_name: r.first_name.unwrap_or_default(),
                last_name: r.last_name.unwrap_or_default(),
                email: r.email,
                phone: r.phone.as_deref().and_then(normalizer::normalize_phone),
                city: r.city,
                registration_date: r
                    .registration_date
                    .as_deref()
                    .and_then(normalizer::parse_date),
                row_number: r.row_number,
            })
            .collect();

        // === 步骤 2: 整行去重 ===
        let mut seen_rows = HashSet::new();
        let mut deduped = Vec::new();
        for record in normalized {
            if seen_rows.insert(record.dedupe_key()) {
                deduped.push(record);
            }
        }
        let exact_duplicates_removed = processed - deduped.len();

        // === 步骤 3: 缺失邮箱计数（填充前） ===
        let emails_filled = deduped.iter().filter(|r| r.email.is_none()).count();

        // === 步骤 4: 填充占位邮箱 + TRIM ===
        // === 步骤 5: 按 email 去重（保留首次出现） ===
        let mut seen_emails: HashSet<String> = HashSet::new();
        let mut customers = Vec::new();
        for record in deduped {
            let email = match &record.email {
                Some(e) => e.trim().to_string(),
                None => normalizer::gen_placeholder_email(
                    record.source_id.as_deref(),
                    record.row_number,
                ),
            };

            if !seen_emails.insert(email.clone()) {
                continue;
            }

            customers.push(CleanCustomer {
                source_id: record.source_id,
                first_name: record.first_name,
                last_name: record.last_name,
                email,
                phone: record.phone,
                city: record.city,
                registration_date: record.registration_date,
            });
        }

        let metrics = CustomerMetrics {
            processed,
            exact_duplicates_removed,
            emails_filled,
            loaded: customers.len(),
        };

        CustomerCleanResult { customers, metrics }
    }
}
