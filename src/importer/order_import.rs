// ==========================================
// PE 필름 생산 스케줄링 시스템 - 주문 인제스천
// ==========================================
// 입력 형식: order_id,product_code,quantity_rolls,due_date[,priority]
// 미지 제품 코드 행은 즉시 기각 (카탈로그 정합성)
// ==========================================

use crate::domain::order::Order;
use crate::domain::product::Product;
use crate::domain::types::OrderPriority;
use crate::importer::error::ImportError;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::info;

#[derive(Debug, Deserialize)]
struct OrderRow {
    order_id: String,
    product_code: String,
    quantity_rolls: u32,
    due_date: String,
    #[serde(default)]
    priority: Option<i64>,
}

/// 주문 CSV 로드
///
/// # 파라미터
/// - path: CSV 경로
/// - products: 제품 카탈로그 (product_code 검증용)
pub fn load_orders_csv(path: &Path, products: &[Product]) -> Result<Vec<Order>, ImportError> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    let known: BTreeSet<&str> = products.iter().map(|p| p.product_code.as_str()).collect();

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut orders = Vec::new();
    for (idx, result) in reader.deserialize::<OrderRow>().enumerate() {
        let row_no = idx + 2; // 헤더 다음 행부터
        let row = result?;

        if row.order_id.is_empty() {
            return Err(ImportError::PrimaryKeyMissing(row_no));
        }
        if !known.contains(row.product_code.as_str()) {
            return Err(ImportError::UnknownProductCode {
                row: row_no,
                product_code: row.product_code,
            });
        }
        let due_date = NaiveDate::parse_from_str(&row.due_date, "%Y-%m-%d").map_err(|_| {
            ImportError::DateFormatError {
                row: row_no,
                field: "due_date".to_string(),
                value: row.due_date.clone(),
            }
        })?;
        if row.quantity_rolls == 0 {
            return Err(ImportError::ValueRangeError {
                row: row_no,
                field: "quantity_rolls".to_string(),
                message: "0은 허용되지 않음".to_string(),
            });
        }

        orders.push(Order::new(
            row.order_id,
            row.product_code,
            row.quantity_rolls,
            due_date,
            OrderPriority::from_level(row.priority.unwrap_or(1)),
        ));
    }

    info!(count = orders.len(), path = %path.display(), "주문 로드 완료");
    Ok(orders)
}
