// ==========================================
// PE 필름 생산 스케줄링 시스템 - 제품 카탈로그 엔티티
// ==========================================
// 호환 기계 집합은 파생 데이터 (CompatibilityIndex에서 재계산)
// 카탈로그에 저장하지 않는다
// ==========================================

use crate::domain::types::ColorCategory;
use serde::{Deserialize, Serialize};

/// 제품 마스터
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// 제품 코드 (유일 키)
    pub product_code: String,
    /// 필름 폭 (mm)
    pub width_mm: i64,
    /// 색상 카테고리 (셋업 순서 tie-break에 사용)
    pub color: ColorCategory,
}

impl Product {
    pub fn new(product_code: impl Into<String>, width_mm: i64, color: ColorCategory) -> Self {
        Self {
            product_code: product_code.into(),
            width_mm,
            color,
        }
    }
}
