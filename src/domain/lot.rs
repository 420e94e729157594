// ==========================================
// PE 필름 생산 스케줄링 시스템 - 생산 로트 엔티티
// ==========================================
// 로트 = 한 기계의 한 사이클 윈도우에 배정된 주문 묶음
// 불변식:
//   - 로트 내 모든 제품은 로트 기계와 폭 호환
//   - 상이 제품 코드 수 ≤ max_items_per_cycle
//   - 총 롤 수는 2롤 사이클의 배수 (홀수는 올림 + 이월)
// ==========================================

use crate::domain::types::{ColorCategory, OrderPriority, WidthGroupId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 로트에 편입된 주문 1건
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LotEntry {
    pub order_id: String,
    pub product_code: String,
    pub color: ColorCategory,
    pub width_mm: i64,
    /// 사이클 정렬 후 배정 롤 수 (항상 짝수)
    pub rolls: u32,
    /// 올림 델타 (다음 사이클 이월분)
    pub carry_over_rolls: u32,
    pub due_date: NaiveDate,
    pub priority: OrderPriority,
}

/// 생산 로트
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lot {
    /// 로트 식별자 ("{machine_id}-L{seq}" 형식, 실행 내 유일)
    pub lot_id: String,
    pub machine_id: String,
    pub width_group: WidthGroupId,
    pub entries: Vec<LotEntry>,
}

impl Lot {
    pub fn new(lot_id: impl Into<String>, machine_id: impl Into<String>, width_group: WidthGroupId) -> Self {
        Self {
            lot_id: lot_id.into(),
            machine_id: machine_id.into(),
            width_group,
            entries: Vec::new(),
        }
    }

    /// 총 배정 롤 수 (사이클 정렬 후이므로 항상 짝수)
    pub fn total_rolls(&self) -> u32 {
        self.entries.iter().map(|e| e.rolls).sum()
    }

    /// 상이 제품 코드 수
    pub fn distinct_product_count(&self) -> usize {
        self.entries
            .iter()
            .map(|e| e.product_code.as_str())
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// 로트 납기 마감 = 편입 주문 중 가장 이른 납기
    pub fn due_deadline(&self) -> Option<NaiveDate> {
        self.entries.iter().map(|e| e.due_date).min()
    }

    /// 로트 진입 시점의 셋업 기준 카테고리 (첫 엔트리)
    pub fn lead_color(&self) -> Option<ColorCategory> {
        self.entries.first().map(|e| e.color)
    }

    /// 로트 종료 시점의 카테고리 (마지막 엔트리)
    pub fn tail_color(&self) -> Option<ColorCategory> {
        self.entries.last().map(|e| e.color)
    }

    /// 평균 폭 (mm) — 폭 활용률 가중치 계산용
    pub fn mean_width_mm(&self) -> f64 {
        if self.entries.is_empty() {
            return 0.0;
        }
        let sum: i64 = self.entries.iter().map(|e| e.width_mm).sum();
        sum as f64 / self.entries.len() as f64
    }

    /// 로트 내부 엔트리를 밝은색→어두운색, 동순위는 주문 ID로 정렬
    ///
    /// 로트 내부 전환도 세척 방향(어두움→밝음)을 피하게 하고
    /// 재실행 시 동일한 순서를 보장한다
    pub fn sort_entries_light_to_dark(&mut self) {
        self.entries
            .sort_by(|a, b| {
                a.color
                    .shade_rank()
                    .cmp(&b.color.shade_rank())
                    .then_with(|| a.order_id.cmp(&b.order_id))
            });
    }
}
