// ==========================================
// PE 필름 생산 스케줄링 시스템 - 주문 엔티티
// ==========================================
// 생성은 외부 수주 경로(인제스천)에서만, 스케줄러는 소비만 한다
// 상태 전이 외에는 불변, 삭제는 아카이브 절차 전용
// ==========================================

use crate::domain::types::{OrderPriority, OrderStatus};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// 주문 정보
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// 주문 식별자 (유일)
    pub order_id: String,
    /// 제품 코드 (Product 카탈로그 참조)
    pub product_code: String,
    /// 주문 수량 (롤 단위)
    pub quantity_rolls: u32,
    /// 납기일
    pub due_date: NaiveDate,
    /// 우선순위
    pub priority: OrderPriority,
    /// 상태
    pub status: OrderStatus,
    /// 생성 시각
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// 신규(미배정) 주문 생성
    pub fn new(
        order_id: impl Into<String>,
        product_code: impl Into<String>,
        quantity_rolls: u32,
        due_date: NaiveDate,
        priority: OrderPriority,
    ) -> Self {
        Self {
            order_id: order_id.into(),
            product_code: product_code.into(),
            quantity_rolls,
            due_date,
            priority,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        }
    }

    /// 2롤 사이클 단위로 올림한 배정 롤 수
    ///
    /// # 반환
    /// (배정 롤 수, 이월 롤 수) — 홀수 요청은 다음 짝수로 올림하고
    /// 올림 델타를 이월 수량으로 기록한다. 절사는 금지.
    pub fn cycle_aligned_rolls(&self, rolls_per_cycle: u32) -> (u32, u32) {
        let unit = rolls_per_cycle.max(1);
        let remainder = self.quantity_rolls % unit;
        if remainder == 0 {
            (self.quantity_rolls, 0)
        } else {
            let shortfall = unit - remainder;
            (self.quantity_rolls + shortfall, shortfall)
        }
    }
}
