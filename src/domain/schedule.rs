// ==========================================
// PE 필름 생산 스케줄링 시스템 - 스케줄 엔티티
// ==========================================
// 실행(run)의 최종 산출물, 확정 후 변경 금지
// 배정 불가/납기 초과는 스케줄에 주석으로 동반 (침묵 탈락 금지)
// ==========================================

use crate::domain::lot::Lot;
use crate::domain::types::{ColorCategory, EngineMode};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// 시간 배정이 끝난 로트 1건
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledLot {
    pub lot: Lot,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    /// 로트 진입 셋업 + 로트 내부 전환 셋업 합계 (분)
    pub setup_minutes: i64,
    /// 진입 전환 (직전 카테고리 → 로트 선두 카테고리)
    pub transition_from: Option<ColorCategory>,
    pub transition_to: Option<ColorCategory>,
}

/// 기계별 확정 스케줄
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineSchedule {
    pub machine_id: String,
    /// 시작 시각 오름차순, 겹침 없음
    pub slots: Vec<ScheduledLot>,
}

impl MachineSchedule {
    /// 같은 기계에서 시간 겹침이 존재하는지 (불변식 검사용)
    pub fn has_overlap(&self) -> bool {
        self.slots
            .windows(2)
            .any(|w| w[1].start_time < w[0].end_time)
    }

    pub fn total_setup_minutes(&self) -> i64 {
        self.slots.iter().map(|s| s.setup_minutes).sum()
    }
}

/// 배정 불가 주문 (기계 비호환)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedOrder {
    pub order_id: String,
    pub product_code: String,
    /// 사유 코드 ("NO_COMPATIBLE_MACHINE")
    pub reason: String,
}

/// 납기 초과 주석 (소프트 위반, 실행은 계속)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DueDateMiss {
    pub order_id: String,
    pub machine_id: String,
    pub days_late: i64,
}

/// 사이클 올림 기록 (홀수 수량 자동 보정)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleRoundingNote {
    pub order_id: String,
    pub requested_rolls: u32,
    pub scheduled_rolls: u32,
    pub carry_over_rolls: u32,
}

/// 일일 스케줄 (계획 실행의 최종 산출물)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// 계획 실행 식별자 (uuid v4)
    pub run_id: String,
    pub plan_date: NaiveDate,
    pub engine_mode: EngineMode,
    pub machines: Vec<MachineSchedule>,
    pub rejected: Vec<RejectedOrder>,
    pub due_date_misses: Vec<DueDateMiss>,
    pub cycle_notes: Vec<CycleRoundingNote>,
}

/// 스케줄 요약 (리포트/로그용)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub plan_date: NaiveDate,
    pub engine_mode: EngineMode,
    pub total_orders: usize,
    pub rejected_orders: usize,
    pub machines_used: usize,
    pub total_setup_minutes: i64,
    pub due_date_misses: usize,
    pub lots: usize,
}

impl Schedule {
    pub fn summary(&self) -> ScheduleSummary {
        let total_orders = self
            .machines
            .iter()
            .flat_map(|m| &m.slots)
            .map(|s| s.lot.entries.len())
            .sum();
        let machines_used = self.machines.iter().filter(|m| !m.slots.is_empty()).count();
        let total_setup_minutes = self.machines.iter().map(|m| m.total_setup_minutes()).sum();
        let lots = self.machines.iter().map(|m| m.slots.len()).sum();

        ScheduleSummary {
            plan_date: self.plan_date,
            engine_mode: self.engine_mode,
            total_orders,
            rejected_orders: self.rejected.len(),
            machines_used,
            total_setup_minutes,
            due_date_misses: self.due_date_misses.len(),
            lots,
        }
    }

    /// 특정 주문이 배정된 횟수 (불변식: 기각되지 않았다면 정확히 1)
    pub fn placement_count(&self, order_id: &str) -> usize {
        self.machines
            .iter()
            .flat_map(|m| &m.slots)
            .flat_map(|s| &s.lot.entries)
            .filter(|e| e.order_id == order_id)
            .count()
    }
}
