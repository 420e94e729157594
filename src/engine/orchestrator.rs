// ==========================================
// PE 필름 생산 스케줄링 시스템 - 계획 실행 편성기
// ==========================================
// 계산 주류: 호환성 인덱스 재계산 → 로트 그룹핑 →
//            APS 위임 시도 (타임아웃 강제) → 검증/수용 또는 폴백
// ==========================================
// 실행 단위: 단일 스레드, 인덱스는 실행 소유의 불변 스냅샷
// 동일 스냅샷 입력 → 동일 스케줄 출력 (모든 tie-break 총순서)
// ==========================================

use crate::aps::{solve_with_timeout, ApsEngine, ApsRequest, OperationPlan, PlanOutcome};
use crate::config::PlanningConfig;
use crate::domain::lot::Lot;
use crate::domain::machine::Machine;
use crate::domain::order::Order;
use crate::domain::product::Product;
use crate::domain::schedule::{DueDateMiss, MachineSchedule, Schedule, ScheduledLot};
use crate::domain::types::EngineMode;
use crate::engine::compatibility::CompatibilityIndex;
use crate::engine::grouper::LotGrouper;
use crate::engine::sequencer::{SequenceOptimizer, SequencingResult};
use crate::engine::setup_matrix::SetupMatrix;
use crate::error::PlanningError;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// 계획 실행 입력 스냅샷
///
/// 실행 중 변경되지 않는다. 카탈로그가 바뀌면 새 스냅샷으로
/// 새 실행을 시작한다 (가변 싱글턴 금지, 재현성 우선)
#[derive(Debug, Clone)]
pub struct PlanningSnapshot {
    pub orders: Vec<Order>,
    pub products: Vec<Product>,
    pub machines: Vec<Machine>,
    pub setup_matrix: SetupMatrix,
}

// ==========================================
// PlanningOrchestrator - 계획 실행 편성기
// ==========================================
pub struct PlanningOrchestrator<E>
where
    E: ApsEngine,
{
    engine: Arc<E>,
    grouper: LotGrouper,
    sequencer: SequenceOptimizer,
    config: PlanningConfig,
}

impl<E> PlanningOrchestrator<E>
where
    E: ApsEngine,
{
    pub fn new(engine: Arc<E>, config: PlanningConfig) -> Self {
        Self {
            engine,
            grouper: LotGrouper::new(),
            sequencer: SequenceOptimizer::new(),
            config,
        }
    }

    /// 계획 실행 1회
    ///
    /// # 에러
    /// 카탈로그 정합성 위반(미지 제품/기계, 빈 명단)만 치명.
    /// 주문 단위 실패는 스케줄 주석으로 동반된다
    #[instrument(skip_all, fields(%plan_date, orders = snapshot.orders.len()))]
    pub async fn run(
        &self,
        snapshot: &PlanningSnapshot,
        plan_date: NaiveDate,
    ) -> Result<Schedule, PlanningError> {
        let run_id = Uuid::new_v4().to_string();
        info!(%run_id, "계획 실행 시작");

        // === 1단계: 호환성 인덱스 (전체 재계산) ===
        let index = CompatibilityIndex::build(
            &snapshot.products,
            &snapshot.machines,
            self.config.width_tolerance_mm,
        )?;

        // === 2단계: 로트 그룹핑 ===
        let grouping = self.grouper.group(
            &snapshot.orders,
            &snapshot.products,
            &snapshot.machines,
            &index,
            &self.config,
        )?;
        info!(
            lots = grouping.lots.len(),
            rejected = grouping.rejected.len(),
            "로트 그룹핑 완료"
        );

        // === 3단계: APS 위임 시도 → 검증/수용 또는 폴백 ===
        let request = ApsRequest::from_lots(
            &run_id,
            plan_date,
            &grouping.lots,
            &snapshot.machines,
            &snapshot.products,
            &self.config,
        );
        let outcome = solve_with_timeout(
            self.engine.as_ref(),
            &request,
            Duration::from_secs(self.config.aps_timeout_secs),
        )
        .await;

        let (sequencing, engine_mode) = match outcome {
            PlanOutcome::Success(plan) => {
                match self.import_plan(&plan, &grouping.lots, snapshot, &index) {
                    Ok(sequencing) => (sequencing, EngineMode::ApsDelegate),
                    Err(reason) => {
                        warn!(%reason, "APS 응답 검증 실패, 폴백 전환");
                        (
                            self.fallback(&grouping.lots, snapshot, plan_date),
                            EngineMode::GreedyFallback,
                        )
                    }
                }
            }
            PlanOutcome::Timeout => {
                let unavailable = PlanningError::ExternalEngineUnavailable {
                    reason: "타임아웃".to_string(),
                };
                warn!(error = %unavailable, "폴백 전환");
                (
                    self.fallback(&grouping.lots, snapshot, plan_date),
                    EngineMode::GreedyFallback,
                )
            }
            PlanOutcome::Malformed(reason) => {
                let unavailable = PlanningError::ExternalEngineUnavailable { reason };
                warn!(error = %unavailable, "폴백 전환");
                (
                    self.fallback(&grouping.lots, snapshot, plan_date),
                    EngineMode::GreedyFallback,
                )
            }
        };

        let schedule = Schedule {
            run_id,
            plan_date,
            engine_mode,
            machines: sequencing.machines,
            rejected: grouping.rejected,
            due_date_misses: sequencing.due_date_misses,
            cycle_notes: grouping.cycle_notes,
        };

        let summary = schedule.summary();
        info!(
            engine_mode = %summary.engine_mode,
            total_orders = summary.total_orders,
            rejected = summary.rejected_orders,
            misses = summary.due_date_misses,
            setup_min = summary.total_setup_minutes,
            "계획 실행 완료"
        );
        Ok(schedule)
    }

    fn fallback(
        &self,
        lots: &[Lot],
        snapshot: &PlanningSnapshot,
        plan_date: NaiveDate,
    ) -> SequencingResult {
        self.sequencer.sequence(
            lots,
            &snapshot.machines,
            &snapshot.setup_matrix,
            &self.config,
            plan_date,
        )
    }

    // APS 응답 검증 및 수용
    //
    // 검증 규칙:
    //   - 모든 로트가 정확히 1회 등장 (누락/중복/미지 로트 불가)
    //   - 공정의 기계 = 로트 배정 기계, 명단 내 기계
    //   - 기계별 시간 겹침 없음, start ≤ end
    // 위반 시 사유 문자열 반환 → 호출부가 Malformed로 취급
    fn import_plan(
        &self,
        plan: &OperationPlan,
        lots: &[Lot],
        snapshot: &PlanningSnapshot,
        index: &CompatibilityIndex,
    ) -> Result<SequencingResult, String> {
        let matrix = &snapshot.setup_matrix;
        let lot_map: BTreeMap<&str, &Lot> =
            lots.iter().map(|l| (l.lot_id.as_str(), l)).collect();
        let machine_map: BTreeMap<&str, &Machine> = snapshot
            .machines
            .iter()
            .map(|m| (m.machine_id.as_str(), m))
            .collect();

        if plan.operations.len() != lots.len() {
            return Err(format!(
                "공정 수 불일치: 로트 {}건, 응답 {}건",
                lots.len(),
                plan.operations.len()
            ));
        }

        let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
        for op in &plan.operations {
            *seen.entry(op.operation_id.as_str()).or_insert(0) += 1;
        }
        for lot in lots {
            match seen.get(lot.lot_id.as_str()) {
                Some(1) => {}
                Some(n) => return Err(format!("로트 중복 배정: {} ({}회)", lot.lot_id, n)),
                None => return Err(format!("로트 누락: {}", lot.lot_id)),
            }
        }

        let mut by_machine: BTreeMap<String, Vec<ScheduledLot>> = BTreeMap::new();
        let mut misses: Vec<DueDateMiss> = Vec::new();

        for op in &plan.operations {
            let lot = lot_map
                .get(op.operation_id.as_str())
                .ok_or_else(|| format!("미지 로트: {}", op.operation_id))?;
            index
                .assert_known_machine(&op.resource_id)
                .map_err(|e| e.to_string())?;
            if op.resource_id != lot.machine_id {
                return Err(format!(
                    "기계 불일치: 로트 {}는 {} 배정, 응답은 {}",
                    lot.lot_id, lot.machine_id, op.resource_id
                ));
            }
            if op.end_time < op.start_time {
                return Err(format!("시각 역전: {}", op.operation_id));
            }

            by_machine
                .entry(op.resource_id.clone())
                .or_default()
                .push(ScheduledLot {
                    lot: (*lot).clone(),
                    start_time: op.start_time,
                    end_time: op.end_time,
                    setup_minutes: 0, // 전환 순서 확정 후 아래에서 계산
                    transition_from: None,
                    transition_to: lot.lead_color(),
                });
        }

        // 기계별 시간순 정렬 + 겹침 검증 + 셋업 분 재계산
        let mut schedules: Vec<MachineSchedule> = Vec::new();
        for (machine_id, mut slots) in by_machine {
            slots.sort_by(|a, b| {
                a.start_time
                    .cmp(&b.start_time)
                    .then_with(|| a.lot.lot_id.cmp(&b.lot.lot_id))
            });
            for w in slots.windows(2) {
                if w[1].start_time < w[0].end_time {
                    return Err(format!(
                        "기계 {} 시간 겹침: {} ↔ {}",
                        machine_id, w[0].lot.lot_id, w[1].lot.lot_id
                    ));
                }
            }

            let machine = machine_map
                .get(machine_id.as_str())
                .ok_or_else(|| format!("미지 기계: {}", machine_id))?;
            let mut current = machine.current_setup;
            for slot in &mut slots {
                let entry_setup = match slot.lot.lead_color() {
                    Some(lead) => matrix.minutes(current, lead),
                    None => 0,
                };
                let internal_setup: i64 = slot
                    .lot
                    .entries
                    .windows(2)
                    .map(|w| {
                        if w[0].color == w[1].color {
                            0
                        } else {
                            matrix.minutes(Some(w[0].color), w[1].color)
                        }
                    })
                    .sum();
                slot.setup_minutes = entry_setup + internal_setup;
                slot.transition_from = current;
                current = slot.lot.tail_color().or(current);

                for entry in &slot.lot.entries {
                    if slot.end_time.date() > entry.due_date {
                        misses.push(DueDateMiss {
                            order_id: entry.order_id.clone(),
                            machine_id: machine_id.clone(),
                            days_late: (slot.end_time.date() - entry.due_date).num_days(),
                        });
                    }
                }
            }

            schedules.push(MachineSchedule { machine_id, slots });
        }

        misses.sort_by(|a, b| a.order_id.cmp(&b.order_id));
        Ok(SequencingResult {
            machines: schedules,
            due_date_misses: misses,
        })
    }
}
