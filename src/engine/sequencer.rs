// ==========================================
// PE 필름 생산 스케줄링 시스템 - 순서 최적화 엔진
// ==========================================
// 책임: 기계별 로트 후보 → 시작/종료 시각이 확정된 총순서
// 목적: (1) 납기 준수 (하드 필터)
//       (2) 셋업 분 합계 최소화 (최근접 이웃)
//       (3) 밝은색→어두운색 전환 선호 (가중치 tie-break)
// ==========================================
// 납기 불능 시에도 실행은 계속한다: 위반 주문별 DueDateMiss를
// 명시 보고하고 부분 스케줄을 반환한다
// ==========================================

use crate::config::PlanningConfig;
use crate::domain::lot::Lot;
use crate::domain::machine::Machine;
use crate::domain::schedule::{DueDateMiss, MachineSchedule, ScheduledLot};
use crate::domain::types::ColorCategory;
use crate::engine::setup_matrix::SetupMatrix;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

// ==========================================
// WorkCalendar - 근무 시간 달력
// ==========================================
// 근무 창 밖으로 넘치는 작업은 다음 날 창 시작으로 이어진다
#[derive(Debug, Clone, Copy)]
pub struct WorkCalendar {
    start_hour: u32,
    end_hour: u32,
}

impl WorkCalendar {
    pub fn new(start_hour: u32, end_hour: u32) -> Self {
        // 퇴화 창(start >= end, 24시 초과) 방지
        let start_hour = start_hour.min(22);
        let end_hour = end_hour.clamp(start_hour + 1, 23);
        Self {
            start_hour,
            end_hour,
        }
    }

    pub fn from_config(config: &PlanningConfig) -> Self {
        Self::new(config.work_start_hour, config.work_end_hour)
    }

    pub fn day_start(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(NaiveTime::from_hms_opt(self.start_hour, 0, 0).unwrap_or(NaiveTime::MIN))
    }

    fn day_end(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(NaiveTime::from_hms_opt(self.end_hour, 0, 0).unwrap_or(NaiveTime::MIN))
    }

    /// 근무 창 안으로 정규화 (창 이전 → 창 시작, 창 이후 → 익일 창 시작)
    pub fn normalize(&self, t: NaiveDateTime) -> NaiveDateTime {
        let start = self.day_start(t.date());
        let end = self.day_end(t.date());
        if t < start {
            start
        } else if t >= end {
            self.day_start(t.date() + Duration::days(1))
        } else {
            t
        }
    }

    /// from 시각에서 근무 분을 소비한 종료 시각
    pub fn advance(&self, from: NaiveDateTime, minutes: i64) -> NaiveDateTime {
        let mut cursor = self.normalize(from);
        let mut remaining = minutes.max(0);
        loop {
            let window_left = (self.day_end(cursor.date()) - cursor).num_minutes();
            if remaining <= window_left {
                return cursor + Duration::minutes(remaining);
            }
            remaining -= window_left;
            cursor = self.day_start(cursor.date() + Duration::days(1));
        }
    }
}

/// 순서 확정 결과
#[derive(Debug, Clone)]
pub struct SequencingResult {
    pub machines: Vec<MachineSchedule>,
    pub due_date_misses: Vec<DueDateMiss>,
}

// 로트 1건의 비용 분해
struct LotCost {
    entry_setup: i64,
    internal_setup: i64,
    production: i64,
}

impl LotCost {
    fn total(&self) -> i64 {
        self.entry_setup + self.internal_setup + self.production
    }
}

// ==========================================
// SequenceOptimizer - 순서 최적화 엔진
// ==========================================
pub struct SequenceOptimizer {
    // 무상태 엔진
}

impl SequenceOptimizer {
    pub fn new() -> Self {
        Self {}
    }

    /// 로컬 그리디 순서 확정 (폴백 모드)
    ///
    /// 기계별로 독립 — 로트 배정이 고정되면 기계 간 공유 상태가 없다
    ///
    /// # 파라미터
    /// - lots: 그룹핑 결과 로트 (기계 배정 완료)
    /// - plan_date: 계획 시작일 (타임라인 원점)
    #[instrument(skip_all, fields(lots = lots.len(), %plan_date))]
    pub fn sequence(
        &self,
        lots: &[Lot],
        machines: &[Machine],
        matrix: &SetupMatrix,
        config: &PlanningConfig,
        plan_date: NaiveDate,
    ) -> SequencingResult {
        let calendar = WorkCalendar::from_config(config);
        let mut by_machine: BTreeMap<&str, Vec<&Lot>> = BTreeMap::new();
        for lot in lots {
            by_machine.entry(lot.machine_id.as_str()).or_default().push(lot);
        }

        let machine_map: BTreeMap<&str, &Machine> = machines
            .iter()
            .map(|m| (m.machine_id.as_str(), m))
            .collect();

        let mut schedules: Vec<MachineSchedule> = Vec::new();
        let mut misses: Vec<DueDateMiss> = Vec::new();

        for (machine_id, machine_lots) in by_machine {
            let machine = match machine_map.get(machine_id) {
                Some(m) => *m,
                None => continue, // 그룹퍼가 명단 밖 기계를 배정하는 일은 없다
            };
            let (schedule, machine_misses) =
                self.sequence_machine(machine, machine_lots, matrix, config, &calendar, plan_date);
            schedules.push(schedule);
            misses.extend(machine_misses);
        }

        misses.sort_by(|a, b| a.order_id.cmp(&b.order_id));
        SequencingResult {
            machines: schedules,
            due_date_misses: misses,
        }
    }

    // 기계 1대의 총순서 확정 (최근접 이웃 + 납기 하드 필터)
    fn sequence_machine(
        &self,
        machine: &Machine,
        lots: Vec<&Lot>,
        matrix: &SetupMatrix,
        config: &PlanningConfig,
        calendar: &WorkCalendar,
        plan_date: NaiveDate,
    ) -> (MachineSchedule, Vec<DueDateMiss>) {
        let mut pending: Vec<&Lot> = lots;
        pending.sort_by(|a, b| a.lot_id.cmp(&b.lot_id));

        let mut cursor = calendar.day_start(plan_date);
        let mut current_color: Option<ColorCategory> = machine.current_setup;
        let mut slots: Vec<ScheduledLot> = Vec::new();
        let mut misses: Vec<DueDateMiss> = Vec::new();

        while !pending.is_empty() {
            let pick = self.pick_next(
                &pending,
                machine,
                matrix,
                config,
                calendar,
                cursor,
                current_color,
            );
            let lot = pending.remove(pick);

            let cost = self.lot_cost(lot, machine, matrix, config, current_color);
            let start = calendar.normalize(cursor);
            let end = calendar.advance(start, cost.total());

            for entry in &lot.entries {
                if end.date() > entry.due_date {
                    let days_late = (end.date() - entry.due_date).num_days();
                    debug!(
                        order_id = %entry.order_id,
                        machine_id = %machine.machine_id,
                        days_late,
                        "납기 초과 보고"
                    );
                    misses.push(DueDateMiss {
                        order_id: entry.order_id.clone(),
                        machine_id: machine.machine_id.clone(),
                        days_late,
                    });
                }
            }

            let transition_to = lot.lead_color();
            slots.push(ScheduledLot {
                lot: lot.clone(),
                start_time: start,
                end_time: end,
                setup_minutes: cost.entry_setup + cost.internal_setup,
                transition_from: current_color,
                transition_to,
            });

            current_color = lot.tail_color().or(current_color);
            cursor = end;
        }

        (
            MachineSchedule {
                machine_id: machine.machine_id.clone(),
                slots,
            },
            misses,
        )
    }

    // 다음 로트 선택
    //
    // 1) 지금 배정해도 납기를 지키고, 다른 납기 가능 로트를 깨뜨리지
    //    않는 후보 중 가중 점수 최소
    // 2) 그런 후보가 없으면 자기 납기라도 지키는 후보 중 선택
    // 3) 전부 지연이면 최조기 납기(EDD)
    #[allow(clippy::too_many_arguments)]
    fn pick_next(
        &self,
        pending: &[&Lot],
        machine: &Machine,
        matrix: &SetupMatrix,
        config: &PlanningConfig,
        calendar: &WorkCalendar,
        cursor: NaiveDateTime,
        current_color: Option<ColorCategory>,
    ) -> usize {
        let n = pending.len();
        if n == 1 {
            return 0;
        }

        // 후보별 즉시 배정 시 종료 시각과 납기 가능 여부
        let mut end_if_next: Vec<NaiveDateTime> = Vec::with_capacity(n);
        let mut feasible: Vec<bool> = Vec::with_capacity(n);
        for lot in pending {
            let cost = self.lot_cost(lot, machine, matrix, config, current_color);
            let end = calendar.advance(cursor, cost.total());
            let ok = lot
                .due_deadline()
                .map(|d| end.date() <= d)
                .unwrap_or(true);
            end_if_next.push(end);
            feasible.push(ok);
        }

        // i를 먼저 배정해도 다른 납기 가능 로트 j가 전부 살아남는가
        let harmless = |i: usize| -> bool {
            let after_i = pending[i].tail_color().or(current_color);
            for (j, lot_j) in pending.iter().enumerate() {
                if j == i || !feasible[j] {
                    continue;
                }
                let cost_j = self.lot_cost(lot_j, machine, matrix, config, after_i);
                let end_j = calendar.advance(end_if_next[i], cost_j.total());
                let still_ok = lot_j
                    .due_deadline()
                    .map(|d| end_j.date() <= d)
                    .unwrap_or(true);
                if !still_ok {
                    return false;
                }
            }
            true
        };

        let mut pool: Vec<usize> = (0..n).filter(|&i| feasible[i] && harmless(i)).collect();
        if pool.is_empty() {
            pool = (0..n).filter(|&i| feasible[i]).collect();
        }
        if pool.is_empty() {
            // 전부 지연 → EDD, 동률은 로트 ID
            return (0..n)
                .min_by_key(|&i| (pending[i].due_deadline(), pending[i].lot_id.clone()))
                .unwrap_or(0);
        }

        // 가중 점수: 셋업 분 + 역방향(어두움→밝음) 전환 페널티 - 폭 활용률
        let weights = &config.weights;
        let score = |i: usize| -> f64 {
            let lot = pending[i];
            let cost = self.lot_cost(lot, machine, matrix, config, current_color);
            let shade_penalty = match (current_color, lot.lead_color()) {
                (Some(cur), Some(lead)) if lead.shade_rank() < cur.shade_rank() => 1.0,
                _ => 0.0,
            };
            let width_util = if machine.width_max_mm > 0 {
                lot.mean_width_mm() / machine.width_max_mm as f64
            } else {
                0.0
            };
            weights.setup_weight * (cost.entry_setup + cost.internal_setup) as f64
                + weights.shade_order_weight * shade_penalty
                - weights.width_util_weight * width_util
        };

        pool.sort_by(|&a, &b| {
            score(a)
                .total_cmp(&score(b))
                .then_with(|| pending[a].due_deadline().cmp(&pending[b].due_deadline()))
                .then_with(|| pending[a].lot_id.cmp(&pending[b].lot_id))
        });
        pool[0]
    }

    // 로트 비용 분해: 진입 셋업 + 내부 전환 셋업 + 생산 시간
    fn lot_cost(
        &self,
        lot: &Lot,
        machine: &Machine,
        matrix: &SetupMatrix,
        config: &PlanningConfig,
        current_color: Option<ColorCategory>,
    ) -> LotCost {
        let entry_setup = match lot.lead_color() {
            Some(lead) => matrix.minutes(current_color, lead),
            None => 0,
        };
        let internal_setup = lot
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
        let production = machine.production_minutes(lot.total_rolls(), config.meters_per_roll);
        LotCost {
            entry_setup,
            internal_setup,
            production,
        }
    }
}

impl Default for SequenceOptimizer {
    fn default() -> Self {
        Self::new()
    }
}
