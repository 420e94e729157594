// ==========================================
// PE 필름 생산 스케줄링 시스템 - 로트 그룹핑 엔진
// ==========================================
// 책임: 미배정 주문 → 기계별 혼합생산 로트 후보
// 입력: 주문 + 제품 카탈로그 + 호환성 인덱스
// 출력: GroupingResult (로트 + 기각 주문 + 사이클 올림 기록)
// ==========================================
// 정렬 키: 우선순위 내림차순 → 납기 오름차순 → 폭 그룹 →
//          수량 내림차순 (로트 파편화 감소) → 주문 ID (결정성)
// 기계 선택: 혼합생산 우선 — 같은 폭 그룹의 열린 로트에 여유가
//            있는 기계를 먼저, 없으면 적재 부하 최소 기계에 새 로트
// ==========================================

use crate::config::PlanningConfig;
use crate::domain::lot::{Lot, LotEntry};
use crate::domain::machine::Machine;
use crate::domain::order::Order;
use crate::domain::product::Product;
use crate::domain::schedule::{CycleRoundingNote, RejectedOrder};
use crate::domain::types::{OrderStatus, WidthGroupId};
use crate::engine::compatibility::CompatibilityIndex;
use crate::error::PlanningError;
use std::collections::BTreeMap;
use tracing::{instrument, warn};

/// 기각 사유 코드
pub const REASON_NO_COMPATIBLE_MACHINE: &str = "NO_COMPATIBLE_MACHINE";

/// 그룹핑 결과
#[derive(Debug, Clone)]
pub struct GroupingResult {
    /// 기계별 로트 후보 (로트 ID순)
    pub lots: Vec<Lot>,
    /// 호환 기계가 없어 기각된 주문
    pub rejected: Vec<RejectedOrder>,
    /// 홀수 수량 자동 보정 기록
    pub cycle_notes: Vec<CycleRoundingNote>,
}

// 기계별 적재 상태
struct MachineLoad {
    load_minutes: i64,
    open_lot: Option<Lot>,
    open_lot_minutes: i64,
    lot_seq: u32,
}

// ==========================================
// LotGrouper - 로트 그룹핑 엔진
// ==========================================
pub struct LotGrouper {
    // 무상태 엔진
}

impl LotGrouper {
    pub fn new() -> Self {
        Self {}
    }

    /// 미배정 주문을 로트 후보로 그룹핑
    ///
    /// # 파라미터
    /// - orders: 계획 지평의 주문 (PENDING만 대상)
    /// - products: 제품 카탈로그
    /// - machines: 기계 명단
    /// - index: 호환성 인덱스 (같은 카탈로그 스냅샷에서 생성되어야 함)
    ///
    /// # 에러
    /// 주문이 참조하는 제품이 카탈로그에 없으면 UnknownProduct (치명)
    #[instrument(skip_all, fields(orders = orders.len()))]
    pub fn group(
        &self,
        orders: &[Order],
        products: &[Product],
        machines: &[Machine],
        index: &CompatibilityIndex,
        config: &PlanningConfig,
    ) -> Result<GroupingResult, PlanningError> {
        let product_map: BTreeMap<&str, &Product> = products
            .iter()
            .map(|p| (p.product_code.as_str(), p))
            .collect();
        let machine_map: BTreeMap<&str, &Machine> = machines
            .iter()
            .map(|m| (m.machine_id.as_str(), m))
            .collect();

        // === 1단계: 정렬 키 수집 (미지 제품은 여기서 치명 처리) ===
        let mut pending: Vec<(&Order, WidthGroupId)> = Vec::new();
        for order in orders.iter().filter(|o| o.status == OrderStatus::Pending) {
            if !product_map.contains_key(order.product_code.as_str()) {
                return Err(PlanningError::UnknownProduct {
                    product_code: order.product_code.clone(),
                });
            }
            let group = index.width_group(&order.product_code)?;
            pending.push((order, group));
        }

        pending.sort_by(|(a, ga), (b, gb)| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| a.due_date.cmp(&b.due_date))
                .then_with(|| ga.cmp(gb))
                .then_with(|| b.quantity_rolls.cmp(&a.quantity_rolls))
                .then_with(|| a.order_id.cmp(&b.order_id))
        });

        // === 2단계: 그리디 적재 ===
        let mut loads: BTreeMap<String, MachineLoad> = machines
            .iter()
            .map(|m| {
                (
                    m.machine_id.clone(),
                    MachineLoad {
                        load_minutes: 0,
                        open_lot: None,
                        open_lot_minutes: 0,
                        lot_seq: 0,
                    },
                )
            })
            .collect();

        let mut lots: Vec<Lot> = Vec::new();
        let mut rejected: Vec<RejectedOrder> = Vec::new();
        let mut cycle_notes: Vec<CycleRoundingNote> = Vec::new();
        let ceiling = config.work_minutes_per_day();

        for (order, group) in pending {
            let compatible = index.compatible_machines(&order.product_code)?;
            if compatible.is_empty() {
                warn!(
                    order_id = %order.order_id,
                    product_code = %order.product_code,
                    "호환 기계 없음, 주문 기각"
                );
                rejected.push(RejectedOrder {
                    order_id: order.order_id.clone(),
                    product_code: order.product_code.clone(),
                    reason: REASON_NO_COMPATIBLE_MACHINE.to_string(),
                });
                continue;
            }

            // 사이클 정렬 (홀수 → 올림 + 이월 기록)
            let (rolls, carry_over) = order.cycle_aligned_rolls(config.rolls_per_cycle);
            if carry_over > 0 {
                warn!(
                    order_id = %order.order_id,
                    requested = order.quantity_rolls,
                    scheduled = rolls,
                    carry_over,
                    "사이클 미정합 수량, 올림 보정"
                );
                cycle_notes.push(CycleRoundingNote {
                    order_id: order.order_id.clone(),
                    requested_rolls: order.quantity_rolls,
                    scheduled_rolls: rolls,
                    carry_over_rolls: carry_over,
                });
            }

            // 열린 로트에 이 주문이 들어갈 수 있는가
            let fits_open = |machine_id: &str| -> bool {
                let load = &loads[machine_id];
                let machine = machine_map[machine_id];
                match &load.open_lot {
                    Some(lot) => {
                        let new_products = if lot
                            .entries
                            .iter()
                            .any(|e| e.product_code == order.product_code)
                        {
                            lot.distinct_product_count()
                        } else {
                            lot.distinct_product_count() + 1
                        };
                        let max_items =
                            machine.max_items_per_cycle.min(config.max_items_per_machine);
                        let entry_minutes =
                            machine.production_minutes(rolls, config.meters_per_roll);
                        lot.width_group == group
                            && new_products <= max_items
                            && load.open_lot_minutes + entry_minutes <= ceiling
                    }
                    None => false,
                }
            };

            // 혼합생산 우선: 수용 가능한 열린 로트 보유 기계 → 적재 부하 최소,
            // 없으면 전체 적재 부하 최소 기계 (동률은 기계 ID순)
            let machine_id = compatible
                .iter()
                .filter(|id| fits_open(id.as_str()))
                .min_by_key(|id| (loads[id.as_str()].load_minutes, id.as_str()))
                .or_else(|| {
                    compatible
                        .iter()
                        .min_by_key(|id| (loads[id.as_str()].load_minutes, id.as_str()))
                })
                .cloned()
                .ok_or_else(|| PlanningError::InternalError("빈 호환 집합".to_string()))?;

            let machine = machine_map[machine_id.as_str()];
            let product = product_map[order.product_code.as_str()];
            let entry_minutes = machine.production_minutes(rolls, config.meters_per_roll);
            let opens_new = !fits_open(machine_id.as_str());

            let load = loads
                .get_mut(&machine_id)
                .ok_or_else(|| PlanningError::InternalError(format!("미등록 기계 {machine_id}")))?;
            if opens_new {
                if let Some(full) = load.open_lot.take() {
                    lots.push(full);
                }
                load.lot_seq += 1;
                // 0 패딩: 로트 ID 사전순 정렬이 생성 순서와 일치해야 한다
                load.open_lot = Some(Lot::new(
                    format!("{}-L{:03}", machine_id, load.lot_seq),
                    machine_id.clone(),
                    group,
                ));
                load.open_lot_minutes = 0;
            }

            let lot = load
                .open_lot
                .as_mut()
                .ok_or_else(|| PlanningError::InternalError("열린 로트 없음".to_string()))?;
            lot.entries.push(LotEntry {
                order_id: order.order_id.clone(),
                product_code: order.product_code.clone(),
                color: product.color,
                width_mm: product.width_mm,
                rolls,
                carry_over_rolls: carry_over,
                due_date: order.due_date,
                priority: order.priority,
            });
            load.open_lot_minutes += entry_minutes;
            load.load_minutes += entry_minutes;
        }

        // 열린 로트 마감 (기계 ID순 → 결정적)
        for (_, load) in loads.iter_mut() {
            if let Some(lot) = load.open_lot.take() {
                lots.push(lot);
            }
        }

        // 로트 내부 순서 확정 (밝은색→어두운색)
        for lot in &mut lots {
            lot.sort_entries_light_to_dark();
        }
        lots.sort_by(|a, b| a.lot_id.cmp(&b.lot_id));

        Ok(GroupingResult {
            lots,
            rejected,
            cycle_notes,
        })
    }
}

impl Default for LotGrouper {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{ColorCategory, OrderPriority};
    use chrono::NaiveDate;

    fn due(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, day).unwrap()
    }

    fn order(id: &str, code: &str, rolls: u32, day: u32) -> Order {
        Order::new(id, code, rolls, due(day), OrderPriority::Normal)
    }

    fn catalog() -> (Vec<Product>, Vec<Machine>) {
        let products = vec![
            Product::new("PE-FILM-500", 500, ColorCategory::Clear),
            Product::new("PE-FILM-550", 550, ColorCategory::Color),
            Product::new("PE-FILM-600", 600, ColorCategory::Clear),
            Product::new("PE-FILM-1600", 1600, ColorCategory::Clear),
        ];
        let machines = vec![
            Machine::new("M1", "1호기", 400, 600),
            Machine::new("M2", "2호기", 400, 600),
        ];
        (products, machines)
    }

    fn run_grouper(orders: &[Order]) -> GroupingResult {
        let (products, machines) = catalog();
        let config = PlanningConfig::default();
        let index =
            CompatibilityIndex::build(&products, &machines, config.width_tolerance_mm).unwrap();
        LotGrouper::new()
            .group(orders, &products, &machines, &index, &config)
            .unwrap()
    }

    #[test]
    fn compatible_orders_pack_into_mixed_lot() {
        let orders = vec![
            order("O1", "PE-FILM-500", 2, 15),
            order("O2", "PE-FILM-550", 2, 15),
        ];
        let result = run_grouper(&orders);
        assert!(result.rejected.is_empty());
        // 같은 폭 그룹, 용량 여유 → 혼합생산 우선으로 같은 로트
        assert_eq!(result.lots.len(), 1);
        assert_eq!(result.lots[0].distinct_product_count(), 2);
    }

    #[test]
    fn distinct_item_limit_opens_new_lot() {
        let (products, mut machines) = catalog();
        machines.truncate(1);
        machines[0].max_items_per_cycle = 1;
        let config = PlanningConfig::default();
        let index =
            CompatibilityIndex::build(&products, &machines, config.width_tolerance_mm).unwrap();
        let orders = vec![
            order("O1", "PE-FILM-500", 2, 15),
            order("O2", "PE-FILM-550", 2, 15),
        ];
        let result = LotGrouper::new()
            .group(&orders, &products, &machines, &index, &config)
            .unwrap();
        assert_eq!(result.lots.len(), 2);
        for lot in &result.lots {
            assert!(lot.distinct_product_count() <= 1);
        }
    }

    #[test]
    fn different_width_groups_balance_across_machines() {
        // 폭 그룹이 다르면 혼합 불가 → 적재 부하 최소 기계로 분산
        let products = vec![
            Product::new("PE-FILM-400", 400, ColorCategory::Clear),
            Product::new("PE-FILM-700", 700, ColorCategory::Clear),
        ];
        let machines = vec![
            Machine::new("M1", "1호기", 400, 800),
            Machine::new("M2", "2호기", 400, 800),
        ];
        let config = PlanningConfig::default();
        let index =
            CompatibilityIndex::build(&products, &machines, config.width_tolerance_mm).unwrap();
        let orders = vec![
            order("O1", "PE-FILM-400", 4, 15),
            order("O2", "PE-FILM-700", 4, 16),
        ];
        let result = LotGrouper::new()
            .group(&orders, &products, &machines, &index, &config)
            .unwrap();
        let by_machine: Vec<&str> = result.lots.iter().map(|l| l.machine_id.as_str()).collect();
        assert_eq!(by_machine, vec!["M1", "M2"]);
    }

    #[test]
    fn incompatible_order_is_rejected_not_dropped() {
        let orders = vec![
            order("O1", "PE-FILM-1600", 2, 15),
            order("O2", "PE-FILM-500", 2, 15),
        ];
        let result = run_grouper(&orders);
        assert_eq!(result.rejected.len(), 1);
        assert_eq!(result.rejected[0].order_id, "O1");
        assert_eq!(result.rejected[0].reason, REASON_NO_COMPATIBLE_MACHINE);
        // 나머지 주문은 정상 배정
        assert_eq!(result.lots.len(), 1);
    }

    #[test]
    fn odd_quantity_rounds_up_and_records_carry_over() {
        let orders = vec![order("O1", "PE-FILM-500", 1001, 15)];
        let result = run_grouper(&orders);
        assert_eq!(result.cycle_notes.len(), 1);
        let note = &result.cycle_notes[0];
        assert_eq!(note.requested_rolls, 1001);
        assert_eq!(note.scheduled_rolls, 1002);
        assert_eq!(note.carry_over_rolls, 1);
        assert_eq!(result.lots[0].total_rolls() % 2, 0);
    }

    #[test]
    fn unknown_product_on_order_is_fatal() {
        let (products, machines) = catalog();
        let config = PlanningConfig::default();
        let index =
            CompatibilityIndex::build(&products, &machines, config.width_tolerance_mm).unwrap();
        let orders = vec![order("O1", "NOPE", 2, 15)];
        let err = LotGrouper::new()
            .group(&orders, &products, &machines, &index, &config)
            .unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn all_lots_hold_even_roll_counts() {
        let orders = vec![
            order("O1", "PE-FILM-500", 3, 15),
            order("O2", "PE-FILM-550", 5, 15),
            order("O3", "PE-FILM-600", 7, 16),
        ];
        let result = run_grouper(&orders);
        for lot in &result.lots {
            assert_eq!(lot.total_rolls() % 2, 0, "lot {}", lot.lot_id);
        }
    }

    #[test]
    fn capacity_ceiling_closes_the_open_lot() {
        // 하루 근무 분(720)을 넘기는 추가 적재는 새 로트로
        let (products, mut machines) = catalog();
        machines.truncate(1);
        machines[0].speed_m_per_min = 1000.0; // 1롤 = 1분
        let config = PlanningConfig::default();
        let index =
            CompatibilityIndex::build(&products, &machines, config.width_tolerance_mm).unwrap();
        let orders = vec![
            order("O1", "PE-FILM-500", 500, 15),
            order("O2", "PE-FILM-550", 400, 15),
        ];
        let result = LotGrouper::new()
            .group(&orders, &products, &machines, &index, &config)
            .unwrap();
        // 500분 + 400분 > 720분 → 로트 분리
        assert_eq!(result.lots.len(), 2);
        assert_eq!(result.lots[0].lot_id, "M1-L001");
        assert_eq!(result.lots[1].lot_id, "M1-L002");
    }

    #[test]
    fn lot_ids_keep_creation_order_past_ten_lots() {
        // "L10" < "L2" 사전순 역전 방지 (0 패딩)
        let (products, mut machines) = catalog();
        machines.truncate(1);
        machines[0].max_items_per_cycle = 1;
        let config = PlanningConfig::default();
        let index =
            CompatibilityIndex::build(&products, &machines, config.width_tolerance_mm).unwrap();
        let orders: Vec<Order> = (0..12)
            .map(|i| {
                let code = if i % 2 == 0 { "PE-FILM-500" } else { "PE-FILM-550" };
                order(&format!("O{:02}", i + 1), code, 2, 15)
            })
            .collect();
        let result = LotGrouper::new()
            .group(&orders, &products, &machines, &index, &config)
            .unwrap();
        assert_eq!(result.lots.len(), 12);
        assert_eq!(result.lots[0].lot_id, "M1-L001");
        assert_eq!(result.lots[9].lot_id, "M1-L010");
        assert_eq!(result.lots[11].lot_id, "M1-L012");
        // 생성 순서 = 정렬 순서
        assert_eq!(result.lots[0].entries[0].order_id, "O01");
        assert_eq!(result.lots[11].entries[0].order_id, "O12");
    }
}
