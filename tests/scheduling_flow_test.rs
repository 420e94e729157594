// ==========================================
// 스케줄링 플로우 통합 테스트
// ==========================================
// 시나리오: 호환 배정, 기각 격리, APS 위임/폴백, 결정성,
//           사이클 올림, 스케줄 불변식
// ==========================================

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use film_aps::aps::{ApsEngine, ApsRequest, OperationPlan, PlanOutcome, PlannedOperation};
use film_aps::domain::types::{ColorCategory, EngineMode, OrderPriority};
use film_aps::domain::{Machine, Order, Product, Schedule};
use film_aps::engine::{PlanningOrchestrator, PlanningSnapshot, SetupMatrix};
use film_aps::{OfflineApsEngine, PlanningConfig, PlanningError};
use std::sync::Arc;

// ==========================================
// 테스트 더블
// ==========================================

/// 항상 주어진 계획을 돌려주는 엔진
struct FixedPlanEngine {
    plan: OperationPlan,
}

#[async_trait]
impl ApsEngine for FixedPlanEngine {
    async fn solve(&self, _request: &ApsRequest) -> PlanOutcome {
        PlanOutcome::Success(self.plan.clone())
    }
}

/// 항상 이상 응답을 돌려주는 엔진
struct MalformedEngine;

#[async_trait]
impl ApsEngine for MalformedEngine {
    async fn solve(&self, _request: &ApsRequest) -> PlanOutcome {
        PlanOutcome::Malformed("필드 누락".to_string())
    }
}

// ==========================================
// 테스트 헬퍼
// ==========================================

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, day).unwrap()
}

fn fast_machine(id: &str, name: &str, min: i64, max: i64) -> Machine {
    let mut m = Machine::new(id, name, min, max);
    m.speed_m_per_min = 1000.0; // 1롤 = 1분
    m
}

fn baseline_snapshot() -> PlanningSnapshot {
    let config = PlanningConfig::default();
    PlanningSnapshot {
        orders: vec![
            Order::new("O1", "P-600", 1000, date(15), OrderPriority::Normal),
            Order::new("O2", "P-800", 500, date(16), OrderPriority::Normal),
        ],
        products: vec![
            Product::new("P-600", 600, ColorCategory::Clear),
            Product::new("P-800", 800, ColorCategory::Clear),
        ],
        machines: vec![
            fast_machine("M1", "1호기", 400, 600),
            fast_machine("M2", "2호기", 600, 800),
        ],
        setup_matrix: SetupMatrix::standard(config.default_setup_penalty_min),
    }
}

async fn run_offline(snapshot: &PlanningSnapshot) -> Schedule {
    film_aps::logging::init_test();
    let orchestrator =
        PlanningOrchestrator::new(Arc::new(OfflineApsEngine), PlanningConfig::default());
    orchestrator.run(snapshot, date(12)).await.unwrap()
}

fn assert_hard_invariants(schedule: &Schedule, config: &PlanningConfig) {
    for machine in &schedule.machines {
        assert!(!machine.has_overlap(), "기계 {} 시간 겹침", machine.machine_id);
        for slot in &machine.slots {
            assert_eq!(
                slot.lot.total_rolls() % config.rolls_per_cycle,
                0,
                "로트 {} 사이클 미정합",
                slot.lot.lot_id
            );
            assert!(
                slot.lot.distinct_product_count() <= config.max_items_per_machine,
                "로트 {} 품목 수 초과",
                slot.lot.lot_id
            );
        }
    }
}

// ==========================================
// 시나리오 테스트
// ==========================================

#[tokio::test]
async fn two_orders_land_on_their_compatible_machines() {
    let snapshot = baseline_snapshot();
    let schedule = run_offline(&snapshot).await;

    // O1 → M1 (부하 동률 tie-break은 기계 ID순), O2 → M2
    assert_eq!(schedule.placement_count("O1"), 1);
    assert_eq!(schedule.placement_count("O2"), 1);

    let machine_of = |order_id: &str| -> String {
        schedule
            .machines
            .iter()
            .find(|m| {
                m.slots
                    .iter()
                    .any(|s| s.lot.entries.iter().any(|e| e.order_id == order_id))
            })
            .map(|m| m.machine_id.clone())
            .unwrap()
    };
    assert_eq!(machine_of("O1"), "M1");
    assert_eq!(machine_of("O2"), "M2");

    assert!(schedule.due_date_misses.is_empty());
    assert!(schedule.rejected.is_empty());
    assert_hard_invariants(&schedule, &PlanningConfig::default());
}

#[tokio::test]
async fn incompatible_order_is_surfaced_and_rest_is_scheduled() {
    let mut snapshot = baseline_snapshot();
    snapshot
        .products
        .push(Product::new("P-1600", 1600, ColorCategory::Clear));
    snapshot.orders.push(Order::new(
        "O3",
        "P-1600",
        4,
        date(15),
        OrderPriority::Normal,
    ));

    let schedule = run_offline(&snapshot).await;

    assert_eq!(schedule.rejected.len(), 1);
    assert_eq!(schedule.rejected[0].order_id, "O3");
    assert_eq!(schedule.rejected[0].reason, "NO_COMPATIBLE_MACHINE");
    assert_eq!(schedule.placement_count("O3"), 0);
    // 나머지는 정상 배정 (침묵 탈락 금지)
    assert_eq!(schedule.placement_count("O1"), 1);
    assert_eq!(schedule.placement_count("O2"), 1);
}

#[tokio::test]
async fn aps_timeout_falls_back_and_keeps_invariants() {
    // OfflineApsEngine은 항상 Timeout → 폴백 경로 강제
    let snapshot = baseline_snapshot();
    let schedule = run_offline(&snapshot).await;
    assert_eq!(schedule.engine_mode, EngineMode::GreedyFallback);
    assert_hard_invariants(&schedule, &PlanningConfig::default());
}

#[tokio::test]
async fn replanning_same_snapshot_is_deterministic() {
    let snapshot = baseline_snapshot();
    let a = run_offline(&snapshot).await;
    let b = run_offline(&snapshot).await;
    // run_id는 실행마다 다르지만 스케줄 본문은 동일해야 한다
    assert_eq!(a.machines, b.machines);
    assert_eq!(a.rejected, b.rejected);
    assert_eq!(a.due_date_misses, b.due_date_misses);
    assert_eq!(a.cycle_notes, b.cycle_notes);
}

#[tokio::test]
async fn odd_quantity_is_rounded_up_with_carry_over() {
    let mut snapshot = baseline_snapshot();
    snapshot.orders = vec![Order::new(
        "O1",
        "P-600",
        1001,
        date(15),
        OrderPriority::Normal,
    )];

    let schedule = run_offline(&snapshot).await;

    assert_eq!(schedule.cycle_notes.len(), 1);
    let note = &schedule.cycle_notes[0];
    assert_eq!(note.requested_rolls, 1001);
    assert_eq!(note.scheduled_rolls, 1002);
    assert_eq!(note.carry_over_rolls, 1);
    assert_hard_invariants(&schedule, &PlanningConfig::default());
}

#[tokio::test]
async fn infeasible_due_date_yields_partial_schedule_with_miss_report() {
    let mut snapshot = baseline_snapshot();
    // 느린 기계로 교체 → 납기 불능
    for machine in &mut snapshot.machines {
        machine.speed_m_per_min = 30.0;
    }

    let schedule = run_offline(&snapshot).await;

    // 실행은 실패하지 않고 위반 주문이 명시 보고된다
    assert_eq!(schedule.placement_count("O1"), 1);
    assert!(schedule
        .due_date_misses
        .iter()
        .any(|m| m.order_id == "O1" && m.days_late > 0));
}

#[tokio::test]
async fn valid_aps_plan_is_imported_as_delegate_mode() {
    let mut snapshot = baseline_snapshot();
    snapshot.orders = vec![Order::new(
        "O1",
        "P-600",
        10,
        date(15),
        OrderPriority::Normal,
    )];

    // 그룹퍼는 단일 주문을 M1-L001로 개설한다
    let plan = OperationPlan {
        operations: vec![PlannedOperation {
            operation_id: "M1-L001".to_string(),
            resource_id: "M1".to_string(),
            start_time: date(12).and_hms_opt(8, 0, 0).unwrap(),
            end_time: date(12).and_hms_opt(9, 0, 0).unwrap(),
        }],
    };
    let orchestrator = PlanningOrchestrator::new(
        Arc::new(FixedPlanEngine { plan }),
        PlanningConfig::default(),
    );
    let schedule = orchestrator.run(&snapshot, date(12)).await.unwrap();

    assert_eq!(schedule.engine_mode, EngineMode::ApsDelegate);
    let slot = &schedule.machines[0].slots[0];
    assert_eq!(slot.start_time, date(12).and_hms_opt(8, 0, 0).unwrap());
    assert_eq!(slot.end_time, date(12).and_hms_opt(9, 0, 0).unwrap());
    assert!(schedule.due_date_misses.is_empty());
}

#[tokio::test]
async fn aps_plan_missing_a_lot_triggers_fallback() {
    let snapshot = baseline_snapshot();
    // 로트 2건 중 1건만 돌려주는 이상 응답
    let plan = OperationPlan {
        operations: vec![PlannedOperation {
            operation_id: "M1-L001".to_string(),
            resource_id: "M1".to_string(),
            start_time: date(12).and_hms_opt(8, 0, 0).unwrap(),
            end_time: date(12).and_hms_opt(9, 0, 0).unwrap(),
        }],
    };
    let orchestrator = PlanningOrchestrator::new(
        Arc::new(FixedPlanEngine { plan }),
        PlanningConfig::default(),
    );
    let schedule = orchestrator.run(&snapshot, date(12)).await.unwrap();

    assert_eq!(schedule.engine_mode, EngineMode::GreedyFallback);
    assert_eq!(schedule.placement_count("O1"), 1);
    assert_eq!(schedule.placement_count("O2"), 1);
}

#[tokio::test]
async fn malformed_aps_response_triggers_fallback() {
    let snapshot = baseline_snapshot();
    let orchestrator =
        PlanningOrchestrator::new(Arc::new(MalformedEngine), PlanningConfig::default());
    let schedule = orchestrator.run(&snapshot, date(12)).await.unwrap();
    assert_eq!(schedule.engine_mode, EngineMode::GreedyFallback);
    assert_hard_invariants(&schedule, &PlanningConfig::default());
}

#[tokio::test]
async fn unknown_product_on_order_aborts_the_run() {
    let mut snapshot = baseline_snapshot();
    snapshot.orders.push(Order::new(
        "O9",
        "P-UNKNOWN",
        2,
        date(15),
        OrderPriority::Normal,
    ));
    let orchestrator =
        PlanningOrchestrator::new(Arc::new(OfflineApsEngine), PlanningConfig::default());
    let err = orchestrator.run(&snapshot, date(12)).await.unwrap_err();
    assert!(matches!(err, PlanningError::UnknownProduct { .. }));
    assert!(err.is_fatal());
}

#[tokio::test]
async fn mixed_lot_respects_item_limit_under_load() {
    // 같은 폭 그룹 제품 6종 → 한 로트에 4품목까지만
    let config = PlanningConfig::default();
    let products: Vec<Product> = (0..6)
        .map(|i| Product::new(format!("P-5{}0", i), 500 + i * 10, ColorCategory::Clear))
        .collect();
    let orders: Vec<Order> = products
        .iter()
        .enumerate()
        .map(|(i, p)| {
            Order::new(
                format!("O{}", i + 1),
                p.product_code.clone(),
                2,
                date(15),
                OrderPriority::Normal,
            )
        })
        .collect();
    let snapshot = PlanningSnapshot {
        orders,
        products,
        machines: vec![fast_machine("M1", "1호기", 400, 600)],
        setup_matrix: SetupMatrix::standard(config.default_setup_penalty_min),
    };

    let schedule = run_offline(&snapshot).await;
    assert_hard_invariants(&schedule, &config);
    for i in 1..=6 {
        assert_eq!(schedule.placement_count(&format!("O{}", i)), 1);
    }
}

#[tokio::test]
async fn plan_date_plus_horizon_handles_weekend_free_calendar() {
    // 하루 창을 넘는 대형 로트가 다음 날로 이어진다
    let mut snapshot = baseline_snapshot();
    snapshot.orders = vec![Order::new(
        "O1",
        "P-600",
        1000, // 1000분 > 720분/일
        date(15),
        OrderPriority::Normal,
    )];
    let schedule = run_offline(&snapshot).await;
    let slot = &schedule.machines[0].slots[0];
    assert_eq!(slot.start_time.date(), date(12));
    assert_eq!(slot.end_time.date(), date(13));
    assert!(schedule.due_date_misses.is_empty());
}
