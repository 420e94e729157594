// ==========================================
// PE 필름 생산 스케줄링 시스템 - APS 연동 레코드
// ==========================================
// 외부 APS 엔진과의 교환 형식: Resource/Operation/Buffer/Demand
// 요청은 로트 후보에서 내보내고, 응답은 OperationPlan으로 받는다
// 응답은 엄격한 태그 결과(PlanOutcome)로만 취급한다
// ==========================================

use crate::config::PlanningConfig;
use crate::domain::lot::Lot;
use crate::domain::machine::Machine;
use crate::domain::product::Product;
use crate::domain::types::ColorCategory;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// 자원 레코드 (기계 1대)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub resource_id: String,
    pub name: String,
    pub width_min_mm: i64,
    pub width_max_mm: i64,
    pub speed_m_per_min: f64,
}

/// 공정 레코드 (로트 1건)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationRecord {
    /// 로트 ID를 그대로 사용
    pub operation_id: String,
    pub resource_id: String,
    /// 생산 소요 (분, 셋업 제외 — 셋업은 엔진의 시퀀스 결정에 종속)
    pub duration_min: i64,
    pub due_date: Option<NaiveDate>,
    pub order_ids: Vec<String>,
}

/// 버퍼 레코드 (제품 1종)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferRecord {
    pub buffer_id: String,
    pub width_mm: i64,
    pub color: ColorCategory,
}

/// 수요 레코드 (주문 1건)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandRecord {
    pub demand_id: String,
    pub buffer_id: String,
    pub quantity_rolls: u32,
    pub due_date: NaiveDate,
}

/// APS 엔진 요청
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApsRequest {
    pub run_id: String,
    pub plan_date: NaiveDate,
    pub resources: Vec<ResourceRecord>,
    pub operations: Vec<OperationRecord>,
    pub buffers: Vec<BufferRecord>,
    pub demands: Vec<DemandRecord>,
}

impl ApsRequest {
    /// 로트 후보를 APS 레코드로 내보내기
    pub fn from_lots(
        run_id: &str,
        plan_date: NaiveDate,
        lots: &[Lot],
        machines: &[Machine],
        products: &[Product],
        config: &PlanningConfig,
    ) -> Self {
        let resources = machines
            .iter()
            .filter(|m| m.available)
            .map(|m| ResourceRecord {
                resource_id: m.machine_id.clone(),
                name: m.name.clone(),
                width_min_mm: m.width_min_mm,
                width_max_mm: m.width_max_mm,
                speed_m_per_min: m.speed_m_per_min,
            })
            .collect();

        let operations = lots
            .iter()
            .map(|lot| {
                let duration = machines
                    .iter()
                    .find(|m| m.machine_id == lot.machine_id)
                    .map(|m| m.production_minutes(lot.total_rolls(), config.meters_per_roll))
                    .unwrap_or(0);
                OperationRecord {
                    operation_id: lot.lot_id.clone(),
                    resource_id: lot.machine_id.clone(),
                    duration_min: duration,
                    due_date: lot.due_deadline(),
                    order_ids: lot.entries.iter().map(|e| e.order_id.clone()).collect(),
                }
            })
            .collect();

        let buffers = products
            .iter()
            .map(|p| BufferRecord {
                buffer_id: p.product_code.clone(),
                width_mm: p.width_mm,
                color: p.color,
            })
            .collect();

        let demands = lots
            .iter()
            .flat_map(|lot| lot.entries.iter())
            .map(|e| DemandRecord {
                demand_id: e.order_id.clone(),
                buffer_id: e.product_code.clone(),
                quantity_rolls: e.rolls,
                due_date: e.due_date,
            })
            .collect();

        Self {
            run_id: run_id.to_string(),
            plan_date,
            resources,
            operations,
            buffers,
            demands,
        }
    }
}

/// 시간이 확정된 공정 1건 (엔진 응답)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedOperation {
    pub operation_id: String,
    pub resource_id: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
}

/// 엔진이 반환한 공정 계획
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationPlan {
    pub operations: Vec<PlannedOperation>,
}

/// APS 호출의 엄격한 태그 결과
///
/// Timeout / Malformed는 호출부에서 반드시 폴백 처리해야 한다
#[derive(Debug, Clone, PartialEq)]
pub enum PlanOutcome {
    Success(OperationPlan),
    Timeout,
    Malformed(String),
}
