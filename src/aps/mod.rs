// ==========================================
// PE 필름 생산 스케줄링 시스템 - APS 콜라보레이터 계층
// ==========================================
// 책임: 외부 APS 엔진 접점 + 교환 레코드 정의
// 엔진 내부는 블랙박스, 응답은 PlanOutcome으로만 수용
// ==========================================

pub mod engine;
pub mod records;

pub use engine::{solve_with_timeout, ApsEngine, OfflineApsEngine};
pub use records::{
    ApsRequest, BufferRecord, DemandRecord, OperationPlan, OperationRecord, PlanOutcome,
    PlannedOperation, ResourceRecord,
};
