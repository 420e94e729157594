// ==========================================
// PE 필름 생산 스케줄링 시스템 - 코어 라이브러리
// ==========================================
// 위치: 원시 주문과 외부 솔버 사이의 배정 코어
// 외부 콜라보레이터: APS 엔진, VRP 솔버, 리포트 내보내기
// ==========================================

// ==========================================
// 모듈 선언
// ==========================================

// 도메인 계층 - 엔티티와 타입
pub mod domain;

// 엔진 계층 - 비즈니스 규칙
pub mod engine;

// APS 콜라보레이터 계층 - 외부 엔진 접점
pub mod aps;

// 인제스천 계층 - 외부 데이터
pub mod importer;

// 설정 계층
pub mod config;

// 리포트 내보내기
pub mod report;

// 로깅
pub mod logging;

// 에러 타입
pub mod error;

// ==========================================
// 핵심 타입 재내보내기
// ==========================================

// 도메인 타입
pub use domain::types::{ColorCategory, EngineMode, OrderPriority, OrderStatus, WidthGroupId};

// 도메인 엔티티
pub use domain::{
    CycleRoundingNote, DueDateMiss, Lot, LotEntry, Machine, MachineSchedule, Order, Product,
    RejectedOrder, Schedule, ScheduleSummary, ScheduledLot,
};

// 엔진
pub use engine::{
    CompatibilityIndex, GroupingResult, LotGrouper, PlanningOrchestrator, PlanningSnapshot,
    SequenceOptimizer, SetupMatrix, WorkCalendar,
};

// APS 접점
pub use aps::{ApsEngine, ApsRequest, OfflineApsEngine, OperationPlan, PlanOutcome};

// 설정
pub use config::{ObjectiveWeights, PlanningConfig};

// 에러
pub use error::PlanningError;

/// 시스템 버전
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
