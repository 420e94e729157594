// ==========================================
// PE 필름 생산 스케줄링 시스템 - 엔진 계층
// ==========================================
// 비즈니스 규칙 전담, DB/파일 접근 없음
// 평가 순서 (하향식): 호환성 인덱스 → 로트 그룹핑 → 순서 최적화
// ==========================================

pub mod compatibility;
pub mod grouper;
pub mod orchestrator;
pub mod sequencer;
pub mod setup_matrix;

pub use compatibility::CompatibilityIndex;
pub use grouper::{GroupingResult, LotGrouper, REASON_NO_COMPATIBLE_MACHINE};
pub use orchestrator::{PlanningOrchestrator, PlanningSnapshot};
pub use sequencer::{SequenceOptimizer, SequencingResult, WorkCalendar};
pub use setup_matrix::SetupMatrix;
