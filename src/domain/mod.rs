// ==========================================
// PE 필름 생산 스케줄링 시스템 - 도메인 계층
// ==========================================
// 엔티티와 값 타입만 포함, 비즈니스 규칙은 engine 계층에
// ==========================================

pub mod lot;
pub mod machine;
pub mod order;
pub mod product;
pub mod schedule;
pub mod types;

pub use lot::{Lot, LotEntry};
pub use machine::Machine;
pub use order::Order;
pub use product::Product;
pub use schedule::{
    CycleRoundingNote, DueDateMiss, MachineSchedule, RejectedOrder, Schedule, ScheduleSummary,
    ScheduledLot,
};
pub use types::{ColorCategory, EngineMode, OrderPriority, OrderStatus, WidthGroupId};
