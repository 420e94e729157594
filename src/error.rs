// ==========================================
// PE 필름 생산 스케줄링 시스템 - 계획 실행 에러 타입
// ==========================================
// 도구: thiserror 파생 매크로
// 치명 에러는 카탈로그 정합성 위반뿐이다
// 주문 단위 실패는 스케줄 주석으로 격리한다 (실행 전체 중단 금지)
// ==========================================

use thiserror::Error;

/// 계획 실행 에러 타입
#[derive(Error, Debug)]
pub enum PlanningError {
    // ===== 카탈로그 정합성 (치명) =====
    #[error("알 수 없는 제품 코드: {product_code}")]
    UnknownProduct { product_code: String },

    #[error("알 수 없는 기계: {machine_id}")]
    UnknownMachine { machine_id: String },

    #[error("기계 명단이 비어 있음")]
    EmptyMachineRoster,

    // ===== 주문 단위 실패 (비치명, 스케줄 주석으로 격리) =====
    #[error("호환 기계 없음: order_id={order_id}, product_code={product_code}")]
    NoCompatibleMachine {
        order_id: String,
        product_code: String,
    },

    // ===== 외부 엔진 (폴백 트리거, 비치명) =====
    #[error("외부 APS 엔진 사용 불가: {reason}")]
    ExternalEngineUnavailable { reason: String },

    // ===== 통용 =====
    #[error("내부 오류: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PlanningError {
    /// 실행 전체를 중단해야 하는 에러인지
    ///
    /// 카탈로그 정합성 위반만 치명으로 취급한다
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PlanningError::UnknownProduct { .. }
                | PlanningError::UnknownMachine { .. }
                | PlanningError::EmptyMachineRoster
        )
    }
}
