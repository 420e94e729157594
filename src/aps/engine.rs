// ==========================================
// PE 필름 생산 스케줄링 시스템 - APS 엔진 접점
// ==========================================
// 외부 APS 엔진은 블랙박스다. 타임아웃/이상 응답은 모두
// PlanOutcome 태그로 수렴시키고, 재시도-백오프는 하지 않는다
// (폴백 휴리스틱이 결정적이고 저렴하므로)
// ==========================================

use crate::aps::records::{ApsRequest, PlanOutcome};
use async_trait::async_trait;
use std::time::Duration;
use tracing::warn;

/// 외부 APS 엔진 접점
///
/// 유일하게 장시간 블로킹이 예상되는 연산이므로 반드시
/// solve_with_timeout을 거쳐 호출한다
#[async_trait]
pub trait ApsEngine: Send + Sync {
    async fn solve(&self, request: &ApsRequest) -> PlanOutcome;

    /// 로그 식별용 이름
    fn name(&self) -> &str {
        "aps"
    }
}

/// 오프라인 기본 콜라보레이터
///
/// 외부 엔진 미연결 환경에서 쓰는 기본값. 항상 Timeout을 돌려
/// 호출부가 폴백 경로를 타게 한다
pub struct OfflineApsEngine;

#[async_trait]
impl ApsEngine for OfflineApsEngine {
    async fn solve(&self, _request: &ApsRequest) -> PlanOutcome {
        PlanOutcome::Timeout
    }

    fn name(&self) -> &str {
        "offline"
    }
}

/// 타임아웃을 강제한 APS 호출
///
/// 경과 시 Timeout으로 수렴, 호출부는 폴백으로 전환한다
pub async fn solve_with_timeout<E: ApsEngine + ?Sized>(
    engine: &E,
    request: &ApsRequest,
    timeout: Duration,
) -> PlanOutcome {
    match tokio::time::timeout(timeout, engine.solve(request)).await {
        Ok(outcome) => outcome,
        Err(_) => {
            warn!(engine = engine.name(), timeout_secs = timeout.as_secs(), "APS 호출 타임아웃");
            PlanOutcome::Timeout
        }
    }
}
