// ==========================================
// PE 필름 생산 스케줄링 시스템 - 설정 계층
// ==========================================
// 책임: 계획 파라미터 관리
// 기본값은 현장 표준 (폭 허용 오차 100mm, 혼합 4품목, 2롤 사이클,
// 근무 08:00~20:00), JSON 파일로 덮어쓰기 가능
// ==========================================

use serde::{Deserialize, Serialize};
use std::path::Path;

/// 목적함수 가중치
///
/// 납기 준수는 하드 필터로 먼저 적용되고, 남은 후보 사이에서
/// 아래 가중합으로 다음 로트를 고른다. 우선순위 체인이 아니라
/// 가중합인 이유: 목적 간 정확한 우선 관계가 확정되지 않았고
/// 운영 중 조정이 필요하기 때문.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectiveWeights {
    /// 셋업 분 가중치 (낮을수록 좋음)
    pub setup_weight: f64,
    /// 어두움→밝음 역방향 전환 페널티 가중치
    pub shade_order_weight: f64,
    /// 폭 활용률 가중치 (높을수록 좋음, 점수에서 차감)
    pub width_util_weight: f64,
}

impl Default for ObjectiveWeights {
    fn default() -> Self {
        Self {
            setup_weight: 1.0,
            shade_order_weight: 15.0,
            width_util_weight: 5.0,
        }
    }
}

/// 계획 파라미터 전집
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningConfig {
    /// 폭 그룹 허용 오차 (mm) — 이 범위 내 폭은 같은 그룹 후보
    pub width_tolerance_mm: i64,
    /// 기계별 혼합 가능 상이 품목 수 상한
    pub max_items_per_machine: usize,
    /// 사이클당 롤 수 (1사이클 = 2롤)
    pub rolls_per_cycle: u32,
    /// 롤당 길이 (m)
    pub meters_per_roll: f64,
    /// 근무 시작 시각 (시)
    pub work_start_hour: u32,
    /// 근무 종료 시각 (시)
    pub work_end_hour: u32,
    /// 셋업 매트릭스 미정의 쌍의 기본 페널티 (분) — 0 가정 금지
    pub default_setup_penalty_min: i64,
    /// 외부 APS 엔진 호출 타임아웃 (초)
    pub aps_timeout_secs: u64,
    /// 계획 지평 (일)
    pub horizon_days: i64,
    /// 목적함수 가중치
    pub weights: ObjectiveWeights,
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            width_tolerance_mm: 100,
            max_items_per_machine: 4,
            rolls_per_cycle: 2,
            meters_per_roll: 1000.0,
            work_start_hour: 8,
            work_end_hour: 20,
            default_setup_penalty_min: 60,
            aps_timeout_secs: 20,
            horizon_days: 7,
            weights: ObjectiveWeights::default(),
        }
    }
}

impl PlanningConfig {
    /// 하루 근무 분
    pub fn work_minutes_per_day(&self) -> i64 {
        (self.work_end_hour as i64 - self.work_start_hour as i64) * 60
    }

    /// JSON 설정 파일 로드 (누락 필드는 기본값 유지)
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: PlanningConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// 파라미터 정합성 검사
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.work_start_hour >= self.work_end_hour || self.work_end_hour > 23 {
            anyhow::bail!(
                "근무 시간대가 올바르지 않음: {}~{}",
                self.work_start_hour,
                self.work_end_hour
            );
        }
        if self.rolls_per_cycle == 0 {
            anyhow::bail!("rolls_per_cycle은 1 이상이어야 함");
        }
        if self.max_items_per_machine == 0 {
            anyhow::bail!("max_items_per_machine은 1 이상이어야 함");
        }
        if self.default_setup_penalty_min <= 0 {
            anyhow::bail!("default_setup_penalty_min은 양수여야 함 (무료 전환 가정 금지)");
        }
        Ok(())
    }
}
