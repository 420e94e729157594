// ==========================================
// PE 필름 생산 스케줄링 시스템 - 기계 엔티티
// ==========================================
// 폭 범위 [width_min_mm, width_max_mm] 밖의 제품은 생산 불가
// current_setup: 직전 생산 카테고리 (셋업 전환 비용 기준점)
// ==========================================

use crate::domain::types::ColorCategory;
use serde::{Deserialize, Serialize};

/// 기계 정보
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    /// 기계 식별자 (유일)
    pub machine_id: String,
    /// 표시용 이름 (예: "1호기")
    pub name: String,
    /// 생산 가능 최소 폭 (mm)
    pub width_min_mm: i64,
    /// 생산 가능 최대 폭 (mm)
    pub width_max_mm: i64,
    /// 권취 속도 (m/분)
    pub speed_m_per_min: f64,
    /// 사이클당 혼합 가능 품목 수 상한
    pub max_items_per_cycle: usize,
    /// 가용 여부 (false면 호환 계산에서 제외)
    pub available: bool,
    /// 현재 셋업된 색상 카테고리
    pub current_setup: Option<ColorCategory>,
}

impl Machine {
    /// 기본 운전 파라미터로 기계 생성
    pub fn new(
        machine_id: impl Into<String>,
        name: impl Into<String>,
        width_min_mm: i64,
        width_max_mm: i64,
    ) -> Self {
        Self {
            machine_id: machine_id.into(),
            name: name.into(),
            width_min_mm,
            width_max_mm,
            speed_m_per_min: 30.0,
            max_items_per_cycle: 4,
            available: true,
            current_setup: None,
        }
    }

    /// 해당 폭을 생산할 수 있는지
    pub fn supports_width(&self, width_mm: i64) -> bool {
        self.width_min_mm <= width_mm && width_mm <= self.width_max_mm
    }

    /// 롤 수량의 생산 소요 시간 (분)
    ///
    /// 1롤 = meters_per_roll (m) 가정, 기계 권취 속도로 나눈다
    pub fn production_minutes(&self, rolls: u32, meters_per_roll: f64) -> i64 {
        if self.speed_m_per_min <= 0.0 {
            return 0;
        }
        let minutes = (rolls as f64) * meters_per_roll / self.speed_m_per_min;
        minutes.ceil() as i64
    }
}
