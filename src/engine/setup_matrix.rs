// ==========================================
// PE 필름 생산 스케줄링 시스템 - 셋업 시간 매트릭스
// ==========================================
// (이전 카테고리, 다음 카테고리) → 분
// 미정의 쌍은 설정된 최대 페널티를 적용한다 (무료 전환 가정 금지)
// ==========================================

use crate::domain::types::ColorCategory;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 셋업 시간 매트릭스
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupMatrix {
    entries: BTreeMap<(ColorCategory, ColorCategory), i64>,
    /// 미정의 쌍 기본 페널티 (분)
    default_penalty_min: i64,
}

impl SetupMatrix {
    pub fn new(default_penalty_min: i64) -> Self {
        Self {
            entries: BTreeMap::new(),
            default_penalty_min,
        }
    }

    /// 현장 표준 매트릭스
    ///
    /// COLOR → CLEAR는 세척이 필요해 가장 비싸다 (45분)
    pub fn standard(default_penalty_min: i64) -> Self {
        let mut matrix = Self::new(default_penalty_min);
        matrix.set(ColorCategory::Clear, ColorCategory::Clear, 10);
        matrix.set(ColorCategory::Clear, ColorCategory::Color, 30);
        matrix.set(ColorCategory::Color, ColorCategory::Clear, 45);
        matrix.set(ColorCategory::Color, ColorCategory::Color, 20);
        matrix
    }

    pub fn set(&mut self, from: ColorCategory, to: ColorCategory, minutes: i64) {
        self.entries.insert((from, to), minutes);
    }

    /// 전환 비용 (분)
    ///
    /// from이 None이면(콜드 스타트, 직전 셋업 없음) 비용 0
    pub fn minutes(&self, from: Option<ColorCategory>, to: ColorCategory) -> i64 {
        match from {
            None => 0,
            Some(f) => self
                .entries
                .get(&(f, to))
                .copied()
                .unwrap_or(self.default_penalty_min),
        }
    }
}
