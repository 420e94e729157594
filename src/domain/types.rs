// ==========================================
// PE 필름 생산 스케줄링 시스템 - 도메인 타입 정의
// ==========================================
// 직렬화 형식: SCREAMING_SNAKE_CASE (외부 산출물과 일치)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 주문 상태 (Order Status)
// ==========================================
// 주문은 생성 후 상태 전이만 허용, 삭제는 아카이브 전용
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,   // 미배정
    Scheduled, // 배정 완료
    Completed, // 생산 완료
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "PENDING"),
            OrderStatus::Scheduled => write!(f, "SCHEDULED"),
            OrderStatus::Completed => write!(f, "COMPLETED"),
        }
    }
}

// ==========================================
// 색상 카테고리 (Color Category)
// ==========================================
// 셋업 매트릭스의 키, 밝은색→어두운색 순서 선호의 기준
// COLOR → CLEAR 전환은 세척이 필요해 가장 비싸다
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColorCategory {
    Clear, // 투명 (밝음)
    Color, // 유색 (어두움)
}

impl ColorCategory {
    /// 밝기 순위 (낮을수록 밝음)
    ///
    /// 밝은색→어두운색 전환 선호 비교에 사용
    pub fn shade_rank(self) -> u8 {
        match self {
            ColorCategory::Clear => 0,
            ColorCategory::Color => 1,
        }
    }

    /// 문자열 파싱 (CSV 입력용)
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "CLEAR" => Some(ColorCategory::Clear),
            "COLOR" => Some(ColorCategory::Color),
            _ => None,
        }
    }
}

impl fmt::Display for ColorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorCategory::Clear => write!(f, "CLEAR"),
            ColorCategory::Color => write!(f, "COLOR"),
        }
    }
}

// ==========================================
// 주문 우선순위 (Order Priority)
// ==========================================
// 1: 일반, 2: 급함, 3: 매우 급함
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderPriority {
    Normal,
    Rush,
    VeryRush,
}

impl OrderPriority {
    pub fn from_level(level: i64) -> Self {
        match level {
            l if l >= 3 => OrderPriority::VeryRush,
            2 => OrderPriority::Rush,
            _ => OrderPriority::Normal,
        }
    }

    pub fn level(self) -> i64 {
        match self {
            OrderPriority::Normal => 1,
            OrderPriority::Rush => 2,
            OrderPriority::VeryRush => 3,
        }
    }
}

impl fmt::Display for OrderPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderPriority::Normal => write!(f, "NORMAL"),
            OrderPriority::Rush => write!(f, "RUSH"),
            OrderPriority::VeryRush => write!(f, "VERY_RUSH"),
        }
    }
}

// ==========================================
// 엔진 모드 (Engine Mode)
// ==========================================
// 스케줄이 어느 경로로 산출되었는지 기록
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EngineMode {
    ApsDelegate,    // 외부 APS 엔진 결과 수용
    GreedyFallback, // 로컬 그리디 휴리스틱
}

impl fmt::Display for EngineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineMode::ApsDelegate => write!(f, "APS_DELEGATE"),
            EngineMode::GreedyFallback => write!(f, "GREEDY_FALLBACK"),
        }
    }
}

// ==========================================
// 폭 그룹 식별자 (Width Group Id)
// ==========================================
// 카탈로그 재계산 시마다 새로 부여되는 파생 식별자
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WidthGroupId(pub u32);

impl fmt::Display for WidthGroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WG{:02}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_category_parses_case_insensitive() {
        assert_eq!(ColorCategory::parse("clear"), Some(ColorCategory::Clear));
        assert_eq!(ColorCategory::parse(" COLOR "), Some(ColorCategory::Color));
        assert_eq!(ColorCategory::parse("PINK"), None);
    }

    #[test]
    fn shade_rank_orders_light_to_dark() {
        assert!(ColorCategory::Clear.shade_rank() < ColorCategory::Color.shade_rank());
    }

    #[test]
    fn priority_level_roundtrip() {
        assert_eq!(OrderPriority::from_level(1), OrderPriority::Normal);
        assert_eq!(OrderPriority::from_level(2), OrderPriority::Rush);
        assert_eq!(OrderPriority::from_level(9), OrderPriority::VeryRush);
        assert_eq!(OrderPriority::VeryRush.level(), 3);
    }
}
