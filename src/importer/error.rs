// ==========================================
// PE 필름 생산 스케줄링 시스템 - 인제스천 에러 타입
// ==========================================
// 도구: thiserror 파생 매크로
// 행/필드 맥락을 잃지 않는다
// ==========================================

use thiserror::Error;

/// 인제스천(CSV) 에러 타입
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 파일 =====
    #[error("파일 없음: {0}")]
    FileNotFound(String),

    #[error("CSV 파싱 실패: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    // ===== 행 단위 데이터 품질 =====
    #[error("주 키 누락 (행 {0})")]
    PrimaryKeyMissing(usize),

    #[error("날짜 형식 오류 (행 {row}, 필드 {field}): 기대 YYYY-MM-DD, 실제 {value}")]
    DateFormatError {
        row: usize,
        field: String,
        value: String,
    },

    #[error("색상 카테고리 오류 (행 {row}): {value} (CLEAR/COLOR만 허용)")]
    UnknownColor { row: usize, value: String },

    #[error("수치 범위 오류 (행 {row}, 필드 {field}): {message}")]
    ValueRangeError {
        row: usize,
        field: String,
        message: String,
    },

    // ===== 카탈로그 정합성 =====
    #[error("미지 제품 코드 (행 {row}): {product_code}")]
    UnknownProductCode { row: usize, product_code: String },
}
