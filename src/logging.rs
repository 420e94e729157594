// ==========================================
// 로깅 초기화
// ==========================================
// tracing / tracing-subscriber 사용
// 환경 변수로 레벨 제어
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 로깅 초기화
///
/// # 환경 변수
/// - RUST_LOG: 레벨 필터 (기본: info)
///   예: RUST_LOG=debug 또는 RUST_LOG=film_aps=trace
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();
}

/// 테스트용 로깅 초기화 (중복 초기화 허용)
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
