// ==========================================
// PE 필름 생산 스케줄링 시스템 - 인제스천 계층
// ==========================================
// 책임: 외부 표 형식 입력(CSV) → 도메인 엔티티
// 미지 제품 코드 참조는 여기서 차단한다
// ==========================================

pub mod catalog_import;
pub mod error;
pub mod order_import;

pub use catalog_import::{load_machines_csv, load_products_csv, load_setup_matrix_csv};
pub use error::ImportError;
pub use order_import::load_orders_csv;
