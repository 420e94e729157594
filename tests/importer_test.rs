// ==========================================
// 인제스천(CSV) 통합 테스트
// ==========================================
// tempfile로 실제 파일 경로를 구성해 로더 전체 경로를 검증한다
// ==========================================

use film_aps::domain::types::ColorCategory;
use film_aps::importer::{
    load_machines_csv, load_orders_csv, load_products_csv, load_setup_matrix_csv, ImportError,
};
use std::io::Write;
use tempfile::NamedTempFile;

fn csv_file(contents: &str) -> NamedTempFile {
    film_aps::logging::init_test();
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn products_roundtrip_from_csv() {
    let file = csv_file(
        "product_code,width_mm,color\n\
         PE-FILM-500,500,CLEAR\n\
         PE-FILM-600C,600,color\n",
    );
    let products = load_products_csv(file.path()).unwrap();
    assert_eq!(products.len(), 2);
    assert_eq!(products[0].product_code, "PE-FILM-500");
    assert_eq!(products[1].color, ColorCategory::Color);
}

#[test]
fn product_with_bad_color_is_rejected_with_row_context() {
    let file = csv_file(
        "product_code,width_mm,color\n\
         PE-FILM-500,500,PINK\n",
    );
    let err = load_products_csv(file.path()).unwrap_err();
    match err {
        ImportError::UnknownColor { row, value } => {
            assert_eq!(row, 2);
            assert_eq!(value, "PINK");
        }
        other => panic!("예상 밖 에러: {other}"),
    }
}

#[test]
fn machines_load_with_optional_columns() {
    let file = csv_file(
        "machine_id,name,width_min_mm,width_max_mm,speed_m_per_min,max_items_per_cycle,available\n\
         M1,1호기,400,600,45.0,3,true\n\
         M2,,500,800,,,\n",
    );
    let machines = load_machines_csv(file.path()).unwrap();
    assert_eq!(machines[0].speed_m_per_min, 45.0);
    assert_eq!(machines[0].max_items_per_cycle, 3);
    // 빈 선택 컬럼은 기본값 유지
    assert_eq!(machines[1].name, "M2");
    assert_eq!(machines[1].speed_m_per_min, 30.0);
    assert!(machines[1].available);
}

#[test]
fn zero_speed_machine_is_rejected() {
    // 속도 0이 통과하면 모든 생산이 0분으로 계산된다
    let file = csv_file(
        "machine_id,name,width_min_mm,width_max_mm,speed_m_per_min\n\
         M1,1호기,400,600,0\n",
    );
    match load_machines_csv(file.path()).unwrap_err() {
        ImportError::ValueRangeError { row, field, .. } => {
            assert_eq!(row, 2);
            assert_eq!(field, "speed_m_per_min");
        }
        other => panic!("예상 밖 에러: {other}"),
    }
}

#[test]
fn zero_item_limit_machine_is_rejected() {
    let file = csv_file(
        "machine_id,name,width_min_mm,width_max_mm,speed_m_per_min,max_items_per_cycle\n\
         M1,1호기,400,600,30,0\n",
    );
    assert!(matches!(
        load_machines_csv(file.path()),
        Err(ImportError::ValueRangeError { row: 2, .. })
    ));
}

#[test]
fn inverted_width_range_is_rejected() {
    let file = csv_file(
        "machine_id,name,width_min_mm,width_max_mm\n\
         M1,1호기,800,600\n",
    );
    assert!(matches!(
        load_machines_csv(file.path()),
        Err(ImportError::ValueRangeError { row: 2, .. })
    ));
}

#[test]
fn orders_validate_product_codes_against_catalog() {
    let products_file = csv_file(
        "product_code,width_mm,color\n\
         PE-FILM-500,500,CLEAR\n",
    );
    let products = load_products_csv(products_file.path()).unwrap();

    let ok_file = csv_file(
        "order_id,product_code,quantity_rolls,due_date,priority\n\
         ORD-001,PE-FILM-500,10,2026-01-15,2\n",
    );
    let orders = load_orders_csv(ok_file.path(), &products).unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].priority.level(), 2);

    let bad_file = csv_file(
        "order_id,product_code,quantity_rolls,due_date\n\
         ORD-002,NOPE,4,2026-01-15\n",
    );
    let err = load_orders_csv(bad_file.path(), &products).unwrap_err();
    assert!(matches!(
        err,
        ImportError::UnknownProductCode { row: 2, .. }
    ));
}

#[test]
fn order_with_bad_date_reports_field() {
    let products_file = csv_file(
        "product_code,width_mm,color\n\
         PE-FILM-500,500,CLEAR\n",
    );
    let products = load_products_csv(products_file.path()).unwrap();
    let file = csv_file(
        "order_id,product_code,quantity_rolls,due_date\n\
         ORD-001,PE-FILM-500,10,15/01/2026\n",
    );
    match load_orders_csv(file.path(), &products).unwrap_err() {
        ImportError::DateFormatError { row, field, value } => {
            assert_eq!(row, 2);
            assert_eq!(field, "due_date");
            assert_eq!(value, "15/01/2026");
        }
        other => panic!("예상 밖 에러: {other}"),
    }
}

#[test]
fn setup_matrix_fills_missing_pairs_with_penalty() {
    let file = csv_file(
        "from_color,to_color,minutes\n\
         CLEAR,COLOR,30\n\
         COLOR,CLEAR,45\n",
    );
    let matrix = load_setup_matrix_csv(file.path(), 60).unwrap();
    assert_eq!(matrix.minutes(Some(ColorCategory::Clear), ColorCategory::Color), 30);
    // 파일에 없는 쌍은 기본 페널티 (무료 전환 가정 금지)
    assert_eq!(matrix.minutes(Some(ColorCategory::Clear), ColorCategory::Clear), 60);
}

#[test]
fn missing_file_is_a_clear_error() {
    let missing = std::path::Path::new("/nonexistent/orders.csv");
    assert!(matches!(
        load_products_csv(missing),
        Err(ImportError::FileNotFound(_))
    ));
}
