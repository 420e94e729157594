// ==========================================
// PE 필름 생산 스케줄링 시스템 - 카탈로그 인제스천
// ==========================================
// 제품/기계/셋업 매트릭스 CSV 로드
// 기계 행: machine_id,name,width_min_mm,width_max_mm
//          [,speed_m_per_min][,max_items_per_cycle][,available]
// 셋업 행: from_color,to_color,minutes (미정의 쌍은 기본 페널티)
// ==========================================

use crate::domain::machine::Machine;
use crate::domain::product::Product;
use crate::domain::types::ColorCategory;
use crate::engine::setup_matrix::SetupMatrix;
use crate::importer::error::ImportError;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

#[derive(Debug, Deserialize)]
struct ProductRow {
    product_code: String,
    width_mm: i64,
    color: String,
}

#[derive(Debug, Deserialize)]
struct MachineRow {
    machine_id: String,
    #[serde(default)]
    name: Option<String>,
    width_min_mm: i64,
    width_max_mm: i64,
    #[serde(default)]
    speed_m_per_min: Option<f64>,
    #[serde(default)]
    max_items_per_cycle: Option<usize>,
    #[serde(default)]
    available: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct SetupRow {
    from_color: String,
    to_color: String,
    minutes: i64,
}

fn open_reader(path: &Path) -> Result<csv::Reader<std::fs::File>, ImportError> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?)
}

fn parse_color(row: usize, value: &str) -> Result<ColorCategory, ImportError> {
    ColorCategory::parse(value).ok_or_else(|| ImportError::UnknownColor {
        row,
        value: value.to_string(),
    })
}

/// 제품 카탈로그 CSV 로드
pub fn load_products_csv(path: &Path) -> Result<Vec<Product>, ImportError> {
    let mut reader = open_reader(path)?;
    let mut products = Vec::new();
    for (idx, result) in reader.deserialize::<ProductRow>().enumerate() {
        let row_no = idx + 2;
        let row = result?;
        if row.product_code.is_empty() {
            return Err(ImportError::PrimaryKeyMissing(row_no));
        }
        if row.width_mm <= 0 {
            return Err(ImportError::ValueRangeError {
                row: row_no,
                field: "width_mm".to_string(),
                message: format!("양수여야 함, 실제 {}", row.width_mm),
            });
        }
        let color = parse_color(row_no, &row.color)?;
        products.push(Product::new(row.product_code, row.width_mm, color));
    }
    info!(count = products.len(), path = %path.display(), "제품 카탈로그 로드 완료");
    Ok(products)
}

/// 기계 명단 CSV 로드
pub fn load_machines_csv(path: &Path) -> Result<Vec<Machine>, ImportError> {
    let mut reader = open_reader(path)?;
    let mut machines = Vec::new();
    for (idx, result) in reader.deserialize::<MachineRow>().enumerate() {
        let row_no = idx + 2;
        let row = result?;
        if row.machine_id.is_empty() {
            return Err(ImportError::PrimaryKeyMissing(row_no));
        }
        if row.width_min_mm > row.width_max_mm {
            return Err(ImportError::ValueRangeError {
                row: row_no,
                field: "width_min_mm".to_string(),
                message: format!("범위 역전: [{}, {}]", row.width_min_mm, row.width_max_mm),
            });
        }
        if let Some(speed) = row.speed_m_per_min {
            // 속도 0이면 생산 시간이 0으로 붕괴해 용량/납기 검사가 무력화된다
            if speed <= 0.0 {
                return Err(ImportError::ValueRangeError {
                    row: row_no,
                    field: "speed_m_per_min".to_string(),
                    message: format!("양수여야 함, 실제 {}", speed),
                });
            }
        }
        if row.max_items_per_cycle == Some(0) {
            return Err(ImportError::ValueRangeError {
                row: row_no,
                field: "max_items_per_cycle".to_string(),
                message: "0은 허용되지 않음".to_string(),
            });
        }
        let name = row.name.unwrap_or_else(|| row.machine_id.clone());
        let mut machine = Machine::new(row.machine_id, name, row.width_min_mm, row.width_max_mm);
        if let Some(speed) = row.speed_m_per_min {
            machine.speed_m_per_min = speed;
        }
        if let Some(max_items) = row.max_items_per_cycle {
            machine.max_items_per_cycle = max_items;
        }
        if let Some(available) = row.available {
            machine.available = available;
        }
        machines.push(machine);
    }
    info!(count = machines.len(), path = %path.display(), "기계 명단 로드 완료");
    Ok(machines)
}

/// 셋업 매트릭스 CSV 로드
///
/// 파일에 없는 전환 쌍은 default_penalty_min으로 과금된다
pub fn load_setup_matrix_csv(
    path: &Path,
    default_penalty_min: i64,
) -> Result<SetupMatrix, ImportError> {
    let mut reader = open_reader(path)?;
    let mut matrix = SetupMatrix::new(default_penalty_min);
    for (idx, result) in reader.deserialize::<SetupRow>().enumerate() {
        let row_no = idx + 2;
        let row = result?;
        let from = parse_color(row_no, &row.from_color)?;
        let to = parse_color(row_no, &row.to_color)?;
        if row.minutes < 0 {
            return Err(ImportError::ValueRangeError {
                row: row_no,
                field: "minutes".to_string(),
                message: format!("음수 불가, 실제 {}", row.minutes),
            });
        }
        matrix.set(from, to, row.minutes);
    }
    Ok(matrix)
}
