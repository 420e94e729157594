// ==========================================
// PE 필름 생산 스케줄링 시스템 - CLI 진입점
// ==========================================
// 사용법:
//   film-aps --demo [--date YYYY-MM-DD] [--output DIR] [--format md|json|both]
//   film-aps --orders orders.csv --products products.csv --machines machines.csv
//            [--setup setup.csv] [--config config.json] [--date YYYY-MM-DD]
// ==========================================

use anyhow::{bail, Context};
use chrono::{Duration, NaiveDate, Utc};
use film_aps::domain::types::{ColorCategory, OrderPriority};
use film_aps::domain::{Machine, Order, Product};
use film_aps::engine::{PlanningOrchestrator, PlanningSnapshot, SetupMatrix};
use film_aps::{config::PlanningConfig, importer, logging, report, OfflineApsEngine};
use std::path::{Path, PathBuf};
use std::sync::Arc;

struct CliArgs {
    orders: Option<PathBuf>,
    products: Option<PathBuf>,
    machines: Option<PathBuf>,
    setup: Option<PathBuf>,
    config: Option<PathBuf>,
    date: Option<NaiveDate>,
    output: PathBuf,
    format: String,
    demo: bool,
}

fn parse_args() -> anyhow::Result<CliArgs> {
    let mut parsed = CliArgs {
        orders: None,
        products: None,
        machines: None,
        setup: None,
        config: None,
        date: None,
        output: PathBuf::from("outputs/schedules"),
        format: "both".to_string(),
        demo: false,
    };

    let mut args = std::env::args().skip(1);
    while let Some(flag) = args.next() {
        let mut value = |name: &str| {
            args.next()
                .with_context(|| format!("{} 값이 없습니다", name))
        };
        match flag.as_str() {
            "--orders" => parsed.orders = Some(PathBuf::from(value("--orders")?)),
            "--products" => parsed.products = Some(PathBuf::from(value("--products")?)),
            "--machines" => parsed.machines = Some(PathBuf::from(value("--machines")?)),
            "--setup" => parsed.setup = Some(PathBuf::from(value("--setup")?)),
            "--config" => parsed.config = Some(PathBuf::from(value("--config")?)),
            "--date" => {
                let raw = value("--date")?;
                parsed.date = Some(
                    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                        .with_context(|| format!("--date 형식 오류: {}", raw))?,
                );
            }
            "--output" => parsed.output = PathBuf::from(value("--output")?),
            "--format" => parsed.format = value("--format")?,
            "--demo" => parsed.demo = true,
            other => bail!("알 수 없는 옵션: {}", other),
        }
    }

    if !matches!(parsed.format.as_str(), "md" | "json" | "both") {
        bail!("--format은 md|json|both 중 하나여야 합니다");
    }
    Ok(parsed)
}

// 데모 데이터 (현장 표준 3대 기계 + 샘플 주문)
fn demo_snapshot(plan_date: NaiveDate, config: &PlanningConfig) -> PlanningSnapshot {
    let products = vec![
        Product::new("PE-FILM-500", 500, ColorCategory::Clear),
        Product::new("PE-FILM-500C", 500, ColorCategory::Color),
        Product::new("PE-FILM-600", 600, ColorCategory::Clear),
        Product::new("PE-FILM-600C", 600, ColorCategory::Color),
        Product::new("PE-FILM-700", 700, ColorCategory::Clear),
        Product::new("PE-FILM-800", 800, ColorCategory::Clear),
        Product::new("PE-FILM-1000", 1000, ColorCategory::Clear),
    ];
    let machines = vec![
        Machine::new("M1", "1호기", 400, 600),
        Machine::new("M2", "2호기", 500, 800),
        Machine::new("M3", "3호기", 700, 1200),
    ];
    let d = |days: i64| plan_date + Duration::days(days);
    let orders = vec![
        Order::new("ORD-001", "PE-FILM-500", 10, d(1), OrderPriority::Rush),
        Order::new("ORD-002", "PE-FILM-600", 8, d(1), OrderPriority::Normal),
        Order::new("ORD-003", "PE-FILM-500C", 12, d(2), OrderPriority::Normal),
        Order::new("ORD-004", "PE-FILM-800", 6, d(1), OrderPriority::VeryRush),
        Order::new("ORD-005", "PE-FILM-1000", 4, d(2), OrderPriority::Normal),
        Order::new("ORD-006", "PE-FILM-600C", 15, d(1), OrderPriority::Rush),
        Order::new("ORD-007", "PE-FILM-700", 5, d(3), OrderPriority::Normal),
        Order::new("ORD-008", "PE-FILM-500", 8, d(1), OrderPriority::Normal),
    ];
    PlanningSnapshot {
        orders,
        products,
        machines,
        setup_matrix: SetupMatrix::standard(config.default_setup_penalty_min),
    }
}

fn load_snapshot(args: &CliArgs, config: &PlanningConfig) -> anyhow::Result<PlanningSnapshot> {
    let products_path = args
        .products
        .as_deref()
        .context("--products가 필요합니다 (또는 --demo)")?;
    let machines_path = args
        .machines
        .as_deref()
        .context("--machines가 필요합니다 (또는 --demo)")?;
    let orders_path = args
        .orders
        .as_deref()
        .context("--orders가 필요합니다 (또는 --demo)")?;

    let products = importer::load_products_csv(products_path)?;
    let machines = importer::load_machines_csv(machines_path)?;
    let orders = importer::load_orders_csv(orders_path, &products)?;
    let setup_matrix = match args.setup.as_deref() {
        Some(path) => importer::load_setup_matrix_csv(path, config.default_setup_penalty_min)?,
        None => SetupMatrix::standard(config.default_setup_penalty_min),
    };

    Ok(PlanningSnapshot {
        orders,
        products,
        machines,
        setup_matrix,
    })
}

fn write_artifacts(
    schedule: &film_aps::Schedule,
    output: &Path,
    format: &str,
) -> anyhow::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output)?;
    let date_tag = schedule.plan_date.format("%Y%m%d").to_string();
    let mut written = Vec::new();

    if format == "md" || format == "both" {
        let path = output.join(format!("schedule-{}.md", date_tag));
        std::fs::write(&path, report::format_schedule_markdown(schedule))?;
        written.push(path);
    }
    if format == "json" || format == "both" {
        let path = output.join(format!("schedule-{}.json", date_tag));
        std::fs::write(&path, report::format_schedule_json(schedule)?)?;
        written.push(path);
    }
    Ok(written)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("PE 필름 생산 스케줄링 시스템");
    tracing::info!("버전: {}", film_aps::VERSION);
    tracing::info!("==================================================");

    let args = parse_args()?;
    let config = match args.config.as_deref() {
        Some(path) => PlanningConfig::from_json_file(path)?,
        None => PlanningConfig::default(),
    };

    let plan_date = args
        .date
        .unwrap_or_else(|| Utc::now().date_naive());

    let snapshot = if args.demo || args.orders.is_none() {
        tracing::info!("데모 모드: 샘플 주문 사용");
        demo_snapshot(plan_date, &config)
    } else {
        load_snapshot(&args, &config)?
    };
    tracing::info!(orders = snapshot.orders.len(), "주문 로드 완료");

    let orchestrator = PlanningOrchestrator::new(Arc::new(OfflineApsEngine), config);
    let schedule = orchestrator.run(&snapshot, plan_date).await?;

    let summary = schedule.summary();
    tracing::info!(
        engine_mode = %summary.engine_mode,
        assigned = summary.total_orders,
        rejected = summary.rejected_orders,
        misses = summary.due_date_misses,
        setup_min = summary.total_setup_minutes,
        "스케줄 생성 완료"
    );

    let written = write_artifacts(&schedule, &args.output, &args.format)?;
    for path in &written {
        tracing::info!(path = %path.display(), "산출물 저장");
    }

    println!("{}", report::format_schedule_markdown(&schedule));
    Ok(())
}
