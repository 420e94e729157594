// ==========================================
// PE 필름 생산 스케줄링 시스템 - 리포트 내보내기
// ==========================================
// 스케줄 → 마크다운/JSON 산출물
// 형식 소유권은 외부 리포트 콜라보레이터에 있고,
// 여기서는 인수인계용 직렬화만 담당한다
// ==========================================

use crate::domain::schedule::Schedule;
use std::fmt::Write as _;

/// 스케줄을 마크다운으로 포맷
pub fn format_schedule_markdown(schedule: &Schedule) -> String {
    let summary = schedule.summary();
    let mut out = String::new();

    let _ = writeln!(out, "# 생산 스케줄 - {}", schedule.plan_date);
    let _ = writeln!(out);
    let _ = writeln!(out, "## 요약");
    let _ = writeln!(out);
    let _ = writeln!(out, "| 항목 | 값 |");
    let _ = writeln!(out, "|------|-----|");
    let _ = writeln!(out, "| 엔진 모드 | {} |", summary.engine_mode);
    let _ = writeln!(out, "| 총 주문 | {}건 |", summary.total_orders);
    let _ = writeln!(out, "| 기각 | {}건 |", summary.rejected_orders);
    let _ = writeln!(out, "| 납기 초과 | {}건 |", summary.due_date_misses);
    let _ = writeln!(out, "| 사용 기계 | {}대 |", summary.machines_used);
    let _ = writeln!(out, "| 총 셋업 시간 | {}분 |", summary.total_setup_minutes);
    let _ = writeln!(out);
    let _ = writeln!(out, "## 상세 스케줄");
    let _ = writeln!(out);

    for machine in &schedule.machines {
        if machine.slots.is_empty() {
            continue;
        }
        let _ = writeln!(out, "### {}", machine.machine_id);
        let _ = writeln!(out);
        let _ = writeln!(out, "| 시작 | 종료 | 로트 | 주문ID | 제품 | 수량 | 셋업 |");
        let _ = writeln!(out, "|------|------|------|--------|------|------|------|");
        for slot in &machine.slots {
            for entry in &slot.lot.entries {
                let _ = writeln!(
                    out,
                    "| {} | {} | {} | {} | {} | {}롤 | {}분 |",
                    slot.start_time.format("%m-%d %H:%M"),
                    slot.end_time.format("%m-%d %H:%M"),
                    slot.lot.lot_id,
                    entry.order_id,
                    entry.product_code,
                    entry.rolls,
                    slot.setup_minutes,
                );
            }
        }
        let _ = writeln!(out);
    }

    if !schedule.rejected.is_empty() {
        let _ = writeln!(out, "## 미배정 주문");
        let _ = writeln!(out);
        for rejected in &schedule.rejected {
            let _ = writeln!(
                out,
                "- {}: {} ({})",
                rejected.order_id, rejected.product_code, rejected.reason
            );
        }
        let _ = writeln!(out);
    }

    if !schedule.due_date_misses.is_empty() {
        let _ = writeln!(out, "## 납기 초과");
        let _ = writeln!(out);
        for miss in &schedule.due_date_misses {
            let _ = writeln!(
                out,
                "- {}: {} 배정, {}일 지연",
                miss.order_id, miss.machine_id, miss.days_late
            );
        }
        let _ = writeln!(out);
    }

    if !schedule.cycle_notes.is_empty() {
        let _ = writeln!(out, "## 사이클 올림 보정");
        let _ = writeln!(out);
        for note in &schedule.cycle_notes {
            let _ = writeln!(
                out,
                "- {}: 요청 {}롤 → 배정 {}롤 (이월 {}롤)",
                note.order_id, note.requested_rolls, note.scheduled_rolls, note.carry_over_rolls
            );
        }
    }

    out
}

/// 스케줄을 JSON 문자열로 직렬화
pub fn format_schedule_json(schedule: &Schedule) -> serde_json::Result<String> {
    serde_json::to_string_pretty(schedule)
}
