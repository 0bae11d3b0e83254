//! HTML for the single page of the web UI.

use crate::form::{FormSession, Notice};
use crate::ledger::{Dashboard, DashboardStatus};
use crate::model::{taxonomy, thousands, Level};
use maud::{html, Markup, PreEscaped, DOCTYPE};

const STYLE: &str = r#"
body { font-family: sans-serif; background: #fafafa; margin: 0; }
.container { max-width: 450px; margin: 0 auto; padding: 2rem 1rem 5rem; }
.header-box { background: #2C3E50; padding: 20px; border-radius: 15px; text-align: center;
  margin-bottom: 20px; box-shadow: 0 4px 6px rgba(0,0,0,0.1); }
.header-text { font-size: 24px; font-weight: bold; color: white; letter-spacing: 5px; }
.dashboard { background: #F0F2F6; padding: 15px; border-radius: 15px; margin-bottom: 25px; }
.dashboard-grid { display: grid; grid-template-columns: 1fr 1fr; gap: 10px; }
.stat-box { background: white; padding: 15px; border-radius: 12px; text-align: center; }
.stat-label { font-size: 14px; color: #666; margin-bottom: 5px; font-weight: bold; }
.stat-value { font-size: 18px; font-weight: bold; }
.dashboard-status { font-size: 12px; color: #999; margin-top: 8px; text-align: center; }
.notice { padding: 12px; border-radius: 8px; margin-bottom: 15px; }
.notice.success { background: #E8F5E9; color: #2E7D32; }
.notice.warning { background: #FFF8E1; color: #8D6E00; }
.notice.error { background: #FFEBEE; color: #C62828; }
form { border: 1px solid #ddd; border-radius: 10px; padding: 15px; background: white; }
.row { display: grid; gap: 10px; margin-bottom: 10px; }
.row.three { grid-template-columns: 1.2fr 1fr 1.8fr; }
.row.two { grid-template-columns: 1fr 1fr; }
label { display: block; font-weight: bold; font-size: 13px; margin-bottom: 4px; }
input, select, textarea { width: 100%; box-sizing: border-box; padding: 6px; }
button { width: 100%; padding: 10px; background: #1A5276; color: white; border: none;
  border-radius: 8px; font-weight: bold; margin-top: 10px; }
"#;

/// The whole page: header, dashboard tiles, the one-shot notice and the entry form.
pub(super) fn render(
    session: &FormSession,
    dashboard: &Dashboard,
    notice: Option<&Notice>,
) -> Markup {
    html! {
        (DOCTYPE)
        html lang="ko" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { "가계부" }
                style { (PreEscaped(STYLE)) }
            }
            body {
                div class="container" {
                    div class="header-box" {
                        span class="header-text" { "가 계 부" }
                    }
                    (dashboard_tiles(dashboard))
                    @if let Some(notice) = notice {
                        div class={ "notice " (notice.kind()) } { (notice.text()) }
                    }
                    (entry_form(session))
                }
            }
        }
    }
}

fn dashboard_tiles(dashboard: &Dashboard) -> Markup {
    let totals = &dashboard.totals;
    let tiles = [
        ("💰 이번 달 수입", format!("+{}", thousands(totals.income)), "#4CAF50"),
        ("💸 이번 달 지출", format!("-{}", thousands(totals.expense)), "#F44336"),
        ("🐷 이번 달 저축", thousands(totals.saving), "#2196F3"),
        ("📈 이번 달 투자", thousands(totals.invest), "#FF9800"),
    ];
    html! {
        div class="dashboard" data-month=(dashboard.month) {
            div class="dashboard-grid" {
                @for (label, value, color) in tiles {
                    div class="stat-box" {
                        div class="stat-label" { (label) }
                        div class="stat-value" style={ "color: " (color) ";" } { (value) }
                    }
                }
            }
            @match &dashboard.status {
                DashboardStatus::Loaded => {},
                DashboardStatus::NoData => {
                    div class="dashboard-status" { (dashboard.month) " 시트에 아직 기록이 없습니다." }
                },
                DashboardStatus::FetchFailed(_) => {
                    div class="dashboard-status" { (dashboard.month) " 시트를 불러오지 못했습니다." }
                },
            }
        }
    }
}

fn entry_form(session: &FormSession) -> Markup {
    let draft = session.draft();
    let amount = draft.amount.map(|a| a.to_string()).unwrap_or_default();
    let date = draft.date.format("%Y-%m-%d").to_string();
    let methods = taxonomy::payment_methods();
    html! {
        form method="post" action="/form" {
            input type="hidden" name="form_id" value=(session.id());
            input type="hidden" name="changed" value="";
            div class="row three" {
                div {
                    label for="date" { "📅 사용일자" }
                    input type="date" id="date" name="date" value=(date);
                }
                div {
                    label for="amount" { "💰 금액 (₩)" }
                    input type="number" id="amount" name="amount" min="0" step="1000"
                        placeholder="0" value=(amount);
                }
                div {
                    label for="payment" { "💳 결제수단" }
                    (dropdown("payment", "payment", &methods, draft.payment.as_deref(), None))
                }
            }
            div class="row two" {
                (category(session, Level::Major, "📂 대분류"))
                (category(session, Level::Middle, "🗂️ 중분류"))
            }
            div class="row two" {
                (category(session, Level::Sub, "📑 소분류"))
                (category(session, Level::Detail, "🔖 상세"))
            }
            label for="description" { "📝 내역" }
            textarea id="description" name="description" rows="3"
                placeholder="기타 메모 사항을 입력하세요" { (draft.description) }
            // The step only drives the spinner; amounts are checked on the server.
            button type="submit" name="action" value="submit" formnovalidate { "➕ 기록하기" }
        }
    }
}

fn category(session: &FormSession, level: Level, caption: &str) -> Markup {
    let selection = &session.draft().selection;
    let name = level.to_string();
    // Changing a category posts the form right away so the levels below can be rebuilt.
    let onchange = format!("this.form.changed.value='{name}'; this.form.submit();");
    let options = selection.options(level);
    html! {
        div {
            label for=(name) { (caption) }
            (dropdown(&name, &name, &options, selection.get(level), Some(&onchange)))
        }
    }
}

fn dropdown(
    id: &str,
    name: &str,
    options: &[&str],
    selected: Option<&str>,
    onchange: Option<&str>,
) -> Markup {
    html! {
        select id=(id) name=(name) onchange=[onchange] disabled[options.is_empty()] {
            option value="" selected[selected.is_none()] { "선택" }
            @for option in options {
                option value=(option) selected[selected == Some(*option)] { (option) }
            }
        }
    }
}
