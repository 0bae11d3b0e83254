use super::{page, SharedState};
use crate::error::SubmissionError;
use crate::form::FormInput;
use crate::ledger::Submitted;
use crate::model::{taxonomy, Draft};
use axum::extract::{Form, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use chrono::{Datelike, Local, NaiveDate};
use maud::Markup;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

/// GET /
pub(super) async fn index(State(state): State<SharedState>) -> Markup {
    let (session, notice) = {
        let mut current = state.page.lock().await;
        (current.session.clone(), current.notice.take())
    };
    let dashboard = state.ledger.dashboard(Local::now().month()).await;
    page::render(&session, &dashboard, notice.as_ref())
}

/// POST /form
pub(super) async fn post_form(
    State(state): State<SharedState>,
    Form(input): Form<FormInput>,
) -> Redirect {
    debug!("POST /form - {:?} (changed: {:?})", input.action, input.changed);
    let mut current = state.page.lock().await;
    let notice = current.post(&state.ledger, &input).await;
    current.notice = notice;
    Redirect::to("/")
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct OptionsQuery {
    major: Option<String>,
    middle: Option<String>,
    sub: Option<String>,
}

/// GET /api/options
///
/// A level given without the levels above it has no options.
pub(super) async fn options(Query(query): Query<OptionsQuery>) -> Json<Vec<&'static str>> {
    let levels: Vec<Option<&str>> = [&query.major, &query.middle, &query.sub]
        .into_iter()
        .map(|level| level.as_deref().filter(|v| !v.is_empty()))
        .collect();
    let depth = levels.iter().take_while(|level| level.is_some()).count();
    if levels[depth..].iter().any(Option::is_some) {
        return Json(Vec::new());
    }
    let ancestors: Vec<&str> = levels.into_iter().flatten().collect();
    Json(taxonomy::options(&ancestors))
}

/// GET /api/payment-methods
pub(super) async fn payment_methods() -> Json<Vec<&'static str>> {
    Json(taxonomy::payment_methods())
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct DashboardQuery {
    month: Option<u32>,
}

/// GET /api/dashboard
pub(super) async fn dashboard(
    State(state): State<SharedState>,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let month = query.month.unwrap_or_else(|| Local::now().month());
    if !(1..=12).contains(&month) {
        return error_response(
            StatusCode::BAD_REQUEST,
            "invalid_month",
            &format!("월은 1에서 12 사이여야 합니다: {month}"),
        );
    }
    Json(state.ledger.dashboard(month).await).into_response()
}

/// The body of POST /api/entries.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct EntryRequest {
    date: Option<NaiveDate>,
    amount: Option<u64>,
    payment: Option<String>,
    major: Option<String>,
    middle: Option<String>,
    sub: Option<String>,
    detail: Option<String>,
    description: String,
}

impl EntryRequest {
    fn draft(&self) -> Result<Draft, SubmissionError> {
        let mut draft = match self.date {
            Some(date) => Draft::new(date),
            None => Draft::today(),
        };
        draft.amount = self.amount;
        draft.payment = self.payment.clone();
        draft.description = self.description.trim().to_string();
        draft.select_categories([
            self.major.as_deref(),
            self.middle.as_deref(),
            self.sub.as_deref(),
            self.detail.as_deref(),
        ])?;
        Ok(draft)
    }
}

/// POST /api/entries
pub(super) async fn create_entry(
    State(state): State<SharedState>,
    Json(request): Json<EntryRequest>,
) -> Result<(StatusCode, Json<Submitted>), SubmissionError> {
    let draft = request.draft()?;
    let submitted = state.ledger.submit(&draft).await?;
    Ok((StatusCode::CREATED, Json(submitted)))
}

impl IntoResponse for SubmissionError {
    fn into_response(self) -> Response {
        let status = match self {
            SubmissionError::MissingField(_) | SubmissionError::InvalidSelection(_) => {
                StatusCode::BAD_REQUEST
            }
            SubmissionError::TargetTableNotFound(_) => StatusCode::NOT_FOUND,
            SubmissionError::RemoteStoreFailure(_) => StatusCode::BAD_GATEWAY,
        };
        warn!("Entry not recorded: {self}");
        error_response(status, self.kind(), &self.user_message())
    }
}

fn error_response(status: StatusCode, kind: &str, message: &str) -> Response {
    (status, Json(json!({ "error": kind, "message": message }))).into_response()
}
