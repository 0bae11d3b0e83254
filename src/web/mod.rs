//! The web UI: one HTML page with the dashboard and the entry form, plus a small JSON API.

mod handlers;
mod page;

use crate::form::{FormAction, FormInput, FormSession, Notice};
use crate::ledger::Ledger;
use crate::Result;
use anyhow::Context;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tracing::info;

type SharedState = Arc<AppState>;

/// Everything the handlers share: the ledger and the state of the single entry form.
pub struct AppState {
    ledger: Ledger,
    page: Mutex<PageState>,
}

impl AppState {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            ledger,
            page: Mutex::new(PageState::default()),
        }
    }
}

/// The current form instance and the notice waiting to be shown on the next page load.
#[derive(Debug, Default)]
struct PageState {
    session: FormSession,
    notice: Option<Notice>,
}

impl PageState {
    /// Applies a posted form and returns the notice to show, if any.
    async fn post(&mut self, ledger: &Ledger, input: &FormInput) -> Option<Notice> {
        if !self.session.is_current(input.form_id) {
            return Some(Notice::stale());
        }
        if let Err(notice) = self.session.apply(input) {
            return Some(notice);
        }
        match input.action {
            FormAction::Select => None,
            FormAction::Submit => match ledger.submit(self.session.draft()).await {
                Ok(submitted) => {
                    self.session = self.session.next();
                    Some(Notice::saved(&submitted.month))
                }
                Err(e) => Some(e.into()),
            },
        }
    }
}

/// The application's routes, sharing `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/form", post(handlers::post_form))
        .route("/api/options", get(handlers::options))
        .route("/api/payment-methods", get(handlers::payment_methods))
        .route("/api/dashboard", get(handlers::dashboard))
        .route("/api/entries", post(handlers::create_entry))
        .with_state(Arc::new(state))
}

/// Serves the web UI on `listen` until interrupted.
pub async fn serve(ledger: Ledger, listen: &str) -> Result<()> {
    let listener = TcpListener::bind(listen)
        .await
        .with_context(|| format!("Unable to listen on {listen}"))?;
    let addr = listener.local_addr().context("Unable to read the listening address")?;
    info!("Serving the ledger at http://{addr}");

    axum::serve(listener, router(AppState::new(ledger)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("The web server failed")?;
    info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Unable to listen for the shutdown signal: {e}");
    }
}
