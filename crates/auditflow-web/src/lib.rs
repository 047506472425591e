use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    Router, middleware,
    routing::{get, post},
};

use auditflow_core::AuditService;

mod dto;
mod error;
mod handlers;
mod security;

#[cfg(test)]
mod tests;

const PURGE_INTERVAL: Duration = Duration::from_secs(15 * 60);

#[derive(Clone)]
pub(crate) struct WebState {
    pub(crate) service: AuditService,
}

impl WebState {
    const fn new(service: AuditService) -> Self {
        Self { service }
    }
}

/// Start the audit HTTP server and block until shutdown.
///
/// # Errors
/// Returns an error when the runtime cannot be created, the socket cannot be
/// bound, or the server exits with a runtime failure.
pub fn serve_web(service: AuditService, host: &str, port: u16) -> Result<()> {
    let purged = service
        .purge_expired()
        .context("failed to purge expired sessions before serving")?;
    let state = WebState::new(service);
    let bind_addr = format!("{host}:{port}");
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build web runtime")?;

    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(&bind_addr)
            .await
            .with_context(|| format!("failed to bind web server at {bind_addr}"))?;
        let addr = listener.local_addr()?;
        tracing::info!(
            %addr,
            advisor = state.service.advisor_name(),
            purged,
            "audit server listening"
        );
        let purge_task = spawn_purge_task(state.service.clone(), PURGE_INTERVAL);

        axum::serve(listener, app_router(state))
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("shutdown signal received");
            })
            .await
            .context("web server failed")?;
        purge_task.abort();
        Ok::<(), anyhow::Error>(())
    })
}

/// Drop expired sessions and rate-limit rows every `period` while the server
/// runs. Failures are logged and retried on the next tick.
pub(crate) fn spawn_purge_task(
    service: AuditService,
    period: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let service = service.clone();
            let outcome = tokio::task::spawn_blocking(move || service.purge_expired()).await;
            let error = match outcome {
                Ok(Ok(_)) => continue,
                Ok(Err(err)) => err.to_string(),
                Err(err) => err.to_string(),
            };
            tracing::warn!(operation = "audit.purge", %error, "periodic purge failed");
        }
    })
}

pub(crate) fn app_router(state: WebState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/api/audit/session", post(handlers::start_session))
        .route("/api/audit/session/{id}", get(handlers::get_session))
        .route("/api/audit/message", post(handlers::submit_message))
        .route("/api/audit/email-results", post(handlers::email_results))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security::origin_guard_middleware,
        ))
        .layer(middleware::from_fn(security::security_headers_middleware))
        .with_state(state)
}
