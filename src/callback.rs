//! One-shot local listener for the OAuth redirect that carries the token.
use anyhow::{anyhow, Context, Result};
use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    Router,
};
use serde::Deserialize;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

const SIGNED_IN_PAGE: &str = "<!doctype html><html><body>\
<h1>Signed in</h1><p>You can close this window and return to the terminal.</p>\
</body></html>";

#[derive(Clone)]
pub struct CallbackState {
    redirect_tx: Arc<Mutex<Option<oneshot::Sender<String>>>>,
}

impl CallbackState {
    pub fn new(redirect_tx: oneshot::Sender<String>) -> Self {
        Self {
            redirect_tx: Arc::new(Mutex::new(Some(redirect_tx))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CallbackParams {
    token: Option<String>,
}

/// Every path is accepted; only requests carrying a non-empty `token`
/// complete the flow.
pub fn build_router(state: CallbackState) -> Router {
    Router::new()
        .fallback(handle_redirect)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn handle_redirect(
    State(state): State<CallbackState>,
    Query(params): Query<CallbackParams>,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    if params.token.as_deref().map_or(true, str::is_empty) {
        debug!("Ignoring callback request without token: {}", uri.path());
        return (StatusCode::BAD_REQUEST, "missing token").into_response();
    }

    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    let redirect_url = format!("http://{host}{uri}");

    let Some(tx) = state.redirect_tx.lock().await.take() else {
        warn!("Duplicate login callback ignored");
        return (StatusCode::CONFLICT, "login already completed").into_response();
    };
    if tx.send(redirect_url).is_err() {
        warn!("Login callback arrived after the listener gave up");
        return (StatusCode::GONE, "login no longer pending").into_response();
    }

    info!("Received login callback");
    (
        StatusCode::OK,
        [(header::CONNECTION, "close")],
        Html(SIGNED_IN_PAGE),
    )
        .into_response()
}

pub async fn bind(addr: SocketAddr) -> Result<TcpListener> {
    TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind login callback listener on {addr}"))
}

/// Serves the callback router until the redirect arrives, Ctrl+C is pressed
/// or `timeout` elapses. Returns the full redirect URL, token included.
pub async fn wait_for_redirect(listener: TcpListener, timeout: Duration) -> Result<String> {
    let addr = listener
        .local_addr()
        .context("failed to read callback listener address")?;
    let (redirect_tx, redirect_rx) = oneshot::channel();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let app = build_router(CallbackState::new(redirect_tx));

    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = stop_rx.await;
            })
            .await
    });
    info!("Waiting for login callback on http://{}", addr);

    let outcome = tokio::select! {
        redirect = redirect_rx => redirect.map_err(|_| anyhow!("callback listener closed before a token arrived")),
        _ = tokio::signal::ctrl_c() => Err(anyhow!("login cancelled")),
        _ = tokio::time::sleep(timeout) => Err(anyhow!("timed out after {:?} waiting for login callback", timeout)),
    };

    let _ = stop_tx.send(());
    match tokio::time::timeout(Duration::from_secs(2), server).await {
        Ok(Ok(Err(e))) => warn!("Callback listener error: {}", e),
        Ok(Err(e)) => warn!("Callback listener task failed: {}", e),
        Err(_) => debug!("Callback listener still draining connections"),
        Ok(Ok(Ok(()))) => {}
    }

    outcome
}
