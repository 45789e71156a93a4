use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::cache::store::CacheStatus;
use crate::foundation::error::{CardError, CardResult};
use crate::pipeline::service::{CardService, DEFAULT_HOST};

/// Response header telling whether the card came from the cache.
pub const CACHE_HEADER: &str = "x-ogcard-cache";

#[derive(Clone)]
struct AppState {
    service: Arc<CardService>,
}

#[derive(Debug, serde::Deserialize)]
struct CardQuery {
    path: Option<String>,
}

/// Routes: the card endpoint at the configured mount path, plus `/healthz`.
pub fn router(service: Arc<CardService>) -> Router {
    let mount = service.config().mount_path.clone();
    Router::new()
        .route("/healthz", get(healthz))
        .route(&mount, get(card))
        .with_state(AppState { service })
        .layer(TraceLayer::new_for_http())
}

/// Run startup work, then serve until the listener fails.
pub async fn serve(service: Arc<CardService>, listener: tokio::net::TcpListener) -> CardResult<()> {
    service.init().await;
    let addr = listener.local_addr().context("listener address")?;
    tracing::info!(
        "listening on http://{addr}{}?path=<page>",
        service.config().mount_path
    );
    axum::serve(listener, router(service))
        .await
        .context("http server failed")?;
    Ok(())
}

/// HTTP status reported for a failed card request.
pub fn status_for(err: &CardError) -> StatusCode {
    match err {
        CardError::Validation(_) => StatusCode::BAD_REQUEST,
        CardError::Fetch(_) => StatusCode::BAD_GATEWAY,
        CardError::Render(_)
        | CardError::Encode(_)
        | CardError::Cache { .. }
        | CardError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn healthz() -> impl IntoResponse {
    "ok"
}

async fn card(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<CardQuery>,
) -> Response {
    let Some(path) = query.path.filter(|p| !p.is_empty()) else {
        return StatusCode::NO_CONTENT.into_response();
    };
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .filter(|h| !h.is_empty())
        .unwrap_or(DEFAULT_HOST);

    match state.service.card_for_path(&path, host).await {
        Ok(img) => {
            let cache = match img.cache {
                CacheStatus::Hit => "hit",
                CacheStatus::Miss => "miss",
            };
            (
                [
                    (header::CONTENT_TYPE, HeaderValue::from_static(img.content_type)),
                    (
                        header::HeaderName::from_static(CACHE_HEADER),
                        HeaderValue::from_static(cache),
                    ),
                ],
                img.bytes,
            )
                .into_response()
        }
        Err(e) => status_for(&e).into_response(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/server/http.rs"]
mod tests;
