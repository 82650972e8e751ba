//! # Actions HTTP API
//!
//! Builds the axum router that serves the transfer action. All endpoints
//! share application state through axum's `State` extractor.
//!
//! ## Endpoints
//!
//! | Method       | Path                                | Description                   |
//! |--------------|-------------------------------------|-------------------------------|
//! | GET, OPTIONS | `/api/actions/transfer-multi-token` | Action discovery document     |
//! | POST         | `/api/actions/transfer-multi-token` | Build an unsigned transfer    |
//! | GET, OPTIONS | `/actions.json`                     | Path rules for link unfurling |
//! | GET          | `/health`                           | Liveness probe                |
//!
//! Every response, errors and 404s included, carries the Actions CORS
//! headers plus `X-Action-Version` and `X-Blockchain-Ids`. Wallet clients
//! refuse to render an action whose preflight lacks them.

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, QueryRejection},
        Query, State,
    },
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use url::Url;

use blinkpay_protocol::action::{
    action_headers, actions_json, transfer_action, ActionError, ActionPostRequest,
};
use blinkpay_protocol::config::{ACTION_PATH, ICON_PATH};
use blinkpay_protocol::transaction::error::GENERIC_FAILURE;
use blinkpay_protocol::transaction::{BuildError, TransferBuilder, TransferParams};

use crate::metrics::SharedMetrics;

// ---------------------------------------------------------------------------
// Application State
// ---------------------------------------------------------------------------

/// Shared application state available to all request handlers.
///
/// Cheap to clone — everything behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// The server's reported version string.
    pub version: String,
    /// Transfer builder, owning the shared ledger client.
    pub builder: Arc<TransferBuilder>,
    /// Reference to Prometheus metrics for in-handler recording.
    pub metrics: SharedMetrics,
    /// Configured public origin; `None` means derive it per request.
    pub public_url: Option<Url>,
}

// ---------------------------------------------------------------------------
// Router Construction
// ---------------------------------------------------------------------------

/// Builds the full axum [`Router`] with all routes, action headers, and
/// tracing.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(
            ACTION_PATH,
            get(metadata_handler)
                .options(metadata_handler)
                .post(transfer_handler),
        )
        .route(
            "/actions.json",
            get(actions_json_handler).options(actions_json_handler),
        )
        .route("/health", get(health_handler))
        .fallback(not_found_handler)
        .layer(middleware::map_response(with_action_headers))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Stamps the Actions header set onto a response, replacing any existing
/// values for the same names.
async fn with_action_headers(mut response: Response) -> Response {
    let headers = response.headers_mut();
    for (name, value) in action_headers() {
        headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
    }
    response
}

// ---------------------------------------------------------------------------
// Response Types
// ---------------------------------------------------------------------------

/// Response payload for `GET /health`.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ActionError::new(message))).into_response()
}

// ---------------------------------------------------------------------------
// Icon Resolution
// ---------------------------------------------------------------------------

/// Absolute icon URL for the discovery document.
///
/// Uses the configured public origin when there is one. Otherwise the origin
/// is rebuilt from the request: `Host` for the authority and the first
/// `X-Forwarded-Proto` value for the scheme (default `http`), so the icon
/// resolves correctly behind a TLS-terminating proxy.
pub fn resolve_icon_url(public_url: Option<&Url>, headers: &HeaderMap) -> Result<Url, url::ParseError> {
    if let Some(base) = public_url {
        return base.join(ICON_PATH);
    }

    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .filter(|h| !h.is_empty())
        .unwrap_or("localhost");
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|s| *s == "http" || *s == "https")
        .unwrap_or("http");

    Url::parse(&format!("{scheme}://{host}"))?.join(ICON_PATH)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `GET /health` — always returns 200 if the process is running.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".into(),
        version: state.version.clone(),
    })
}

/// `GET|OPTIONS /api/actions/transfer-multi-token` — the discovery document.
async fn metadata_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    state.metrics.metadata_requests_total.inc();

    match resolve_icon_url(state.public_url.as_ref(), &headers) {
        Ok(icon) => (StatusCode::OK, Json(transfer_action(icon))).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "cannot derive icon origin from request");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, GENERIC_FAILURE)
        }
    }
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

/// `GET|OPTIONS /actions.json`
async fn actions_json_handler() -> impl IntoResponse {
    Json(actions_json())
}

/// `POST /api/actions/transfer-multi-token` — builds the unsigned transfer.
///
/// Rejections are extracted as values rather than letting axum answer, so
/// that a bad body or query still gets an Actions-shaped error. The body is
/// parsed as JSON whatever its `Content-Type`; some wallets send `text/plain`.
async fn transfer_handler(
    State(state): State<AppState>,
    query: Result<Query<TransferParams>, QueryRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let metrics = &state.metrics;

    let body = body
        .ok()
        .and_then(|bytes| serde_json::from_slice::<ActionPostRequest>(&bytes).ok());
    let Some(body) = body else {
        metrics.build_rejections_total.inc();
        tracing::debug!("rejecting transfer: unreadable body");
        return error_response(StatusCode::BAD_REQUEST, "Invalid account");
    };
    let params = match query {
        Ok(Query(params)) => params,
        Err(e) => {
            metrics.build_rejections_total.inc();
            tracing::debug!(error = %e, "rejecting transfer: unreadable query");
            return error_response(StatusCode::BAD_REQUEST, "Invalid query parameters");
        }
    };

    let timer = metrics.build_latency_seconds.start_timer();
    let result = state.builder.build(&body.account, &params).await;
    timer.observe_duration();

    let transfer = match result {
        Ok(transfer) => transfer,
        Err(e) => return build_failure(&state, e),
    };

    match transfer.to_post_response() {
        Ok(payload) => {
            metrics
                .transactions_built_total
                .with_label_values(&[transfer.request.currency().symbol()])
                .inc();
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(e) => build_failure(&state, e),
    }
}

/// Maps a build error to a response, recording it on the way out.
fn build_failure(state: &AppState, err: BuildError) -> Response {
    if err.is_client_error() {
        state.metrics.build_rejections_total.inc();
        tracing::info!(error = %err, "transfer rejected");
        return error_response(StatusCode::BAD_REQUEST, err.client_message());
    }

    if matches!(err, BuildError::Ledger(_)) {
        state.metrics.ledger_failures_total.inc();
    }
    tracing::error!(error = %err, "transfer build failed");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, err.client_message())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use blinkpay_protocol::crypto::hash::Hash;
    use blinkpay_protocol::ledger::{Checkpoint, LedgerClient, LedgerError, StaticLedger};
    use http_body_util::BodyExt;
    use std::time::Duration;
    use tower::ServiceExt;

    const SENDER: &str = "AKnL4NNf3DGWZJS6cPknBuEGnVsV4A4m5tgebLHaRSZ9";
    const RECIPIENT: &str = "9hSR6S7WPtxmTojgo6GG3k4yDPecgJY292j7xrsUGWBu";

    struct DownLedger;

    #[async_trait]
    impl LedgerClient for DownLedger {
        async fn latest_checkpoint(&self) -> Result<Checkpoint, LedgerError> {
            Err(LedgerError::Rpc {
                code: -32005,
                message: "node is behind".into(),
            })
        }
    }

    /// Creates a test AppState backed by a static ledger.
    fn test_app_state_with(ledger: Arc<dyn LedgerClient>) -> AppState {
        AppState {
            version: "0.1.0-test".into(),
            builder: Arc::new(TransferBuilder::new(ledger).fetch_timeout(Duration::from_secs(1))),
            metrics: Arc::new(crate::metrics::NodeMetrics::new().unwrap()),
            public_url: None,
        }
    }

    fn static_ledger() -> Arc<StaticLedger> {
        Arc::new(StaticLedger::new(Checkpoint {
            blockhash: Hash::new([9; 32]),
            last_valid_block_height: 77,
        }))
    }

    fn test_app_state() -> AppState {
        test_app_state_with(static_ledger())
    }

    /// Sends a request and returns (status, headers, body_bytes).
    async fn send(router: &Router, req: Request<Body>) -> (StatusCode, HeaderMap, Vec<u8>) {
        let resp = router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp
            .into_body()
            .collect()
            .await
            .unwrap()
            .to_bytes()
            .to_vec();
        (status, headers, body)
    }

    /// Sends a GET request and returns the (status, body_bytes).
    async fn get(router: &Router, path: &str) -> (StatusCode, Vec<u8>) {
        let req = Request::builder()
            .uri(path)
            .header("host", "pay.example.com")
            .body(Body::empty())
            .unwrap();
        let (status, _, body) = send(router, req).await;
        (status, body)
    }

    /// Sends a POST request with JSON body and returns (status, body_bytes).
    async fn post_json(
        router: &Router,
        path: &str,
        body: serde_json::Value,
    ) -> (StatusCode, Vec<u8>) {
        let req = Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap();
        let (status, _, body) = send(router, req).await;
        (status, body)
    }

    fn transfer_uri(token: &str, amount: &str) -> String {
        format!("{ACTION_PATH}?walletAddress={RECIPIENT}&amount={amount}&token={token}&cluster=devnet")
    }

    // -- 1. Health endpoint ---------------------------------------------------

    #[tokio::test]
    async fn health_endpoint_returns_ok() {
        let router = create_router(test_app_state());
        let (status, body) = get(&router, "/health").await;

        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], "0.1.0-test");
    }

    // -- 2. Discovery document uses the request origin -------------------------

    #[tokio::test]
    async fn metadata_icon_follows_host() {
        let state = test_app_state();
        let metrics = state.metrics.clone();
        let router = create_router(state);
        let (status, body) = get(&router, ACTION_PATH).await;

        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["type"], "action");
        assert_eq!(json["icon"], "http://pay.example.com/logo.png");
        assert_eq!(json["title"], "Transfer Multiple Tokens");
        assert_eq!(metrics.metadata_requests_total.get(), 1);
    }

    // -- 3. OPTIONS answers like GET, with action headers ----------------------

    #[tokio::test]
    async fn options_preflight_carries_action_headers() {
        let router = create_router(test_app_state());
        let req = Request::builder()
            .method("OPTIONS")
            .uri(ACTION_PATH)
            .header("host", "pay.example.com")
            .header("x-forwarded-proto", "https")
            .body(Body::empty())
            .unwrap();
        let (status, headers, body) = send(&router, req).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["access-control-allow-origin"], "*");
        assert_eq!(headers["x-action-version"], "2.1.3");
        assert_eq!(
            headers["x-blockchain-ids"],
            "solana:5eykt4UsFv8P8NJdTREpY1vzqKqZKvdp"
        );
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["icon"], "https://pay.example.com/logo.png");
    }

    // -- 4. Configured public URL wins over Host -------------------------------

    #[tokio::test]
    async fn public_url_overrides_host() {
        let mut state = test_app_state();
        state.public_url = Some(Url::parse("https://blink.example.org").unwrap());
        let router = create_router(state);
        let (_, body) = get(&router, ACTION_PATH).await;

        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["icon"], "https://blink.example.org/logo.png");
    }

    // -- 5. Discovery is byte-identical across calls ---------------------------

    #[tokio::test]
    async fn metadata_is_idempotent() {
        let router = create_router(test_app_state());
        let (_, a) = get(&router, ACTION_PATH).await;
        let (_, b) = get(&router, ACTION_PATH).await;
        assert_eq!(a, b);
    }

    // -- 5b. Unusable Host is an internal fault ------------------------------

    #[tokio::test]
    async fn metadata_with_unparseable_host_is_internal_error() {
        let router = create_router(test_app_state());
        let req = Request::builder()
            .uri(ACTION_PATH)
            .header("host", "bad host")
            .body(Body::empty())
            .unwrap();
        let (status, headers, body) = send(&router, req).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(headers["x-action-version"], "2.1.3");
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], GENERIC_FAILURE);
        assert!(json.get("icon").is_none());
    }

    // -- 6. actions.json --------------------------------------------------------

    #[tokio::test]
    async fn actions_json_maps_root_to_action() {
        let router = create_router(test_app_state());
        let (status, body) = get(&router, "/actions.json").await;

        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["rules"][0]["pathPattern"], "/");
        assert_eq!(json["rules"][0]["apiPath"], ACTION_PATH);
    }

    // -- 7. POST builds a SOL transfer -----------------------------------------

    #[tokio::test]
    async fn post_builds_sol_transfer() {
        let ledger = static_ledger();
        let state = test_app_state_with(ledger.clone());
        let metrics = state.metrics.clone();
        let router = create_router(state);

        let (status, body) = post_json(
            &router,
            &transfer_uri("SOL", "2"),
            serde_json::json!({ "account": SENDER }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["type"], "transaction");
        assert_eq!(json["message"], format!("Send 2 SOL to {RECIPIENT}"));

        let bytes = STANDARD.decode(json["transaction"].as_str().unwrap()).unwrap();
        // One empty signature slot, then a message with one required signer.
        assert_eq!(bytes[0], 1);
        assert!(bytes[1..65].iter().all(|b| *b == 0));
        assert_eq!(bytes[65], 1);

        assert_eq!(ledger.calls(), 1);
        assert_eq!(
            metrics
                .transactions_built_total
                .with_label_values(&["SOL"])
                .get(),
            1
        );
    }

    // -- 8. Defaults: no token, no amount means 1 SOL ---------------------------

    #[tokio::test]
    async fn post_defaults_to_one_sol() {
        let router = create_router(test_app_state());
        let (status, body) = post_json(
            &router,
            &format!("{ACTION_PATH}?walletAddress={RECIPIENT}"),
            serde_json::json!({ "account": SENDER }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], format!("Send 1 SOL to {RECIPIENT}"));
    }

    // -- 9. POST builds a token transfer ----------------------------------------

    #[tokio::test]
    async fn post_builds_bonk_transfer() {
        let router = create_router(test_app_state());
        let (status, body) = post_json(
            &router,
            &transfer_uri("BONK", "1000"),
            serde_json::json!({ "account": SENDER }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], format!("Send 1000 BONK to {RECIPIENT}"));
    }

    // -- 10. Invalid account is a 400 and never reaches the ledger -------------

    #[tokio::test]
    async fn post_rejects_invalid_account() {
        let ledger = static_ledger();
        let state = test_app_state_with(ledger.clone());
        let metrics = state.metrics.clone();
        let router = create_router(state);

        let (status, body) = post_json(
            &router,
            &transfer_uri("SOL", "1"),
            serde_json::json!({ "account": "not-a-key" }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["message"].as_str().unwrap().starts_with("Invalid account"));
        assert_eq!(ledger.calls(), 0);
        assert_eq!(metrics.build_rejections_total.get(), 1);
    }

    // -- 11. Missing body is treated as an invalid account ---------------------

    #[tokio::test]
    async fn post_without_body_is_rejected() {
        let router = create_router(test_app_state());
        let req = Request::builder()
            .method("POST")
            .uri(transfer_uri("SOL", "1"))
            .body(Body::empty())
            .unwrap();
        let (status, headers, body) = send(&router, req).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(headers["x-action-version"], "2.1.3");
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "Invalid account");
    }

    // -- 11b. Body is JSON regardless of content type --------------------------

    #[tokio::test]
    async fn post_accepts_json_sent_as_plain_text() {
        let router = create_router(test_app_state());
        let req = Request::builder()
            .method("POST")
            .uri(transfer_uri("SOL", "1"))
            .header("content-type", "text/plain;charset=UTF-8")
            .body(Body::from(format!(r#"{{"account":"{SENDER}"}}"#)))
            .unwrap();
        let (status, _, body) = send(&router, req).await;

        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["type"], "transaction");
    }

    #[tokio::test]
    async fn post_with_non_json_body_is_invalid_account() {
        let router = create_router(test_app_state());
        let req = Request::builder()
            .method("POST")
            .uri(transfer_uri("SOL", "1"))
            .header("content-type", "application/json")
            .body(Body::from("account=abc"))
            .unwrap();
        let (status, _, body) = send(&router, req).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "Invalid account");
    }

    // -- 12. Unknown token and bad amounts are 400s -----------------------------

    #[tokio::test]
    async fn post_rejects_unknown_token_and_bad_amounts() {
        let router = create_router(test_app_state());
        for uri in [
            transfer_uri("DOGE", "1"),
            transfer_uri("SOL", "0"),
            transfer_uri("SOL", "-5"),
            transfer_uri("USDC", "abc"),
        ] {
            let (status, _) =
                post_json(&router, &uri, serde_json::json!({ "account": SENDER })).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        }
    }

    // -- 13. Ledger failure is a generic 500 ------------------------------------

    #[tokio::test]
    async fn ledger_failure_is_internal_error() {
        let state = test_app_state_with(Arc::new(DownLedger));
        let metrics = state.metrics.clone();
        let router = create_router(state);

        let (status, body) = post_json(
            &router,
            &transfer_uri("USDC", "5"),
            serde_json::json!({ "account": SENDER }),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], GENERIC_FAILURE);
        assert_eq!(metrics.ledger_failures_total.get(), 1);
        assert_eq!(metrics.build_rejections_total.get(), 0);
    }

    // -- 14. Unknown routes still carry action headers --------------------------

    #[tokio::test]
    async fn not_found_carries_action_headers() {
        let router = create_router(test_app_state());
        let req = Request::builder()
            .uri("/nope")
            .body(Body::empty())
            .unwrap();
        let (status, headers, _) = send(&router, req).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(headers["access-control-allow-origin"], "*");
    }

    // -- 15. Icon resolution edge cases ------------------------------------------

    #[test]
    fn icon_resolution_without_host_falls_back_to_localhost() {
        let url = resolve_icon_url(None, &HeaderMap::new()).unwrap();
        assert_eq!(url.as_str(), "http://localhost/logo.png");
    }

    #[test]
    fn icon_resolution_ignores_unknown_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("a.test:8080"));
        headers.insert("x-forwarded-proto", HeaderValue::from_static("gopher"));
        let url = resolve_icon_url(None, &headers).unwrap();
        assert_eq!(url.as_str(), "http://a.test:8080/logo.png");
    }

    #[test]
    fn icon_resolution_uses_first_forwarded_proto() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("a.test"));
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https, http"));
        let url = resolve_icon_url(None, &headers).unwrap();
        assert_eq!(url.as_str(), "https://a.test/logo.png");
    }
}
