//! HTTP boundary for broker push delivery
//!
//! One POST endpoint receives pushed batches: authenticate, decode, route,
//! respond. Rejected requests get a fixed 403 body; malformed batches get a
//! 400 instead of a fault. A GET /health endpoint reports liveness and the
//! metrics snapshot for operators.
//!
//! All request-scoped state lives in [`RelayState`], built once at startup
//! and shared by reference into the handlers.

use crate::archive::HttpObjectStore;
use crate::auth::{BrokerAuth, KEY_ID_HEADER, SIGNATURE_HEADER};
use crate::config::RelayConfig;
use crate::error::{RelayError, RelayResult};
use crate::observability::metrics::{metrics, MetricsSnapshot};
use crate::protocol::{MessageBatch, TopicFilter};
use crate::request_span;
use crate::router::MessageRouter;
use bytes::Bytes;
use serde::Serialize;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, info, warn};
use warp::http::{header::CONTENT_TYPE, Response, StatusCode};
use warp::Filter;

/// Fixed body returned with every 403
pub use crate::error::REJECTION_BODY;

/// Read-only per-process state shared across requests
pub struct RelayState {
    pub auth: BrokerAuth,
    pub router: MessageRouter,
}

impl RelayState {
    pub fn new(auth: BrokerAuth, router: MessageRouter) -> Self {
        Self { auth, router }
    }

    /// Build the full state from validated configuration: resolve the key
    /// set, construct the store client, and wire up the router.
    pub fn from_config(config: &RelayConfig) -> RelayResult<Self> {
        let key_set = config.broker.resolve_key_set()?;
        if key_set.is_empty() {
            warn!("broker key set is empty; every push request will be rejected");
        }
        let auth = BrokerAuth::new(&key_set)?;

        let store = Arc::new(HttpObjectStore::new(
            &config.archive.endpoint,
            &config.archive.bucket,
            config.archive.resolve_auth_token(),
        ));
        let router = MessageRouter::new(TopicFilter::new(config.archive.topic_prefix.clone()), store);

        Ok(Self::new(auth, router))
    }
}

#[derive(Serialize)]
struct HealthStatus {
    status: &'static str,
    broker_keys: usize,
    metrics: MetricsSnapshot,
}

/// Build the warp filter tree for the relay
pub fn routes(
    state: Arc<RelayState>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let publish_state = state.clone();

    // POST / - broker push delivery
    let publish = warp::path::end()
        .and(warp::post())
        .and(warp::header::optional::<String>(KEY_ID_HEADER))
        .and(warp::header::optional::<String>(SIGNATURE_HEADER))
        .and(warp::body::bytes())
        .and_then(
            move |key_id: Option<String>, signature: Option<String>, body: Bytes| {
                let state = publish_state.clone();
                async move { Ok::<_, Infallible>(handle_publish(&state, key_id, signature, body)) }
            },
        );

    // GET /health - liveness and metrics snapshot
    let health_state = state.clone();
    let health = warp::path("health").and(warp::get()).and_then(move || {
        let state = health_state.clone();
        async move {
            let status = HealthStatus {
                status: "ok",
                broker_keys: state.auth.key_count(),
                metrics: metrics().get_metrics(),
            };
            Ok::<_, Infallible>(warp::reply::json(&status))
        }
    });

    publish.or(health)
}

fn handle_publish(
    state: &RelayState,
    key_id: Option<String>,
    signature: Option<String>,
    body: Bytes,
) -> Response<String> {
    match process_publish(state, key_id.as_deref(), signature.as_deref(), &body) {
        Ok(payload) => Response::builder()
            .status(StatusCode::OK)
            // The broker accepts an empty Content-Type or octet-stream.
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(payload)
            .unwrap(),
        Err(error) => {
            let status = status_for(&error);
            if status == StatusCode::INTERNAL_SERVER_ERROR {
                warn!("request failed: {error}");
            }
            plain_response(status, error.to_string())
        }
    }
}

/// Authenticate, decode, and route one push request, producing the response
/// payload or the error that becomes the HTTP failure.
fn process_publish(
    state: &RelayState,
    key_id: Option<&str>,
    signature: Option<&str>,
    body: &[u8],
) -> RelayResult<String> {
    // Authentication comes first: unsigned requests never reach decoding,
    // let alone the router.
    if !state.auth.verify(key_id, signature, body) {
        metrics().request_rejected();
        return Err(RelayError::AuthenticationFailed);
    }

    let incoming: MessageBatch = serde_json::from_slice(body).map_err(|e| {
        metrics().decode_failed();
        debug!("failed to decode message batch: {e}");
        RelayError::decode_error(e.to_string())
    })?;

    let span = request_span!(batch_size = incoming.len());
    let _guard = span.enter();
    metrics().batch_received(incoming.len() as u64);

    let outgoing = state.router.route(incoming);
    serde_json::to_string(&outgoing)
        .map_err(|e| RelayError::internal(format!("failed to serialize outgoing batch: {e}")))
}

fn status_for(error: &RelayError) -> StatusCode {
    match error {
        RelayError::AuthenticationFailed => StatusCode::FORBIDDEN,
        RelayError::DecodeError { .. } => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn plain_response(status: StatusCode, body: String) -> Response<String> {
    Response::builder().status(status).body(body).unwrap()
}

/// Serve the relay until ctrl-c. Detached archive tasks still in flight at
/// shutdown are abandoned; archival is best-effort by contract.
pub async fn run(state: Arc<RelayState>, addr: SocketAddr) -> RelayResult<()> {
    let (bound, server) = warp::serve(routes(state))
        .try_bind_with_graceful_shutdown(addr, async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received, draining connections");
        })
        .map_err(|e| RelayError::internal(format!("failed to bind {addr}: {e}")))?;

    info!("listening on {bound}");
    server.await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::BrokerKeySet;
    use crate::testing::mocks::MockObjectStore;

    fn empty_key_state() -> Arc<RelayState> {
        let auth = BrokerAuth::new(&BrokerKeySet::default()).unwrap();
        let router = MessageRouter::new(
            TopicFilter::new("devices/metadata/"),
            Arc::new(MockObjectStore::new()),
        );
        Arc::new(RelayState::new(auth, router))
    }

    #[tokio::test]
    async fn test_unsigned_request_is_rejected_with_fixed_body() {
        let filter = routes(empty_key_state());

        let response = warp::test::request()
            .method("POST")
            .path("/")
            .body(r#"[{"topic":"devices/metadata/1","payload":"a"}]"#)
            .reply(&filter)
            .await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(response.body(), REJECTION_BODY.as_bytes());
    }

    #[tokio::test]
    async fn test_health_endpoint_reports_ok() {
        let filter = routes(empty_key_state());

        let response = warp::test::request()
            .method("GET")
            .path("/health")
            .reply(&filter)
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let health: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(health["status"], "ok");
        assert_eq!(health["broker_keys"], 0);
        assert!(health["metrics"]["batches_received"].is_u64());
    }

    #[tokio::test]
    async fn test_state_from_config_with_empty_keys() {
        let config = RelayConfig::test_config();
        let state = RelayState::from_config(&config).unwrap();
        assert_eq!(state.auth.key_count(), 0);
    }
}
