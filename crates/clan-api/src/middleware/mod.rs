//! Middleware stack for the API server
//!
//! Request ids, tracing, timeouts, CORS and the global rate limiter.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, HeaderValue, Method, Request, StatusCode},
    Router,
};
use clan_common::{CorsConfig, RateLimitConfig};
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::GlobalKeyExtractor, GovernorLayer,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

/// Header name for request ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Middleware settings taken from the app config
#[derive(Debug, Clone)]
pub struct MiddlewareConfig {
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
    pub request_timeout: Duration,
    pub is_production: bool,
}

/// Apply the full middleware stack.
///
/// Order, outermost first: rate limit, request id, trace, timeout, CORS.
pub fn apply_middleware(router: Router<AppState>, config: &MiddlewareConfig) -> Router<AppState> {
    let router = router
        .layer(create_cors_layer(&config.cors, config.is_production))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::SERVICE_UNAVAILABLE,
            config.request_timeout,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .headers()
                        .get(REQUEST_ID_HEADER)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("unknown");

                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id,
                    )
                })
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(PropagateRequestIdLayer::new(header::HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        .layer(SetRequestIdLayer::new(
            header::HeaderName::from_static(REQUEST_ID_HEADER),
            MakeRequestUuid,
        ));

    // Applied globally, not per peer address
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(config.rate_limit.requests_per_second.into())
        .burst_size(config.rate_limit.burst)
        .key_extractor(GlobalKeyExtractor)
        .finish();

    match governor_conf {
        Some(conf) => router.layer(GovernorLayer {
            config: Arc::new(conf),
        }),
        None => {
            tracing::warn!(
                per_second = config.rate_limit.requests_per_second,
                burst = config.rate_limit.burst,
                "Rate limiter disabled: invalid configuration"
            );
            router
        }
    }
}

/// Which origins the CORS layer admits
#[derive(Debug, PartialEq, Eq)]
enum CorsPolicy {
    /// Development default with nothing configured
    AnyOrigin,
    /// Configured origins, credentials allowed. Empty blocks browsers.
    Listed(Vec<HeaderValue>),
}

fn cors_policy(config: &CorsConfig, is_production: bool) -> CorsPolicy {
    if config.allowed_origins.is_empty() && !is_production {
        return CorsPolicy::AnyOrigin;
    }
    CorsPolicy::Listed(
        config
            .allowed_origins
            .iter()
            .filter_map(|origin| match origin.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(%origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect(),
    )
}

fn create_cors_layer(config: &CorsConfig, is_production: bool) -> CorsLayer {
    let request_id = header::HeaderName::from_static(REQUEST_ID_HEADER);
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            request_id.clone(),
        ])
        .expose_headers([request_id, header::RETRY_AFTER]);

    match cors_policy(config, is_production) {
        CorsPolicy::AnyOrigin => {
            tracing::warn!("CORS allows any origin; set CORS_ALLOWED_ORIGINS before deploying");
            layer.allow_origin(Any)
        }
        CorsPolicy::Listed(origins) if origins.is_empty() => {
            tracing::warn!("CORS has no allowed origins; browser requests will be blocked");
            layer.allow_origin(AllowOrigin::list(origins))
        }
        CorsPolicy::Listed(origins) => {
            tracing::info!(count = origins.len(), "CORS origins configured");
            // The session cookie only travels with credentialed requests
            layer
                .allow_origin(AllowOrigin::list(origins))
                .allow_credentials(true)
        }
    }
}
