use api_state::ApiState;
use axum::{
    extract::{DefaultBodyLimit, FromRef},
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use middleware_client_identity::require_client_identity;
use routes::{ask::ask_question, content::ingest_content, liveness::live, readiness::ready};

pub mod api_state;
pub mod error;
pub mod middleware_client_identity;
mod routes;

/// Router for API functionality, version 1
pub fn api_routes_v1<S>(app_state: &ApiState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    ApiState: FromRef<S>,
{
    // Public, unauthenticated endpoints (for k8s/systemd probes)
    let public = Router::new()
        .route("/ready", get(ready))
        .route("/live", get(live));

    // Endpoints that require a client identity
    let identified = Router::new()
        .route(
            "/content",
            post(ingest_content).layer(DefaultBodyLimit::max(
                app_state.config.ingest_max_body_bytes,
            )),
        )
        .route("/ask", post(ask_question))
        .route_layer(from_fn(require_client_identity));

    public.merge(identified)
}
