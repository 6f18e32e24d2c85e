use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::Request,
    middleware,
    routing::{any, get},
};
use tower_http::{services::ServeDir, trace::TraceLayer};
use ulid::Ulid;

use crate::{
    config::Config,
    mailer::Mailer,
    middleware::{CorsPolicy, catch_fault_layer, cors_middleware},
    recaptcha::TokenVerifier,
};

pub mod contact;
pub mod health;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub verifier: Arc<dyn TokenVerifier>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub fn new(
        config: Config,
        verifier: impl TokenVerifier + 'static,
        mailer: impl Mailer + 'static,
    ) -> Self {
        Self {
            config: Arc::new(config),
            verifier: Arc::new(verifier),
            mailer: Arc::new(mailer),
        }
    }
}

pub fn router(app_state: AppState) -> Router {
    let cors_policy = CorsPolicy::parse(&app_state.config.cors.allow_origin);
    let endpoint = app_state.config.server.endpoint.clone();
    let static_dir = app_state.config.server.static_dir.clone();

    let mut router = Router::new()
        .route("/health", get(health::health))
        // Every method reaches the handler so the gate can answer invalid_request
        .route(&endpoint, any(contact::send));

    if let Some(dir) = static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        .with_state(app_state)
        .layer(catch_fault_layer())
        .layer(middleware::from_fn_with_state(cors_policy, cors_middleware))
        // One span per request, tagged with a unique id for log correlation.
        // Failed requests are already logged once where they fail.
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &Request<Body>| {
                    tracing::info_span!(
                        "request",
                        request_id = %Ulid::new(),
                        method = %req.method(),
                        uri = %req.uri(),
                    )
                })
                .on_failure(()),
        )
}
