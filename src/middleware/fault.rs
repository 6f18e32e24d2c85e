use std::any::Any;

use axum::{
    body::Body,
    http::Response,
    response::IntoResponse,
};
use formrelay_contact::Outcome;
use tower_http::catch_panic::CatchPanicLayer;

type PanicHandler = fn(Box<dyn Any + Send + 'static>) -> Response<Body>;

/// Layer turning a panic anywhere below it into the generic error outcome.
pub fn catch_fault_layer() -> CatchPanicLayer<PanicHandler> {
    CatchPanicLayer::custom(handle_fault as PanicHandler)
}

fn handle_fault(payload: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let detail = if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_owned()
    };

    tracing::error!(panic = %detail, "Unhandled fault while handling request");

    Outcome::Error.into_response()
}
