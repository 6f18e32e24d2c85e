use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderValue, Method, Request, Response, StatusCode, header},
    middleware::Next,
    response::IntoResponse,
};

/// Origins allowed to call the endpoint from a browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsPolicy {
    Any,
    List(Vec<String>),
}

impl CorsPolicy {
    /// Parses `*` or a semicolon-delimited list of exact origins.
    pub fn parse(allow_origin: &str) -> Self {
        if allow_origin.trim() == "*" {
            return Self::Any;
        }

        Self::List(
            allow_origin
                .split(';')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_owned)
                .collect(),
        )
    }

    /// Value to send back in `Access-Control-Allow-Origin`, if any.
    pub fn allowed_origin<'a>(&self, origin: &'a str) -> Option<&'a str> {
        match self {
            Self::Any => Some("*"),
            Self::List(origins) => origins
                .iter()
                .any(|allowed| allowed == origin)
                .then_some(origin),
        }
    }

    fn apply(&self, origin: &HeaderValue, headers: &mut HeaderMap) {
        if let Some(allowed) = origin.to_str().ok().and_then(|o| self.allowed_origin(o)) {
            if let Ok(value) = HeaderValue::from_str(allowed) {
                headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
            }

            if matches!(self, Self::List(_)) {
                headers.append(header::VARY, HeaderValue::from_static("Origin"));
            }
        }

        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("POST"),
        );
    }
}

/// Middleware answering cross-origin requests
/// - Requests without `Origin` pass through untouched
/// - `OPTIONS` with `Origin` is a preflight and ends here with 204
/// - Everything else gets the CORS headers added to the handler's response
pub async fn cors_middleware(
    State(policy): State<CorsPolicy>,
    req: Request<Body>,
    next: Next,
) -> Response<Body> {
    let Some(origin) = req.headers().get(header::ORIGIN).cloned() else {
        return next.run(req).await;
    };

    let mut response = if req.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(req).await
    };

    policy.apply(&origin, response.headers_mut());

    response
}
