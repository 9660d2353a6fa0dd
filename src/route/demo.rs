use axum::{
    extract::Request,
    http::{HeaderValue, Uri},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use url::Url;

use crate::{action::REWRITE_HEADER, request::request_url, response::PlainResponse};

pub fn app() -> Router {
    Router::new()
        .route("/", get(|| async { "Index" }))
        .route("/new", get(|| async { "New" }))
        .route("/rewritten", get(|| async { "Rewritten" }))
        .route("/plain", get(|| async { "Plain" }))
}

/// The middleware the dev logger wraps in the demo server.
///
/// - `/old` redirects to `/new`
/// - `/loop-a` and `/loop-b` redirect to each other
/// - `/internal` is served by `/rewritten`
/// - `/plain` is forwarded without cookie support
/// - everything else passes through with an extra header
pub async fn demo_middleware(mut req: Request, next: Next) -> Response {
    let path = req.uri().path().to_owned();

    match path.as_str() {
        "/old" => Redirect::temporary("/new").into_response(),
        "/loop-a" => Redirect::temporary("/loop-b").into_response(),
        "/loop-b" => Redirect::temporary("/loop-a").into_response(),
        "/internal" => {
            let target = Url::parse(&request_url(&req))
                .and_then(|url| url.join("/rewritten"))
                .map(String::from)
                .unwrap_or_else(|_| "/rewritten".to_string());

            *req.uri_mut() = Uri::from_static("/rewritten");

            let mut res = next.run(req).await;
            if let Ok(value) = HeaderValue::from_str(&target) {
                res.headers_mut().insert(REWRITE_HEADER, value);
            }

            res
        }
        "/plain" => {
            let mut res = next.run(req).await;
            res.extensions_mut().insert(PlainResponse);

            res
        }
        _ => {
            let mut res = next.run(req).await;
            res.headers_mut().insert(
                "x-powered-by",
                HeaderValue::from_static("middleware-dev-logger"),
            );

            res
        }
    }
}
