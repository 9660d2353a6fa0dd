use std::convert::Infallible;

use axum::{
    body::Body,
    extract::Request,
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use axum_extra::extract::cookie::Cookie;
use http::{
    header::{COOKIE, LOCATION, SET_COOKIE},
    HeaderValue, StatusCode,
};
use tower::{service_fn, Layer, ServiceBuilder, ServiceExt};
use tracing_test::traced_test;

use super::DevLoggerLayer;
use crate::{
    config::DevLoggerConfig,
    response::{outgoing_cookie, PlainResponse},
};

const COOKIE_NAME: &str = "_mdl-requests";

fn enabled() -> DevLoggerConfig {
    DevLoggerConfig::from_env().with_enabled(true)
}

fn request(url: &str, chain_cookie: Option<&str>) -> Request {
    let mut request = http::Request::get(url);
    if let Some(value) = chain_cookie {
        let cookie = Cookie::new(COOKIE_NAME, value.to_string());
        request = request.header(COOKIE, cookie.encoded().to_string());
    }

    request.body(Body::empty()).unwrap()
}

fn redirect_to(location: &'static str) -> Response {
    http::Response::builder()
        .status(StatusCode::TEMPORARY_REDIRECT)
        .header(LOCATION, location)
        .body(Body::empty())
        .unwrap()
}

async fn run<F>(config: DevLoggerConfig, request: Request, respond: F) -> Response
where
    F: Fn() -> Response,
{
    DevLoggerLayer::new(config)
        .layer(service_fn(|_: Request| {
            let response = respond();
            async move { Ok::<_, Infallible>(response) }
        }))
        .oneshot(request)
        .await
        .unwrap()
}

fn chain_value(response: &Response) -> Option<String> {
    outgoing_cookie(response.headers(), COOKIE_NAME).map(|cookie| cookie.value().to_string())
}

#[tokio::test]
#[traced_test]
async fn logs_pass_through_response_and_clears_chain() {
    let response = run(enabled(), request("http://x/", None), || {
        Response::new(Body::empty())
    })
    .await;

    assert!(logs_contain("[MDL] Response http://x/"));
    assert_eq!(chain_value(&response), Some(String::new()));
}

#[tokio::test]
#[traced_test]
async fn logs_changed_headers() {
    run(enabled(), request("http://localhost:3000", None), || {
        let mut response = Response::new(Body::empty());
        response
            .headers_mut()
            .insert("x-custom-header", HeaderValue::from_static("test"));
        response
    })
    .await;

    assert!(logs_contain("[MDL] Response http://localhost:3000/"));
    assert!(logs_contain("[MDL] Headers changed:"));
    assert!(logs_contain("[MDL]   x-custom-header: \"test\""));
}

#[tokio::test]
#[traced_test]
async fn unchanged_headers_are_not_logged() {
    run(enabled(), request("http://x/", None), || {
        Response::new(Body::empty())
    })
    .await;

    assert!(!logs_contain("Headers changed:"));
}

#[tokio::test]
#[traced_test]
async fn logs_rewrite() {
    run(enabled(), request("http://localhost:3000", None), || {
        let mut response = Response::new(Body::empty());
        response.headers_mut().insert(
            "x-middleware-rewrite",
            HeaderValue::from_static("http://localhost:3000/bla"),
        );
        response
    })
    .await;

    assert!(logs_contain(
        "[MDL] Rewrite: http://localhost:3000/ -> http://localhost:3000/bla"
    ));
}

#[tokio::test]
#[traced_test]
async fn logs_redirect_and_starts_chain() {
    let response = run(enabled(), request("http://x/", None), || {
        redirect_to("http://x/bla")
    })
    .await;

    assert!(logs_contain("[MDL] Redirect: http://x/ -> http://x/bla"));
    assert_eq!(
        chain_value(&response).as_deref(),
        Some(r#"["http://x/","http://x/bla"]"#)
    );
    assert!(!logs_contain("Warning excessive request sequence detected:"));
}

#[tokio::test]
#[traced_test]
async fn warns_when_continuing_chain_grows_past_threshold() {
    let prior = r#"["http://x/bla","http://x/"]"#;

    let response = run(enabled(), request("http://x/", Some(prior)), || {
        redirect_to("http://x/bla")
    })
    .await;

    assert_eq!(
        chain_value(&response).as_deref(),
        Some(r#"["http://x/bla","http://x/","http://x/bla"]"#)
    );
    assert!(logs_contain("[MDL] Warning excessive request sequence detected:"));
    assert!(logs_contain("[MDL]   http://x/bla"));
    assert!(logs_contain("[MDL]   -> http://x/"));
    logs_assert(|lines: &[&str]| {
        let warnings = lines
            .iter()
            .filter(|line| line.contains("WARN") && line.contains("[MDL]"))
            .count();

        match warnings {
            4 => Ok(()),
            n => Err(format!("Expected 4 warning lines, got {n}")),
        }
    });
}

#[tokio::test]
#[traced_test]
async fn lower_threshold_warns_on_first_redirect() {
    let config = enabled().with_warn_threshold(1);

    run(config, request("http://x/", None), || {
        redirect_to("http://x/bla")
    })
    .await;

    assert!(logs_contain("[MDL] Warning excessive request sequence detected:"));
    assert!(logs_contain("[MDL]   http://x/"));
    assert!(logs_contain("[MDL]   -> http://x/bla"));
}

#[tokio::test]
#[traced_test]
async fn malformed_chain_cookie_is_ignored() {
    let response = run(
        enabled(),
        request("http://x/", Some("{not valid json")),
        || Response::new(Body::empty()),
    )
    .await;

    assert_eq!(chain_value(&response), Some(String::new()));
    assert!(!logs_contain("WARN"));
}

#[tokio::test]
#[traced_test]
async fn plain_response_skips_chain_tracking() {
    let response = run(enabled(), request("http://x/", None), || {
        let mut response = redirect_to("http://x/bla");
        response.extensions_mut().insert(PlainResponse);
        response
    })
    .await;

    assert!(response.headers().get(SET_COOKIE).is_none());
    assert!(logs_contain("[MDL] Redirect: http://x/ -> http://x/bla"));
    assert!(logs_contain(
        "[MDL] Unable to check redirect chain, response does not support cookies"
    ));
}

#[tokio::test]
#[traced_test]
async fn disabled_logger_returns_response_untouched() {
    let config = DevLoggerConfig::from_env().with_enabled(false);

    let response = run(config, request("http://x/", None), || {
        redirect_to("http://x/bla")
    })
    .await;

    assert!(response.headers().get(SET_COOKIE).is_none());
    assert_eq!(response.headers().get(LOCATION).unwrap(), "http://x/bla");
    assert!(!logs_contain("[MDL]"));
}

#[tokio::test]
async fn middleware_errors_propagate() {
    let result = DevLoggerLayer::new(enabled())
        .layer(service_fn(|_: Request| async {
            Err::<Response, _>("middleware failed")
        }))
        .oneshot(request("http://x/", None))
        .await;

    assert!(matches!(result, Err("middleware failed")));
}

async fn ping_pong(request: Request, next: Next) -> Response {
    match request.uri().path() {
        "/ping" => Redirect::temporary("/pong").into_response(),
        "/pong" => Redirect::temporary("/ping").into_response(),
        _ => next.run(request).await,
    }
}

/// Sends the chain cookie of `response` back, the way a browser would.
fn cookie_header(response: &Response) -> Option<String> {
    let cookie = outgoing_cookie(response.headers(), COOKIE_NAME)?;
    if cookie.value().is_empty() {
        return None;
    }

    Some(
        Cookie::new(COOKIE_NAME, cookie.value().to_string())
            .encoded()
            .to_string(),
    )
}

#[tokio::test]
#[traced_test]
async fn detects_redirect_loop_across_requests() {
    let router = Router::new().route("/", get(|| async { "Index" }));
    let app = ServiceBuilder::new()
        .layer(DevLoggerLayer::new(enabled()))
        .layer(middleware::from_fn(ping_pong))
        .service(router);

    let mut path = "/ping".to_string();
    let mut cookie = None;
    let mut chain = None;

    for _ in 0..3 {
        let mut builder = http::Request::get(path.as_str()).header("host", "x");
        if let Some(cookie) = &cookie {
            builder = builder.header(COOKIE, cookie);
        }

        let response = app
            .clone()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();

        chain = chain_value(&response);
        cookie = cookie_header(&response);
        path = response
            .headers()
            .get(LOCATION)
            .and_then(|location| location.to_str().ok())
            .unwrap()
            .to_string();
    }

    assert_eq!(
        chain.as_deref(),
        Some(r#"["http://x/ping","http://x/pong","http://x/ping","http://x/pong"]"#)
    );
    assert!(logs_contain("[MDL] Warning excessive request sequence detected:"));
    assert!(logs_contain("[MDL]   -> http://x/pong"));
}

#[tokio::test]
#[traced_test]
async fn reaching_a_page_ends_the_chain() {
    let router = Router::new().route("/", get(|| async { "Index" }));
    let app = ServiceBuilder::new()
        .layer(DevLoggerLayer::new(enabled()))
        .layer(middleware::from_fn(ping_pong))
        .service(router);

    let prior = r#"["http://x/ping","http://x/"]"#;
    let response = app
        .oneshot(
            http::Request::get("/")
                .header("host", "x")
                .header(
                    COOKIE,
                    Cookie::new(COOKIE_NAME, prior).encoded().to_string(),
                )
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(chain_value(&response), Some(String::new()));
    assert!(logs_contain("[MDL] Response http://x/"));
}
