use http::{header::LOCATION, HeaderMap, Response};

use crate::{
    action::{MiddlewareAction, REWRITE_HEADER},
    headers::headers_diff,
    log::format_log,
    redirect_chain::RedirectChainTracker,
    request::RequestSnapshot,
    response::ResponseKind,
};

fn header_lossy(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
        .unwrap_or_default()
}

/// Logs what the wrapped middleware did with `request` and updates the redirect chain cookie on
/// `response`.
pub fn inspect_response<B>(
    tracker: &RedirectChainTracker,
    request: &RequestSnapshot,
    response: &mut Response<B>,
) {
    let headers = response.headers();

    match MiddlewareAction::classify(headers) {
        MiddlewareAction::Rewrite => {
            let target = header_lossy(headers, REWRITE_HEADER);
            tracing::info!("{}", format_log(format!("Rewrite: {} -> {target}", request.url)));
        }
        MiddlewareAction::Redirect => {
            let target = header_lossy(headers, LOCATION.as_str());
            tracing::info!("{}", format_log(format!("Redirect: {} -> {target}", request.url)));
        }
        MiddlewareAction::Next => {
            tracing::info!("{}", format_log(format!("Response {}", request.url)));
        }
    }

    let changes = headers_diff(&request.headers, headers);
    if !changes.is_empty() {
        tracing::info!("{}", format_log("Headers changed:"));

        for change in &changes {
            tracing::info!("{}", format_log(change));
        }
    }

    match ResponseKind::of(response) {
        ResponseKind::WithCookies(mut cookies) => {
            let update = tracker.track(request, &mut cookies);
            tracing::trace!(?update, "Redirect chain tracked");
        }
        ResponseKind::Plain(_) => {
            tracing::debug!(
                "{}",
                format_log("Unable to check redirect chain, response does not support cookies")
            );
        }
    }
}
