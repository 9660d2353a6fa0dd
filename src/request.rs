use axum_extra::extract::cookie::CookieJar;
use http::{header, HeaderMap, Request};
use url::Url;

const FORWARDED_PROTO: &str = "x-forwarded-proto";
const FORWARDED_HOST: &str = "x-forwarded-host";

/// What the dev logger needs to remember about a request once it has been handed to the
/// wrapped middleware.
#[derive(Debug, Clone)]
pub struct RequestSnapshot {
    pub url: String,
    pub headers: HeaderMap,
    pub cookies: CookieJar,
}

impl RequestSnapshot {
    pub fn capture<B>(request: &Request<B>) -> Self {
        let headers = request.headers().clone();
        let cookies = CookieJar::from_headers(&headers);

        RequestSnapshot {
            url: request_url(request),
            headers,
            cookies,
        }
    }

    /// Value of the inbound cookie `name`, if sent.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(|cookie| cookie.value())
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: impl header::AsHeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Absolute URL of the request.
///
/// Servers usually only see the origin-form (`/path?query`), so scheme and host are taken from
/// the forwarding headers or `Host` when the URI is not absolute.
pub fn request_url<B>(request: &Request<B>) -> String {
    let uri = request.uri();

    let raw = if uri.scheme().is_some() && uri.authority().is_some() {
        uri.to_string()
    } else {
        let headers = request.headers();

        let scheme = header_str(headers, FORWARDED_PROTO).unwrap_or("http");
        let host = header_str(headers, FORWARDED_HOST)
            .or_else(|| header_str(headers, header::HOST))
            .or_else(|| uri.authority().map(|authority| authority.as_str()))
            .unwrap_or("localhost");
        let path = uri
            .path_and_query()
            .map(|path_and_query| path_and_query.as_str())
            .unwrap_or("/");

        format!("{scheme}://{host}{path}")
    };

    match Url::parse(&raw) {
        Ok(url) => url.to_string(),
        Err(err) => {
            tracing::trace!(%err, url = %raw, "Request URL could not be normalized");

            raw
        }
    }
}
