use http::HeaderMap;

/// Header set by a middleware that serves the request from another internal target.
pub const REWRITE_HEADER: &str = "x-middleware-rewrite";

/// Net effect a wrapped middleware had on the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MiddlewareAction {
    /// Served from a different target without changing the client-visible URL.
    Rewrite,
    /// The client is told to re-request another URL.
    Redirect,
    /// Neither a rewrite nor a redirect.
    Next,
}

impl MiddlewareAction {
    /// Classifies a response by its headers.
    ///
    /// A rewrite always wins over a redirect when both headers are set.
    pub fn classify(headers: &HeaderMap) -> Self {
        if headers.contains_key(REWRITE_HEADER) {
            MiddlewareAction::Rewrite
        } else if headers.contains_key(http::header::LOCATION) {
            MiddlewareAction::Redirect
        } else {
            MiddlewareAction::Next
        }
    }
}
