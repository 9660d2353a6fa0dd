use axum_extra::extract::cookie::Cookie;
use http::{header::SET_COOKIE, HeaderMap, HeaderValue, Response};

/// Marks a response that must not gain cookies.
///
/// A wrapped middleware inserts this into the response extensions, e.g. for responses that are
/// forwarded verbatim from an upstream. The dev logger then skips the redirect chain check.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainResponse;

/// Cookie mutation capability of an outgoing response.
pub trait ChainCookies {
    /// Headers of the outgoing response.
    fn headers(&self) -> &HeaderMap;

    /// Sets `cookie`, replacing any cookie of the same name set earlier on this response.
    fn set_cookie(&mut self, cookie: Cookie<'static>);

    /// Tells the client to drop the cookie `name` at path `/`.
    fn remove_cookie(&mut self, name: &str);
}

/// Outgoing response, tagged by whether cookies may be written to it.
pub enum ResponseKind<'a, B> {
    WithCookies(CookieResponse<'a, B>),
    Plain(&'a Response<B>),
}

impl<'a, B> ResponseKind<'a, B> {
    pub fn of(response: &'a mut Response<B>) -> Self {
        if response.extensions().get::<PlainResponse>().is_some() {
            ResponseKind::Plain(response)
        } else {
            ResponseKind::WithCookies(CookieResponse { response })
        }
    }
}

/// A response that accepts cookies through its `Set-Cookie` headers.
pub struct CookieResponse<'a, B> {
    response: &'a mut Response<B>,
}

impl<B> CookieResponse<'_, B> {
    fn retain_other_cookies(&mut self, name: &str) {
        let headers = self.response.headers_mut();

        let kept: Vec<HeaderValue> = headers
            .get_all(SET_COOKIE)
            .iter()
            .filter(|value| {
                value
                    .to_str()
                    .ok()
                    .and_then(|value| Cookie::parse_encoded(value).ok())
                    .map_or(true, |cookie| cookie.name() != name)
            })
            .cloned()
            .collect();

        headers.remove(SET_COOKIE);
        for value in kept {
            headers.append(SET_COOKIE, value);
        }
    }

    fn append_cookie(&mut self, cookie: &Cookie<'static>) {
        match HeaderValue::from_str(&cookie.encoded().to_string()) {
            Ok(value) => {
                self.response.headers_mut().append(SET_COOKIE, value);
            }
            Err(err) => {
                tracing::trace!(%err, name = cookie.name(), "Cookie is not a valid header value");
            }
        }
    }
}

impl<B> ChainCookies for CookieResponse<'_, B> {
    fn headers(&self) -> &HeaderMap {
        self.response.headers()
    }

    fn set_cookie(&mut self, cookie: Cookie<'static>) {
        self.retain_other_cookies(cookie.name());
        self.append_cookie(&cookie);
    }

    fn remove_cookie(&mut self, name: &str) {
        self.retain_other_cookies(name);

        let mut cookie = Cookie::new(name.to_string(), "");
        cookie.set_path("/");
        cookie.make_removal();

        self.append_cookie(&cookie);
    }
}

/// Reads back the cookie `name` from the `Set-Cookie` headers of `headers`.
pub fn outgoing_cookie(headers: &HeaderMap, name: &str) -> Option<Cookie<'static>> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| Cookie::parse_encoded(value.to_string()).ok())
        .filter(|cookie| cookie.name() == name)
        .last()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response() -> Response<()> {
        Response::builder()
            .header(SET_COOKIE, "session=abc; Path=/")
            .body(())
            .unwrap()
    }

    #[test]
    fn plain_marker_removes_cookie_capability() {
        let mut response = response();
        response.extensions_mut().insert(PlainResponse);

        assert!(matches!(
            ResponseKind::of(&mut response),
            ResponseKind::Plain(_)
        ));
    }

    #[test]
    fn set_cookie_replaces_same_name_only() {
        let mut response = response();

        if let ResponseKind::WithCookies(mut cookies) = ResponseKind::of(&mut response) {
            cookies.set_cookie(Cookie::new("chain", "1"));
            cookies.set_cookie(Cookie::new("chain", "2"));
        } else {
            panic!("response should accept cookies");
        }

        assert_eq!(response.headers().get_all(SET_COOKIE).iter().count(), 2);
        assert_eq!(
            outgoing_cookie(response.headers(), "chain").map(|c| c.value().to_string()),
            Some("2".to_string())
        );
        assert!(outgoing_cookie(response.headers(), "session").is_some());
    }

    #[test]
    fn remove_cookie_emits_removal_cookie() {
        let mut response = response();

        if let ResponseKind::WithCookies(mut cookies) = ResponseKind::of(&mut response) {
            cookies.set_cookie(Cookie::new("chain", "1"));
            cookies.remove_cookie("chain");
        }

        let cookie = outgoing_cookie(response.headers(), "chain").unwrap();

        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.path(), Some("/"));
        assert!(cookie.max_age().is_some_and(|age| age.is_zero()));
    }
}
