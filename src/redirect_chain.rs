//! Redirect loop detection across stateless requests.
//!
//! Each invocation only sees one request and one response, so the URLs of a redirect sequence
//! are carried by the client in a cookie. A request continues a chain when its URL equals the
//! last URL recorded in that cookie; a redirect response then appends its target. Any
//! non-redirect response ends the chain and removes the cookie.
//!
//! The chain is not capped. Once the warning fires, every further hop of a loop grows the chain
//! and the cookie with it.

use axum_extra::extract::cookie::Cookie;
use http::{header::LOCATION, HeaderMap};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    config::DevLoggerConfig, log::format_log, request::RequestSnapshot, response::ChainCookies,
};

#[derive(Debug, thiserror::Error)]
enum ChainDecodeError {
    #[error("No chain cookie")]
    Missing,
    #[error("Chain cookie is not a JSON array of strings: {0}")]
    Json(#[from] serde_json::Error),
}

/// URLs of a redirect sequence, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RedirectChain(Vec<String>);

impl RedirectChain {
    /// A fresh chain: the requested URL and where it redirects to.
    pub fn start(request_url: impl Into<String>, target: impl Into<String>) -> Self {
        RedirectChain(vec![request_url.into(), target.into()])
    }

    fn decode(value: Option<&str>) -> Result<Self, ChainDecodeError> {
        let value = value.ok_or(ChainDecodeError::Missing)?;

        Ok(serde_json::from_str(value)?)
    }

    /// Parses a chain cookie value. Anything that is not a JSON array of strings is an empty chain.
    pub fn load(value: Option<&str>) -> Self {
        Self::decode(value).unwrap_or_default()
    }

    /// JSON array representation, as stored in the cookie.
    pub fn encode(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Whether a request to `url` is the next hop of this chain.
    pub fn is_continued_by(&self, url: &str) -> bool {
        self.0.last().is_some_and(|last| last == url)
    }

    pub fn push(&mut self, url: impl Into<String>) {
        self.0.push(url.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn urls(&self) -> &[String] {
        &self.0
    }

    /// The warning for this chain, one entry per line.
    pub fn warning_lines(&self) -> Vec<String> {
        std::iter::once("Warning excessive request sequence detected:".to_string())
            .chain(self.0.iter().enumerate().map(|(index, url)| match index {
                0 => format!("  {url}"),
                _ => format!("  -> {url}"),
            }))
            .collect()
    }
}

impl From<Vec<String>> for RedirectChain {
    fn from(urls: Vec<String>) -> Self {
        RedirectChain(urls)
    }
}

/// What tracking did to the chain cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainUpdate {
    /// The response is not a redirect, the cookie was removed.
    Cleared,
    /// No chain was continued, a new one was stored.
    Started(RedirectChain),
    /// The stored chain was continued by this request and extended.
    Extended(RedirectChain),
}

impl ChainUpdate {
    pub fn chain(&self) -> Option<&RedirectChain> {
        match self {
            ChainUpdate::Cleared => None,
            ChainUpdate::Started(chain) | ChainUpdate::Extended(chain) => Some(chain),
        }
    }
}

/// Reads the redirect target from `location`, resolved against the request URL.
///
/// Presence of `location` alone makes a redirect. A relative target is made absolute so the
/// client's follow-up request can match it; an empty one resolves to the request URL itself.
fn redirect_target(request_url: &str, headers: &HeaderMap) -> Option<String> {
    let location = headers.get(LOCATION)?;
    let location = String::from_utf8_lossy(location.as_bytes());

    let resolved = Url::parse(request_url)
        .and_then(|base| base.join(&location))
        .map(String::from)
        .unwrap_or_else(|_| location.into_owned());

    Some(resolved)
}

#[derive(Debug, Clone)]
pub struct RedirectChainTracker {
    cookie_name: String,
    warn_threshold: usize,
}

impl RedirectChainTracker {
    pub fn new(cookie_name: impl Into<String>, warn_threshold: usize) -> Self {
        RedirectChainTracker {
            cookie_name: cookie_name.into(),
            warn_threshold,
        }
    }

    pub fn from_config(config: &DevLoggerConfig) -> Self {
        Self::new(config.cookie_name.clone(), config.warn_threshold)
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Updates the chain cookie on `response` and warns about excessive chains.
    ///
    /// Never fails: a missing or malformed chain cookie is an empty chain.
    pub fn track<C: ChainCookies>(&self, request: &RequestSnapshot, response: &mut C) -> ChainUpdate {
        let mut chain = RedirectChain::load(request.cookie(&self.cookie_name));

        let Some(target) = redirect_target(&request.url, response.headers()) else {
            response.remove_cookie(&self.cookie_name);

            return ChainUpdate::Cleared;
        };

        let update = if chain.is_continued_by(&request.url) {
            chain.push(target);
            ChainUpdate::Extended(chain)
        } else {
            ChainUpdate::Started(RedirectChain::start(request.url.clone(), target))
        };

        if let Some(chain) = update.chain() {
            let mut cookie = Cookie::new(self.cookie_name.clone(), chain.encode());
            cookie.set_path("/");
            cookie.set_http_only(true);
            response.set_cookie(cookie);

            if chain.len() > self.warn_threshold {
                for line in chain.warning_lines() {
                    tracing::warn!("{}", format_log(line));
                }
            }
        }

        update
    }
}
