use std::fmt;

use http::{HeaderMap, HeaderName};

/// Request-only headers, they always disappear from the response.
const REQUEST_ONLY_HEADERS: &[&str] = &[
    "accept",
    "connection",
    "cookie",
    "dnt",
    "referer",
    "upgrade-insecure-requests",
    "user-agent",
    "content-type",
    "host",
    "x-middleware-next",
];

/// Prefixes of request-only header families (`accept-encoding`, `if-none-match`, `sec-fetch-mode`, ...).
const REQUEST_ONLY_PREFIXES: &[&str] = &["accept-", "if-", "sec-", "x-forwarded-"];

fn is_request_only(name: &HeaderName) -> bool {
    let name = name.as_str();

    REQUEST_ONLY_HEADERS.contains(&name)
        || REQUEST_ONLY_PREFIXES
            .iter()
            .any(|prefix| name.starts_with(prefix))
}

/// All values of `name` joined with `, `, the way a fetch `Headers::get` reads them.
fn joined_value(headers: &HeaderMap, name: &HeaderName) -> Option<String> {
    let mut values = headers.get_all(name).iter().peekable();
    values.peek()?;

    Some(
        values
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
            .collect::<Vec<_>>()
            .join(", "),
    )
}

/// A single header that differs between the request and the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderChange {
    Added {
        name: HeaderName,
        new: String,
    },
    Removed {
        name: HeaderName,
        old: String,
    },
    Changed {
        name: HeaderName,
        old: String,
        new: String,
    },
}

impl HeaderChange {
    pub fn name(&self) -> &HeaderName {
        match self {
            HeaderChange::Added { name, .. }
            | HeaderChange::Removed { name, .. }
            | HeaderChange::Changed { name, .. } => name,
        }
    }
}

impl fmt::Display for HeaderChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderChange::Added { name, new } => write!(f, "  {name}: \"{new}\""),
            HeaderChange::Removed { name, old } => write!(f, "  {name}: \"{old}\" -> (removed)"),
            HeaderChange::Changed { name, old, new } => {
                write!(f, "  {name}: \"{old}\" -> \"{new}\"")
            }
        }
    }
}

/// Computes the headers that were added, removed or changed between `request` and `response`.
///
/// Request-only headers are ignored. Names are compared case-insensitively, which [`HeaderMap`]
/// guarantees by storing them lowercased. Changes are reported in request order first, then the
/// response-only additions in response order.
pub fn headers_diff(request: &HeaderMap, response: &HeaderMap) -> Vec<HeaderChange> {
    let mut changes = Vec::new();

    for name in request.keys().filter(|name| !is_request_only(name)) {
        let Some(old) = joined_value(request, name) else {
            continue;
        };

        match joined_value(response, name) {
            None => changes.push(HeaderChange::Removed {
                name: name.clone(),
                old,
            }),
            Some(new) if new != old => changes.push(HeaderChange::Changed {
                name: name.clone(),
                old,
                new,
            }),
            Some(_) => {}
        }
    }

    for name in response.keys().filter(|name| !is_request_only(name)) {
        if request.contains_key(name) {
            continue;
        }

        if let Some(new) = joined_value(response, name) {
            changes.push(HeaderChange::Added {
                name: name.clone(),
                new,
            });
        }
    }

    changes
}
