//! Development-time logging for axum middleware.
//!
//! [`DevLoggerLayer`] wraps a middleware service and logs whether it passed the request through,
//! rewrote it or redirected it, which headers it changed, and warns about redirect sequences
//! that keep going. Redirect sequences are followed across requests with a cookie.

pub mod action;
pub mod cli_args;
pub mod config;
pub mod error;
pub mod headers;
mod inspect;
pub mod log;
pub mod middleware;
pub mod redirect_chain;
pub mod request;
pub mod response;
pub mod route;
pub mod server;
mod state;

pub use config::DevLoggerConfig;
pub use middleware::dev_logger::DevLoggerLayer;
