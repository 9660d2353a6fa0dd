use std::task::{Context, Poll};

use http::{Request, Response};
use tower::Service;

use super::future::ResponseFuture;
use crate::{request::RequestSnapshot, state::DevLoggerState};

/// Wraps a middleware service and reports on every response it produces.
#[derive(Debug, Clone)]
pub struct DevLogger<S> {
    inner: S,
    state: DevLoggerState,
}

impl<S> DevLogger<S> {
    pub(crate) fn new(inner: S, state: DevLoggerState) -> Self {
        DevLogger { inner, state }
    }
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for DevLogger<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = ResponseFuture<S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<ReqBody>) -> Self::Future {
        if !self.state.enabled() {
            return ResponseFuture::passthrough(self.inner.call(request));
        }

        // Taken before the middleware gets to modify the request.
        let snapshot = RequestSnapshot::capture(&request);

        let future = self.inner.call(request);

        ResponseFuture::new(future, self.state.clone(), snapshot)
    }
}
