use http::Response;
use pin_project_lite::pin_project;
use std::{
    future::Future,
    pin::Pin,
    task::{ready, Context, Poll},
};

use crate::{inspect::inspect_response, request::RequestSnapshot, state::DevLoggerState};

pin_project! {
    pub struct ResponseFuture<F> {
        #[pin]
        future: F,
        pending: Option<(DevLoggerState, RequestSnapshot)>,
    }
}

impl<F> ResponseFuture<F> {
    pub(crate) fn new(future: F, state: DevLoggerState, snapshot: RequestSnapshot) -> Self {
        ResponseFuture {
            future,
            pending: Some((state, snapshot)),
        }
    }

    /// Resolves to the inner response untouched.
    pub(crate) fn passthrough(future: F) -> Self {
        ResponseFuture {
            future,
            pending: None,
        }
    }
}

impl<F, B, E> Future for ResponseFuture<F>
where
    F: Future<Output = Result<Response<B>, E>>,
{
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();

        let mut response = ready!(this.future.poll(cx))?;

        if let Some((state, snapshot)) = this.pending.take() {
            inspect_response(state.tracker(), &snapshot, &mut response);
        }

        Poll::Ready(Ok(response))
    }
}
