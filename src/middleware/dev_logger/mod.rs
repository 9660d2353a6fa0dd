mod future;
mod layer;
mod service;

pub use future::ResponseFuture;
pub use layer::DevLoggerLayer;
pub use service::DevLogger;

#[cfg(test)]
mod tests;
