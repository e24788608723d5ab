use std::future::Future;
use std::sync::Arc;

use crate::error::Result;

/// A link that accepts complete frames.
///
/// `write` is fire-and-forget: it resolves once the bytes are handed to the
/// link, never after a device acknowledgement. A failed write is reported
/// once and not retried.
pub trait Transport: Send + Sync {
    /// Hand one complete frame to the link.
    fn write(&self, bytes: &[u8]) -> impl Future<Output = Result<()>> + Send;
}

impl<T: Transport> Transport for Arc<T> {
    fn write(&self, bytes: &[u8]) -> impl Future<Output = Result<()>> + Send {
        (**self).write(bytes)
    }
}
