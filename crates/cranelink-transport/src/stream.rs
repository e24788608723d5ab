use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::{debug, trace};

use crate::endpoint::Endpoint;
use crate::error::{Result, TransportError};
use crate::traits::Transport;

/// A connected byte stream to a device bridge.
///
/// On Unix this may wrap a Unix domain socket; everywhere it may wrap TCP.
pub struct ByteStream {
    inner: ByteStreamInner,
}

enum ByteStreamInner {
    Tcp(TcpStream),
    #[cfg(unix)]
    Unix(tokio::net::UnixStream),
}

impl ByteStream {
    /// Connect to `endpoint`.
    pub async fn connect(endpoint: &Endpoint) -> Result<Self> {
        let inner = match endpoint {
            Endpoint::Tcp(addr) => {
                let stream =
                    TcpStream::connect(addr)
                        .await
                        .map_err(|e| TransportError::Connect {
                            endpoint: endpoint.to_string(),
                            source: e,
                        })?;
                stream.set_nodelay(true)?;
                ByteStreamInner::Tcp(stream)
            }
            #[cfg(unix)]
            Endpoint::Unix(path) => {
                let stream = tokio::net::UnixStream::connect(path)
                    .await
                    .map_err(|e| TransportError::Connect {
                        endpoint: endpoint.to_string(),
                        source: e,
                    })?;
                ByteStreamInner::Unix(stream)
            }
            #[cfg(not(unix))]
            Endpoint::Unix(_) => {
                return Err(TransportError::Connect {
                    endpoint: endpoint.to_string(),
                    source: io::Error::new(
                        io::ErrorKind::Unsupported,
                        "unix sockets are not available on this platform",
                    ),
                });
            }
        };
        debug!(%endpoint, "connected to device bridge");
        Ok(Self { inner })
    }

    /// Transport name for diagnostics.
    pub fn transport_name(&self) -> &'static str {
        match &self.inner {
            ByteStreamInner::Tcp(_) => "tcp",
            #[cfg(unix)]
            ByteStreamInner::Unix(_) => "unix-domain-socket",
        }
    }
}

impl AsyncWrite for ByteStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match &mut self.get_mut().inner {
            ByteStreamInner::Tcp(stream) => Pin::new(stream).poll_write(cx, buf),
            #[cfg(unix)]
            ByteStreamInner::Unix(stream) => Pin::new(stream).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match &mut self.get_mut().inner {
            ByteStreamInner::Tcp(stream) => Pin::new(stream).poll_flush(cx),
            #[cfg(unix)]
            ByteStreamInner::Unix(stream) => Pin::new(stream).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match &mut self.get_mut().inner {
            ByteStreamInner::Tcp(stream) => Pin::new(stream).poll_shutdown(cx),
            #[cfg(unix)]
            ByteStreamInner::Unix(stream) => Pin::new(stream).poll_shutdown(cx),
        }
    }
}

impl std::fmt::Debug for ByteStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteStream")
            .field("type", &self.transport_name())
            .finish()
    }
}

/// Writes whole frames to any `AsyncWrite` stream.
///
/// Each frame is written completely and flushed before `write` resolves.
/// Concurrent writers are serialized by an internal lock so frames never
/// interleave on the wire.
#[derive(Debug)]
pub struct StreamTransport<W> {
    inner: Mutex<W>,
}

impl StreamTransport<ByteStream> {
    /// Connect to a device bridge.
    pub async fn connect(endpoint: &Endpoint) -> Result<Self> {
        Ok(Self::new(ByteStream::connect(endpoint).await?))
    }
}

impl<W> StreamTransport<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(inner: W) -> Self {
        Self {
            inner: Mutex::new(inner),
        }
    }

    /// Shut down the write half.
    pub async fn shutdown(&self) -> Result<()> {
        self.inner.lock().await.shutdown().await?;
        Ok(())
    }
}

impl<W> Transport for StreamTransport<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn write(&self, bytes: &[u8]) -> Result<()> {
        let mut stream = self.inner.lock().await;
        stream.write_all(bytes).await.map_err(map_write_error)?;
        stream.flush().await.map_err(map_write_error)?;
        trace!(len = bytes.len(), "frame written");
        Ok(())
    }
}

fn map_write_error(err: io::Error) -> TransportError {
    match err.kind() {
        io::ErrorKind::BrokenPipe
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::WriteZero => TransportError::Closed,
        _ => TransportError::Io(err),
    }
}
