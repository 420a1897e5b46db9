//! Byte relay between a resource and the client connection.
//!
//! A download is copied in fixed 1 KiB chunks from the resource reader into a
//! sink. In the handler that sink is one end of an in-memory pipe whose other
//! end feeds the response body: when the client goes away hyper drops the body,
//! and the next write into the pipe fails with `BrokenPipe`.

use bytes::Bytes;
use futures::Stream;
use std::io;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Size of the intermediate copy buffer.
pub const CHUNK_SIZE: usize = 1024;

/// Failure while relaying a download.
#[derive(Error, Debug)]
pub enum TransferError {
    /// The client closed the connection before the body was complete.
    #[error("client disconnected: {0}")]
    ClientDisconnected(#[source] io::Error),

    /// Reading from the resource failed.
    #[error("failed to read resource: {0}")]
    Read(#[source] io::Error),

    /// Writing to the client failed for a reason other than disconnect.
    #[error("failed to write response: {0}")]
    Write(#[source] io::Error),
}

impl TransferError {
    /// Classify a sink-side I/O error.
    pub fn from_write(error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::BrokenPipe
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted => Self::ClientDisconnected(error),
            _ => Self::Write(error),
        }
    }

    pub fn is_client_disconnect(&self) -> bool {
        matches!(self, Self::ClientDisconnected(_))
    }
}

/// Copy `source` into `sink` until end-of-stream, returning bytes written.
///
/// Both ends are taken by value and dropped before this returns, whichever
/// way the copy ends.
pub async fn relay<R, W>(mut source: R, mut sink: W) -> Result<u64, TransferError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buffer = [0u8; CHUNK_SIZE];
    let mut sent = 0u64;

    loop {
        let read = source.read(&mut buffer).await.map_err(TransferError::Read)?;
        if read == 0 {
            break;
        }
        sink.write_all(&buffer[..read])
            .await
            .map_err(TransferError::from_write)?;
        sent += read as u64;
    }

    sink.flush().await.map_err(TransferError::from_write)?;
    Ok(sent)
}

/// Relay a download and apply the logging policy to its outcome.
///
/// Disconnects are expected and produce no log output. Any other failure is
/// logged once with the file name; bytes already delivered stay delivered.
pub async fn send<R, W>(file_name: String, source: R, sink: W)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    match relay(source, sink).await {
        Ok(sent) => {
            tracing::info!(file_name = %file_name, bytes = sent, "File downloaded successfully");
        }
        Err(e) if e.is_client_disconnect() => {}
        Err(e) => {
            tracing::error!(file_name = %file_name, error = %e, "Error sending file to client");
        }
    }
}

/// Turn the read end of the download pipe into a response body stream.
pub fn body_stream<R>(mut reader: R) -> impl Stream<Item = io::Result<Bytes>> + Send
where
    R: AsyncRead + Unpin + Send + 'static,
{
    async_stream::stream! {
        let mut buffer = vec![0u8; CHUNK_SIZE];
        loop {
            match reader.read(&mut buffer).await {
                Ok(0) => break,
                Ok(read) => yield Ok(Bytes::copy_from_slice(&buffer[..read])),
                Err(e) => {
                    yield Err(e);
                    break;
                }
            }
        }
    }
}
