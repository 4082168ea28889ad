use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::response::Response;

const HTTP_VERSION: &str = "HTTP/1.1";

/// Serializes a response into wire bytes.
///
/// Adds `Connection: close` when the response carries the close semantic;
/// HTTP/1.1 keep-alive needs no explicit header.
pub fn serialize_response(resp: &Response) -> Vec<u8> {
    let mut buf = Vec::new();

    // Status line
    let status_line = format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        resp.status.as_u16(),
        resp.status.reason_phrase()
    );
    buf.extend_from_slice(status_line.as_bytes());

    // Headers
    for (k, v) in &resp.headers {
        buf.extend_from_slice(k.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(v.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    if !resp.keep_alive {
        buf.extend_from_slice(b"Connection: close\r\n");
    }

    // Header/body separator
    buf.extend_from_slice(b"\r\n");

    // Body
    buf.extend_from_slice(&resp.body);

    buf
}

/// Writes a whole response to any async stream.
pub async fn write_response<W>(stream: &mut W, resp: &Response) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    stream.write_all(&serialize_response(resp)).await?;
    stream.flush().await
}

/// A serialized response with write progress, queued by the connection
/// engine until the stream is free. Tracks how much has been written so a
/// short write never restarts the response from the beginning.
pub struct ResponseWriter {
    buffer: Vec<u8>,
    written: usize,
    keep_alive: bool,
}

impl ResponseWriter {
    pub fn new(response: &Response) -> Self {
        Self {
            buffer: serialize_response(response),
            written: 0,
            keep_alive: response.keep_alive,
        }
    }

    /// Whether the connection stays open once this response is on the wire.
    pub fn keep_alive(&self) -> bool {
        self.keep_alive
    }

    pub async fn write_to_stream<W>(&mut self, stream: &mut W) -> anyhow::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        while self.written < self.buffer.len() {
            let n = stream.write(&self.buffer[self.written..]).await?;

            if n == 0 {
                return Err(anyhow::anyhow!("connection closed while writing"));
            }

            self.written += n;
        }
        stream.flush().await?;

        Ok(())
    }
}
