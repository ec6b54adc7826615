use std::error::Error as StdError;
use std::io;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{redirect::Policy, Client, StatusCode};
use tracing::debug;

use crate::{models::RequestDescriptor, ProducerError, Result};

/// Performs the single GET of a sampling cycle.
///
/// `Ok` carries the complete response body of a 200 answer. Any other status
/// is `ProducerError::HttpStatus`; everything below HTTP is `ProducerError::Transport`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, request: &RequestDescriptor) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

/// Upper bound for a whole request when the descriptor sets no `timeout_ms`.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

impl HttpTransport {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        // A redirect is reported like any other non-200 answer.
        let client = Client::builder()
            .redirect(Policy::none())
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, request: &RequestDescriptor) -> Result<String> {
        let url = request.url();
        debug!("GET {}", url);

        let mut builder = self.client.get(&url);
        if let Some(ms) = request.timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }

        let response = builder.send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(ProducerError::HttpStatus(status.as_u16()));
        }

        // Buffers every chunk before anyone gets to parse it.
        let body = response.text().await?;
        debug!("received {} bytes from {}", body.len(), request.host);
        Ok(body)
    }
}

fn io_code(err: &io::Error) -> &'static str {
    match err.kind() {
        io::ErrorKind::ConnectionRefused => "ECONNREFUSED",
        io::ErrorKind::ConnectionReset => "ECONNRESET",
        io::ErrorKind::ConnectionAborted => "ECONNABORTED",
        io::ErrorKind::TimedOut => "ETIMEDOUT",
        io::ErrorKind::NotFound => "ENOTFOUND",
        io::ErrorKind::AddrNotAvailable => "EADDRNOTAVAIL",
        io::ErrorKind::BrokenPipe => "EPIPE",
        io::ErrorKind::UnexpectedEof => "EOF",
        _ => "EIO",
    }
}

/// Short error code for a failed request, in the style of POSIX errno names.
pub(crate) fn error_code(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        return "ETIMEDOUT".to_string();
    }

    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            return io_code(io_err).to_string();
        }
        source = cause.source();
    }

    let code = if err.is_connect() {
        "ECONNECT"
    } else if err.is_body() || err.is_decode() {
        "EBODY"
    } else if err.is_request() || err.is_builder() {
        "EREQUEST"
    } else {
        "EUNKNOWN"
    };
    code.to_string()
}
