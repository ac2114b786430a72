//! Blocking HTTP GET primitive.
//!
//! The pipeline only needs one operation: issue a GET with a caller-supplied
//! timeout and get back a status code plus body bytes. It is a trait so the
//! scheduler and pipeline tests can substitute an in-memory implementation;
//! production uses a curl `Easy` handle per request.

use std::time::Duration;
use thiserror::Error;

/// Status code and body of a completed GET. A non-2xx status is still a
/// completed response; classifying it is the caller's job.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u32,
    pub body: Vec<u8>,
}

/// Transport-level failure of a GET (no response at all).
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("{0}")]
    Transport(String),
}

/// Blocking GET with a per-request timeout.
pub trait HttpGet {
    fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse, HttpError>;
}

/// libcurl-backed implementation. One `Easy` handle per request; follows
/// redirects up to a small bound.
#[derive(Debug, Default)]
pub struct CurlHttp;

impl HttpGet for CurlHttp {
    fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse, HttpError> {
        let mut body: Vec<u8> = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(url).map_err(curl_transport)?;
        easy.get(true).map_err(curl_transport)?;
        easy.follow_location(true).map_err(curl_transport)?;
        easy.max_redirections(10).map_err(curl_transport)?;
        easy.timeout(timeout).map_err(curl_transport)?;
        easy.connect_timeout(timeout).map_err(curl_transport)?;

        {
            let mut transfer = easy.transfer();
            transfer
                .write_function(|data| {
                    body.extend_from_slice(data);
                    Ok(data.len())
                })
                .map_err(curl_transport)?;
            transfer.perform().map_err(|e| {
                if e.is_operation_timedout() {
                    HttpError::Timeout(timeout)
                } else {
                    curl_transport(e)
                }
            })?;
        }

        let status = easy.response_code().map_err(curl_transport)?;
        Ok(HttpResponse { status, body })
    }
}

fn curl_transport(e: curl::Error) -> HttpError {
    HttpError::Transport(e.to_string())
}
