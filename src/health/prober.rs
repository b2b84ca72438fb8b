// ABOUTME: HTTP health prober and the trait seam used by the orchestrator.
// ABOUTME: One GET per probe over hyper's HTTP/1 client, bounded by a deadline.

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::Empty;
use hyper::{StatusCode, Uri, header};
use hyper_util::rt::TokioIo;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;

use super::result::HealthCheckResult;

/// Probes one endpoint of one environment.
#[async_trait]
pub trait HealthProber: Send + Sync {
    /// Probe `endpoint` relative to `base_url`. Never fails; problems are
    /// reported through the result status.
    async fn probe(&self, base_url: &str, endpoint: &str) -> HealthCheckResult;
}

/// Real HTTP/1.1 prober.
///
/// Only `http://` URLs are supported. TLS endpoints report an `error` result,
/// so environments behind TLS should be probed through their internal address.
#[derive(Debug, Clone)]
pub struct HttpProber {
    timeout: Duration,
}

impl HttpProber {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl HealthProber for HttpProber {
    async fn probe(&self, base_url: &str, endpoint: &str) -> HealthCheckResult {
        let url = join_url(base_url, endpoint);
        let start = Instant::now();

        let outcome = tokio::time::timeout(self.timeout, get_status(&url)).await;
        let elapsed = start.elapsed();

        match outcome {
            Ok(Ok(status)) if status.is_success() => {
                tracing::debug!(%url, %status, "probe healthy");
                HealthCheckResult::healthy(url, elapsed)
            }
            Ok(Ok(status)) => {
                tracing::debug!(%url, %status, "probe returned non-2xx");
                HealthCheckResult::unhealthy(url, elapsed, format!("HTTP {status}"))
            }
            Ok(Err(reason)) => {
                tracing::debug!(%url, %reason, "probe failed");
                HealthCheckResult::error(url, elapsed, reason)
            }
            Err(_elapsed) => {
                tracing::debug!(%url, "probe timed out");
                HealthCheckResult::error(
                    url,
                    elapsed,
                    format!("timed out after {}ms", self.timeout.as_millis()),
                )
            }
        }
    }
}

/// Join a base URL and an endpoint path with exactly one slash between them.
pub fn join_url(base_url: &str, endpoint: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let path = endpoint.trim_start_matches('/');
    format!("{base}/{path}")
}

/// Issue a GET and return the response status.
async fn get_status(url: &str) -> Result<StatusCode, String> {
    let uri: Uri = url
        .parse()
        .map_err(|e| format!("invalid URL {url}: {e}"))?;

    match uri.scheme_str() {
        Some("http") => {}
        Some(other) => {
            return Err(format!(
                "unsupported scheme '{other}': only http:// endpoints can be probed"
            ));
        }
        None => return Err(format!("URL has no scheme: {url}")),
    }

    let host = uri
        .host()
        .ok_or_else(|| format!("URL has no host: {url}"))?;
    // IPv6 literals come back bracketed from the URI parser
    let connect_host = host.trim_start_matches('[').trim_end_matches(']');
    let port = uri.port_u16().unwrap_or(80);
    let authority = uri
        .authority()
        .map(|a| a.as_str().to_string())
        .unwrap_or_else(|| host.to_string());

    let stream = TcpStream::connect((connect_host, port))
        .await
        .map_err(|e| format!("connection failed: {e}"))?;

    let io = TokioIo::new(stream);
    let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
        .await
        .map_err(|e| format!("HTTP handshake failed: {e}"))?;

    // Drive the connection in the background
    tokio::spawn(async move {
        if let Err(e) = conn.await {
            tracing::debug!("health probe connection error: {}", e);
        }
    });

    let path = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");
    let req = hyper::Request::builder()
        .method("GET")
        .uri(path)
        .header(header::HOST, authority)
        .header(
            header::USER_AGENT,
            concat!("bgdeploy/", env!("CARGO_PKG_VERSION")),
        )
        .body(Empty::<Bytes>::new())
        .map_err(|e| format!("failed to build request: {e}"))?;

    let resp = sender
        .send_request(req)
        .await
        .map_err(|e| format!("request failed: {e}"))?;

    Ok(resp.status())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::HealthStatus;

    #[test]
    fn join_url_normalizes_slashes() {
        assert_eq!(join_url("http://a:1/", "/health"), "http://a:1/health");
        assert_eq!(join_url("http://a:1", "health"), "http://a:1/health");
        assert_eq!(join_url("http://a:1", "/"), "http://a:1/");
    }

    #[tokio::test]
    async fn https_is_reported_as_error() {
        let prober = HttpProber::new(Duration::from_secs(1));
        let result = prober.probe("https://example.com", "/").await;

        assert_eq!(result.status, HealthStatus::Error);
        assert!(result.error.unwrap().contains("unsupported scheme"));
    }

    #[tokio::test]
    async fn garbage_url_is_reported_as_error() {
        let prober = HttpProber::new(Duration::from_secs(1));
        let result = prober.probe("not a url", "/").await;

        assert_eq!(result.status, HealthStatus::Error);
    }
}
