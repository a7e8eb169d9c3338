use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

use crate::models::Status;

/// Per-probe timeout when the config does not override it.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Issues single bounded-timeout GET probes and classifies the outcome.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct HttpChecker {
    client: Client,
}

impl HttpChecker {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { client })
    }

    /// One GET round trip, no retries. UP only on a 200 response; transport
    /// errors, timeouts, invalid URLs and any other status are DOWN.
    pub async fn check(&self, url: &str) -> Status {
        match self.client.get(url).send().await {
            Ok(res) if res.status() == StatusCode::OK => Status::Up,
            Ok(res) => {
                debug!(url, status = %res.status(), "probe returned non-200");
                Status::Down
            }
            Err(e) => {
                debug!(url, error = %e, "probe failed");
                Status::Down
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock_server(status: u16) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn ok_response_is_up() {
        let server = mock_server(200).await;
        let checker = HttpChecker::new(5).unwrap();
        assert_eq!(checker.check(&server.uri()).await, Status::Up);
    }

    #[tokio::test]
    async fn non_200_is_down() {
        for status in [201, 301, 404, 500] {
            let server = mock_server(status).await;
            let checker = HttpChecker::new(5).unwrap();
            assert_eq!(checker.check(&server.uri()).await, Status::Down);
        }
    }

    #[tokio::test]
    async fn connection_refused_is_down() {
        let checker = HttpChecker::new(5).unwrap();
        // Port 1 is never listening on loopback.
        assert_eq!(checker.check("http://127.0.0.1:1/").await, Status::Down);
    }

    #[tokio::test]
    async fn garbage_url_is_down() {
        let checker = HttpChecker::new(5).unwrap();
        assert_eq!(checker.check("not a url").await, Status::Down);
    }

    #[tokio::test]
    async fn slow_response_times_out_as_down() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let checker = HttpChecker::new(1).unwrap();
        assert_eq!(checker.check(&server.uri()).await, Status::Down);
    }
}
