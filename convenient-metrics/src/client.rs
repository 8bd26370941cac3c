//! HTTP client for the analytics query endpoint

use crate::aggregate::{MetricsRow, aggregate};
use crate::labels::ProverLabels;
use crate::parse::{RawRow, parse_response};
use crate::{MetricsError, MetricsResult};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

/// Anything that can produce the current set of prover metrics
#[async_trait]
pub trait MetricsSource: Send + Sync {
    /// Fetch fresh, aggregated metrics
    ///
    /// # Errors
    ///
    /// Returns `MetricsError` if the metrics could not be fetched
    async fn fetch(&self) -> MetricsResult<Vec<MetricsRow>>;
}

/// Analytics API client
///
/// Issues a GET against a fixed query endpoint and reads the `rows` (or
/// `data`) array of the JSON response.
#[derive(Clone)]
pub struct AnalyticsClient {
    endpoint: String,
    client: Client,
}

impl AnalyticsClient {
    /// Create a new analytics client
    ///
    /// # Arguments
    ///
    /// * `endpoint` - Full URL of the analytics query (e.g., "<https://analytics.example.com/q/provers>")
    ///
    /// # Errors
    ///
    /// Returns `MetricsError::InvalidUrl` if the URL is malformed
    pub fn new(endpoint: &str) -> MetricsResult<Self> {
        let endpoint = endpoint.trim_end_matches('/').to_string();

        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(MetricsError::InvalidUrl(endpoint));
        }

        Ok(Self {
            endpoint,
            client: Client::new(),
        })
    }

    /// The endpoint this client queries
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch the raw rows from the analytics endpoint
    ///
    /// # Errors
    ///
    /// Returns `MetricsError::Http` if the request fails
    /// Returns `MetricsError::ServerError` if the server returns an error
    /// Returns `MetricsError::MalformedBody` if the body has no row array
    pub async fn fetch_rows(&self) -> MetricsResult<Vec<RawRow>> {
        let response = self.client.get(&self.endpoint).send().await?;

        if !response.status().is_success() {
            return Err(MetricsError::ServerError(format!(
                "Failed to query analytics: {}",
                response.status()
            )));
        }

        let body: serde_json::Value = response.json().await?;
        let rows = parse_response(&body)?;
        debug!(rows = rows.len(), "fetched analytics rows");

        Ok(rows)
    }
}

/// An [`AnalyticsClient`] paired with the labels used for aggregation
#[derive(Clone)]
pub struct LabelledSource {
    client: AnalyticsClient,
    labels: ProverLabels,
}

impl LabelledSource {
    /// Create a labelled metrics source
    #[must_use]
    pub fn new(client: AnalyticsClient, labels: ProverLabels) -> Self {
        Self { client, labels }
    }
}

#[async_trait]
impl MetricsSource for LabelledSource {
    async fn fetch(&self) -> MetricsResult<Vec<MetricsRow>> {
        let rows = self.client.fetch_rows().await?;
        Ok(aggregate(&rows, &self.labels))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    /// Answer one HTTP request with `status` and `body`, returning the raw
    /// request text once the exchange is done
    async fn serve_once(
        path: &str,
        status: &'static str,
        body: &'static str,
    ) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}{path}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let request = read_request(&mut stream).await;
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
            request
        });

        (url, handle)
    }

    async fn read_request(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf);
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    #[test]
    fn test_client_creation() {
        assert!(AnalyticsClient::new("http://localhost:8123/query").is_ok());
        assert!(AnalyticsClient::new("https://analytics.example.com").is_ok());
        assert!(AnalyticsClient::new("analytics.example.com").is_err());
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = AnalyticsClient::new("https://analytics.example.com/q/").unwrap();
        assert_eq!(client.endpoint(), "https://analytics.example.com/q");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_http_error() {
        // port 9 (discard) is not listening on test machines
        let client = AnalyticsClient::new("http://127.0.0.1:9/query").unwrap();
        let source = LabelledSource::new(client, ProverLabels::default());

        assert!(matches!(source.fetch().await, Err(MetricsError::Http(_))));
    }

    #[tokio::test]
    async fn test_fetch_rows_parses_body() {
        let (url, server) = serve_once(
            "/query",
            "200 OK",
            r#"{"rows":[{"prover_addr":"0xAA","orders_taken":"3","cycles_proved":"1,500"}]}"#,
        )
        .await;
        let client = AnalyticsClient::new(&url).unwrap();

        let rows = client.fetch_rows().await.unwrap();
        assert_eq!(
            rows,
            vec![RawRow {
                prover_addr: "0xAA".to_string(),
                orders_taken: 3,
                cycles_proved: 1500.0,
            }]
        );

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /query HTTP/1.1\r\n"));
    }

    #[tokio::test]
    async fn test_error_status_is_server_error() {
        let (url, server) = serve_once("/query", "503 Service Unavailable", "{}").await;
        let source = LabelledSource::new(AnalyticsClient::new(&url).unwrap(), ProverLabels::new());

        match source.fetch().await {
            Err(MetricsError::ServerError(message)) => assert!(message.contains("503")),
            other => panic!("expected server error, got {other:?}"),
        }
        let _request = server.await.unwrap();
    }

    #[tokio::test]
    async fn test_body_without_rows_is_malformed() {
        let (url, server) = serve_once("/query", "200 OK", r#"{"meta":[]}"#).await;
        let client = AnalyticsClient::new(&url).unwrap();

        assert!(matches!(client.fetch_rows().await, Err(MetricsError::MalformedBody(_))));
        let _request = server.await.unwrap();
    }
}
