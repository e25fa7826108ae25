//! reqwest-backed SWIS client

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use log::debug;
use serde_json::Value;
use std::time::Duration;

use super::operations::Operation;
use super::resilience::{MonitoringConfig, ResilienceConfig, RetryPolicy};
use super::swis::SwisApi;
use crate::config::ServerConfig;

/// Path of the JSON endpoint below the server root
const SERVICE_PATH: &str = "SolarWinds/InformationService/v3/Json";

/// Longest server message echoed back in an error
const MAX_ERROR_BODY: usize = 500;

/// Basic-auth credentials for the Orion account
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Client for the SolarWinds Information Service REST endpoint
#[derive(Debug)]
pub struct SwisClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
    retry: RetryPolicy,
    monitoring: MonitoringConfig,
}

impl SwisClient {
    pub fn new(
        server: &ServerConfig,
        credentials: Credentials,
        resilience: ResilienceConfig,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(!server.verify_tls)
            .timeout(Duration::from_secs(server.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        let base_url = format!("https://{}:{}/{}", server.host, server.port, SERVICE_PATH);
        debug!("SWIS endpoint: {}", base_url);

        Ok(Self {
            http,
            base_url,
            credentials,
            retry: RetryPolicy::new(resilience.retry),
            monitoring: resilience.monitoring,
        })
    }

    /// Point the client at another service root (plain HTTP test servers)
    #[cfg(test)]
    fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full request URL for an operation
    pub fn url_for(&self, operation: &Operation) -> String {
        format!("{}/{}", self.base_url, operation.path())
    }
}

#[async_trait]
impl SwisApi for SwisClient {
    async fn execute(&self, operation: &Operation) -> Result<Value> {
        let url = self.url_for(operation);
        let body = operation.body();
        let description = operation.describe();

        if self.monitoring.request_logging {
            debug!("{} request: POST {}", operation.operation_type(), url);
        }
        if self.monitoring.log_bodies {
            debug!("Request body: {}", body);
        }

        let response = self
            .retry
            .execute(&description, || {
                self.http
                    .post(&url)
                    .basic_auth(&self.credentials.username, Some(&self.credentials.password))
                    .json(&body)
                    .send()
            })
            .await
            .with_context(|| format!("Failed to send request: {}", description))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .with_context(|| format!("Failed to read response for: {}", description))?;

        if self.monitoring.request_logging {
            debug!("{} -> HTTP {}", description, status.as_u16());
        }

        if !status.is_success() {
            bail!(
                "{} failed with HTTP {}: {}",
                description,
                status,
                error_message(&text)
            );
        }

        parse_body(&text).with_context(|| format!("Invalid response for: {}", description))
    }
}

/// Decode a response body; SWIS answers some requests with an empty body
fn parse_body(text: &str) -> Result<Value> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(trimmed).context("Response is not valid JSON")
}

/// Extract the server's `Message` from an error body, falling back to the raw text
fn error_message(text: &str) -> String {
    if let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(text) {
        if let Some(Value::String(message)) = obj.get("Message") {
            return message.clone();
        }
    }

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return "<empty response>".to_string();
    }
    trimmed.chars().take(MAX_ERROR_BODY).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::resilience::retry::RetryableError;
    use serde_json::{Map, json};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    /// Read one HTTP request (headers plus Content-Length body)
    async fn read_request(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf).to_string();
            if let Some(end) = text.find("\r\n\r\n") {
                let content_length = text[..end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).to_string()
    }

    /// Serve a single canned response; the handle yields the raw request
    async fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let request = read_request(&mut stream).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.ok();
            request
        });

        (format!("http://{}/{}", addr, SERVICE_PATH), handle)
    }

    fn local_client(base_url: String, resilience: ResilienceConfig, timeout_secs: u64) -> SwisClient {
        let server = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 17778,
            verify_tls: false,
            timeout_secs,
        };
        let credentials = Credentials {
            username: "admin".to_string(),
            password: "secret".to_string(),
        };
        SwisClient::new(&server, credentials, resilience)
            .unwrap()
            .with_base_url(base_url)
    }

    fn test_client() -> SwisClient {
        let server = ServerConfig {
            host: "orion.example".to_string(),
            port: 17778,
            verify_tls: false,
            timeout_secs: 5,
        };
        let credentials = Credentials {
            username: "admin".to_string(),
            password: "secret".to_string(),
        };
        SwisClient::new(&server, credentials, ResilienceConfig::disabled()).unwrap()
    }

    #[test]
    fn test_url_for_operations() {
        let client = test_client();
        assert_eq!(
            client.base_url(),
            "https://orion.example:17778/SolarWinds/InformationService/v3/Json"
        );
        assert_eq!(
            client.url_for(&Operation::create("Orion.Nodes", Map::new())),
            "https://orion.example:17778/SolarWinds/InformationService/v3/Json/Create/Orion.Nodes"
        );
        assert_eq!(
            client.url_for(&Operation::invoke("Cirrus.Nodes", "GetNode", vec![json!("g")])),
            "https://orion.example:17778/SolarWinds/InformationService/v3/Json/Invoke/Cirrus.Nodes/GetNode"
        );
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let rendered = format!("{:?}", test_client().credentials);
        assert!(rendered.contains("admin"));
        assert!(!rendered.contains("secret"));
    }

    #[test]
    fn test_parse_body() {
        assert_eq!(parse_body("").unwrap(), Value::Null);
        assert_eq!(parse_body("  \n").unwrap(), Value::Null);
        assert_eq!(
            parse_body("\"swis://orion/Orion/Orion.Nodes/NodeID=9\"").unwrap(),
            json!("swis://orion/Orion/Orion.Nodes/NodeID=9")
        );
        assert!(parse_body("<html>").is_err());
    }

    #[test]
    fn test_error_message() {
        assert_eq!(
            error_message(r#"{"Message":"Access denied","ExceptionType":"x"}"#),
            "Access denied"
        );
        assert_eq!(error_message("  Bad Gateway "), "Bad Gateway");
        assert_eq!(error_message(""), "<empty response>");
        assert_eq!(error_message(&"x".repeat(2000)).len(), MAX_ERROR_BODY);
    }

    #[tokio::test]
    async fn test_create_posts_json_with_basic_auth() {
        let (base_url, server) =
            serve_once("200 OK", r#""swis://orion/Orion/Orion.Nodes/NodeID=31""#).await;
        let client = local_client(base_url, ResilienceConfig::disabled(), 5);

        let mut props = Map::new();
        props.insert("Caption".to_string(), json!("core-sw1"));
        let uri = client.create("Orion.Nodes", props).await.unwrap();
        assert_eq!(uri, "swis://orion/Orion/Orion.Nodes/NodeID=31");

        let request = server.await.unwrap();
        assert!(request.starts_with(
            "POST /SolarWinds/InformationService/v3/Json/Create/Orion.Nodes HTTP/1.1"
        ));
        // admin:secret
        assert!(request.to_lowercase().contains("authorization: basic "));
        assert!(request.contains("YWRtaW46c2VjcmV0"));
        assert!(request.to_lowercase().contains("content-type: application/json"));

        let (_, body) = request.split_once("\r\n\r\n").unwrap();
        let body: Value = serde_json::from_str(body).unwrap();
        assert_eq!(body, json!({ "Caption": "core-sw1" }));
    }

    #[tokio::test]
    async fn test_error_status_carries_server_message() {
        let (base_url, server) = serve_once(
            "403 Forbidden",
            r#"{"Message":"Access to Orion.Nodes denied","ExceptionType":"System.Security"}"#,
        )
        .await;
        let client = local_client(base_url, ResilienceConfig::disabled(), 5);

        let err = client
            .execute(&Operation::create("Orion.Nodes", Map::new()))
            .await
            .unwrap_err()
            .to_string();
        server.await.unwrap();

        assert!(err.contains("403"));
        assert!(err.contains("Access to Orion.Nodes denied"));
    }

    #[tokio::test]
    async fn test_empty_success_body_is_null() {
        let (base_url, server) = serve_once("200 OK", "").await;
        let client = local_client(base_url, ResilienceConfig::disabled(), 5);

        let response = client
            .execute(&Operation::update(
                "swis://orion/Orion/Orion.Nodes/NodeID=31/CustomProperties",
                Map::new(),
            ))
            .await
            .unwrap();
        let request = server.await.unwrap();

        assert_eq!(response, Value::Null);
        assert!(request.starts_with("POST /SolarWinds/InformationService/v3/Json/swis:"));
        assert!(request.contains("NodeID=31/CustomProperties"));
    }

    /// Address that refuses connections
    async fn closed_port() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}/{}", addr, SERVICE_PATH)
    }

    #[tokio::test]
    async fn test_connect_errors_are_retryable() {
        let err = reqwest::Client::new()
            .post(closed_port().await)
            .send()
            .await
            .unwrap_err();

        assert!(err.is_connect());
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_connect_failure_is_retried_then_reported() {
        let resilience = ResilienceConfig::builder()
            .max_attempts(2)
            .base_delay(Duration::from_millis(200))
            .jitter(false)
            .build();
        let client = local_client(closed_port().await, resilience, 5);

        let started = Instant::now();
        let err = client
            .execute(&Operation::create("Orion.Nodes", Map::new()))
            .await
            .unwrap_err();

        // the only delay is the backoff between the two attempts
        assert!(started.elapsed() >= Duration::from_millis(200));
        assert!(err.to_string().contains("Failed to send request"));
    }

    #[tokio::test]
    async fn test_timeouts_are_not_retried() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let accepted = Arc::new(AtomicUsize::new(0));
        let counter = accepted.clone();

        // Accept connections and never answer
        tokio::spawn(async move {
            let mut open = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                open.push(stream);
            }
        });

        let resilience = ResilienceConfig::builder()
            .max_attempts(3)
            .base_delay(Duration::from_millis(1))
            .jitter(false)
            .build();
        let client = local_client(format!("http://{}/{}", addr, SERVICE_PATH), resilience, 1);

        let result = client
            .execute(&Operation::create("Orion.Nodes", Map::new()))
            .await;
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(result.is_err());
        assert_eq!(accepted.load(Ordering::SeqCst), 1);
    }
}
