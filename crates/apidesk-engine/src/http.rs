//! Remote AsyncAPI definitions from a publisher REST API.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::store::{DefinitionSource, StoreError};

/// Fetches `GET {base}/apis/{id}/asyncapi` from a publisher REST API.
#[derive(Debug, Clone)]
pub struct HttpDefinitionSource {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpDefinitionSource {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            token,
        }
    }

    /// URL of the definition resource for `api_id`.
    pub fn definition_url(&self, api_id: &str) -> String {
        format!("{}/apis/{api_id}/asyncapi", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl DefinitionSource for HttpDefinitionSource {
    async fn fetch_definition(&self, api_id: &str) -> Result<String, StoreError> {
        let url = self.definition_url(api_id);
        debug!(%url, "requesting AsyncAPI definition");

        let mut request = self.client.get(&url).header("Accept", "application/json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(StoreError::DefinitionNotFound(api_id.to_string()));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StoreError::Http {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve one canned response on a local port. The handle yields the
    /// raw request head.
    async fn serve_once(status: &str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            String::from_utf8_lossy(&request).into_owned()
        });

        (base_url, handle)
    }

    #[tokio::test]
    async fn test_fetch_returns_body_and_sends_token() {
        let (base_url, server) = serve_once("200 OK", r#"{"asyncapi":"2.0.0"}"#).await;
        let source = HttpDefinitionSource::new(base_url, Some("secret".into()));

        let raw = source.fetch_definition("pizza").await.unwrap();
        assert_eq!(raw, r#"{"asyncapi":"2.0.0"}"#);

        let request = server.await.unwrap().to_ascii_lowercase();
        assert!(request.starts_with("get /apis/pizza/asyncapi http/1.1"));
        assert!(request.contains("authorization: bearer secret"));
    }

    #[tokio::test]
    async fn test_fetch_without_token_sends_no_auth() {
        let (base_url, server) = serve_once("200 OK", "{}").await;
        let source = HttpDefinitionSource::new(base_url, None);

        source.fetch_definition("pizza").await.unwrap();
        let request = server.await.unwrap().to_ascii_lowercase();
        assert!(!request.contains("authorization:"));
    }

    #[tokio::test]
    async fn test_fetch_not_found() {
        let (base_url, server) = serve_once("404 Not Found", "").await;
        let source = HttpDefinitionSource::new(base_url, None);

        let result = source.fetch_definition("ghost").await;
        assert!(matches!(result, Err(StoreError::DefinitionNotFound(id)) if id == "ghost"));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_server_error() {
        let (base_url, server) = serve_once("503 Service Unavailable", "down for maintenance").await;
        let source = HttpDefinitionSource::new(base_url, None);

        match source.fetch_definition("pizza").await {
            Err(StoreError::Http { status, message }) => {
                assert_eq!(status, 503);
                assert_eq!(message, "down for maintenance");
            }
            other => panic!("expected HTTP error, got {other:?}"),
        }
        server.await.unwrap();
    }

    #[test]
    fn test_definition_url() {
        let source = HttpDefinitionSource::new("https://localhost:9443/api/am/publisher/v1/", None);
        assert_eq!(
            source.definition_url("1a2b"),
            "https://localhost:9443/api/am/publisher/v1/apis/1a2b/asyncapi"
        );
    }
}
