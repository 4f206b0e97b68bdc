//! Docker Engine API network client

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::{Client, Method, Response, StatusCode};
use serde::Deserialize;

use docknet_core::{NetworkCreateRequest, NetworkHandle, NetworkRuntime};

use crate::error::DockerError;

/// Default daemon endpoint (TCP socket)
pub const DEFAULT_DOCKER_URL: &str = "http://127.0.0.1:2375";

/// Default per-request timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Error body returned by the daemon
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Answer to `POST /networks/create`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CreateResponse {
    id: String,
    #[serde(default)]
    warning: String,
}

/// Docker network client
///
/// Talks to the daemon over HTTP. `tcp://` endpoints, as found in
/// `DOCKER_HOST`, are accepted and mapped to `http://`.
#[derive(Debug, Clone)]
pub struct DockerClient {
    client: Client,
    base_url: String,
}

impl DockerClient {
    /// Create new client for the daemon at `endpoint`
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let base_url = normalize_endpoint(endpoint)?;
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { client, base_url })
    }

    fn network_url(&self, name: &str) -> String {
        format!("{}/networks/{}", self.base_url, urlencoding::encode(name))
    }

    async fn request(
        &self,
        method: Method,
        url: &str,
        body: Option<&NetworkCreateRequest>,
    ) -> std::result::Result<Response, DockerError> {
        debug!("docker {} {}", method, url);
        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }
}

#[async_trait]
impl NetworkRuntime for DockerClient {
    async fn inspect_network(&self, name: &str) -> Result<Option<NetworkHandle>> {
        let response = self
            .request(Method::GET, &self.network_url(name), None)
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(api_error(response).await.into());
        }

        let handle: NetworkHandle = response.json().await.map_err(DockerError::from)?;
        Ok(Some(handle))
    }

    async fn create_network(&self, request: &NetworkCreateRequest) -> Result<NetworkHandle> {
        let url = format!("{}/networks/create", self.base_url);
        let response = self.request(Method::POST, &url, Some(request)).await?;

        if !response.status().is_success() {
            return Err(api_error(response).await.into());
        }

        let created: CreateResponse = response.json().await.map_err(DockerError::from)?;
        if !created.warning.is_empty() {
            warn!("docker network {}: {}", request.name, created.warning);
        }
        info!("docker network {} created with id {}", request.name, created.id);

        Ok(NetworkHandle {
            id: created.id,
            driver: request.driver.clone(),
        })
    }

    async fn remove_network(&self, name: &str) -> Result<()> {
        let response = self
            .request(Method::DELETE, &self.network_url(name), None)
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await.into());
        }
        Ok(())
    }
}

async fn api_error(response: Response) -> DockerError {
    let status = response.status();
    let text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    DockerError::Api {
        status: status.as_u16(),
        message: error_message(&text),
    }
}

/// Daemon errors come as `{"message": "..."}`; anything else is passed on
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.message,
        Err(_) => body.trim().to_string(),
    }
}

fn normalize_endpoint(endpoint: &str) -> std::result::Result<String, DockerError> {
    let endpoint = endpoint.trim().trim_end_matches('/');

    if let Some(rest) = endpoint.strip_prefix("tcp://") {
        return Ok(format!("http://{}", rest));
    }
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        return Ok(endpoint.to_string());
    }

    let reason = if endpoint.starts_with("unix://") {
        "unix sockets are not supported, expose the daemon on TCP (-H tcp://...)"
    } else {
        "expected an http://, https:// or tcp:// endpoint"
    };
    Err(DockerError::InvalidEndpoint {
        url: endpoint.to_string(),
        reason: reason.to_string(),
    })
}
