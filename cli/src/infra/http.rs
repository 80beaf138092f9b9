//! Lambda function URL as the [`EndpointTransport`] port.

use anyhow::{Context, Result};
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

use crate::application::ports::{EndpointResponse, EndpointTransport};
use crate::application::services::gateway::ENDPOINT_TIMEOUT;
use crate::domain::{Credential, GatewayError, IdentityToken};

/// POSTs to a function URL with the identity token as bearer.
///
/// Function URLs authenticate the bearer themselves, so the federated
/// credential is not used here.
#[derive(Debug, Clone)]
pub struct FunctionUrlTransport {
    client: reqwest::Client,
    url: String,
}

impl FunctionUrlTransport {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(ENDPOINT_TIMEOUT)
            .user_agent(concat!("boundary/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("cannot build HTTP client")?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl EndpointTransport for FunctionUrlTransport {
    async fn post(
        &self,
        _credential: &Credential,
        bearer: &IdentityToken,
        body: Vec<u8>,
    ) -> Result<EndpointResponse, GatewayError> {
        let resp = self
            .client
            .post(&self.url)
            .bearer_auth(bearer.expose())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(map_reqwest)?;
        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(map_reqwest)?;
        debug!(url = %self.url, status, "function URL answered");
        Ok(EndpointResponse { status, body })
    }
}

fn map_reqwest(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Timeout(ENDPOINT_TIMEOUT)
    } else {
        GatewayError::Transport(err.to_string())
    }
}
