//! Lambda `Invoke` as the [`EndpointTransport`] port.
//!
//! The create-investigation function is written for function URLs, so the
//! JSON body is wrapped in an HTTP-style event and the `{statusCode, body}`
//! result is unwrapped back into an [`EndpointResponse`].

use std::time::SystemTime;

use aws_sdk_lambda::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_lambda::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_lambda::primitives::Blob;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ports::{EndpointResponse, EndpointTransport};
use crate::domain::{Credential, GatewayError, IdentityToken};

/// Invokes a named function with the federated invoker credential.
#[derive(Debug, Clone)]
pub struct LambdaInvokeTransport {
    function_name: String,
    region: String,
}

impl LambdaInvokeTransport {
    #[must_use]
    pub fn new(function_name: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            function_name: function_name.into(),
            region: region.into(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HttpEvent<'a> {
    version: &'static str,
    headers: EventHeaders<'a>,
    body: &'a str,
    is_base64_encoded: bool,
    request_context: RequestContext,
}

#[derive(Serialize)]
struct EventHeaders<'a> {
    authorization: String,
    #[serde(rename = "content-type")]
    content_type: &'a str,
}

#[derive(Serialize)]
struct RequestContext {
    http: HttpContext,
}

#[derive(Serialize)]
struct HttpContext {
    method: &'static str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HttpResult {
    status_code: u16,
    #[serde(default)]
    body: String,
}

/// Build the invocation payload for `body`.
fn wrap_event(bearer: &IdentityToken, body: &str) -> Result<Vec<u8>, GatewayError> {
    let event = HttpEvent {
        version: "2.0",
        headers: EventHeaders {
            authorization: format!("Bearer {}", bearer.expose()),
            content_type: "application/json",
        },
        body,
        is_base64_encoded: false,
        request_context: RequestContext {
            http: HttpContext { method: "POST" },
        },
    };
    serde_json::to_vec(&event).map_err(|e| GatewayError::Encode(e.to_string()))
}

/// Recover the HTTP-style result. A payload that is not one is passed
/// through as an unstructured 502.
fn unwrap_result(payload: &[u8]) -> EndpointResponse {
    match serde_json::from_slice::<HttpResult>(payload) {
        Ok(result) => EndpointResponse {
            status: result.status_code,
            body: result.body,
        },
        Err(_) => EndpointResponse {
            status: 502,
            body: String::from_utf8_lossy(payload).into_owned(),
        },
    }
}

impl EndpointTransport for LambdaInvokeTransport {
    async fn post(
        &self,
        credential: &Credential,
        bearer: &IdentityToken,
        body: Vec<u8>,
    ) -> Result<EndpointResponse, GatewayError> {
        let body = String::from_utf8(body).map_err(|e| GatewayError::Encode(e.to_string()))?;
        let payload = wrap_event(bearer, &body)?;

        let credentials = Credentials::new(
            &credential.access_key_id,
            &credential.secret_access_key,
            Some(credential.session_token.clone()),
            Some(SystemTime::from(credential.expires_at)),
            "boundary-federation",
        );
        let config = aws_sdk_lambda::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(self.region.clone()))
            .credentials_provider(credentials)
            .build();
        let client = aws_sdk_lambda::Client::from_conf(config);

        let resp = client
            .invoke()
            .function_name(&self.function_name)
            .payload(Blob::new(payload))
            .send()
            .await
            .map_err(|e| match e.code() {
                Some(code) if code.contains("AccessDenied") => GatewayError::Unauthorized {
                    status: 403,
                    message: e.message().unwrap_or(code).to_string(),
                },
                _ => GatewayError::Transport(DisplayErrorContext(&e).to_string()),
            })?;

        let raw: &[u8] = resp.payload().map(|b| b.as_ref()).unwrap_or_default();
        if let Some(function_error) = resp.function_error() {
            debug!(function_error, "function raised an error");
            return Ok(EndpointResponse {
                status: 502,
                body: String::from_utf8_lossy(raw).into_owned(),
            });
        }
        Ok(unwrap_result(raw))
    }
}
