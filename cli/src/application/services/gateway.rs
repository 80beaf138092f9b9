//! Application service: create-investigation endpoint client.
//!
//! Serializes the request, bounds the call, and turns whatever came back into
//! either a [`CreatedInvestigation`] or a classified [`GatewayError`]. The
//! endpoint is outside this system's control, so unstructured error bodies
//! are surfaced verbatim.

use std::time::Duration;

use boundary_common::{ErrorResponse, InvestigationRequest, InvestigationResponse};
use serde::Serialize;
use tracing::debug;

use crate::application::ports::{EndpointResponse, EndpointTransport};
use crate::domain::{Credential, GatewayError, IdentityToken};

/// Upper bound on one creation call.
pub const ENDPOINT_TIMEOUT: Duration = Duration::from_secs(30);

/// Validated success response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedInvestigation {
    pub access_point_id: String,
    /// Absent when the request set `skip_task`.
    pub task_arn: Option<String>,
    pub role_arn: Option<String>,
    pub owner: Option<String>,
    pub message: Option<String>,
}

/// Typed client for the create-investigation endpoint.
pub struct LambdaGateway<T> {
    transport: T,
    timeout: Duration,
}

impl<T: EndpointTransport> LambdaGateway<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            timeout: ENDPOINT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Send `request` with `token` as the bearer credential.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::Timeout`] when no response arrives in time.
    /// - [`GatewayError::Rejected`], [`GatewayError::Unauthorized`] or
    ///   [`GatewayError::Unstructured`] for non-200 statuses.
    /// - [`GatewayError::MissingField`] for incomplete 200 responses.
    pub async fn invoke(
        &self,
        credential: &Credential,
        token: &IdentityToken,
        request: &InvestigationRequest,
    ) -> Result<CreatedInvestigation, GatewayError> {
        let body = serde_json::to_vec(request).map_err(|e| GatewayError::Encode(e.to_string()))?;
        debug!(
            cluster_id = %request.cluster_id,
            investigation_id = %request.investigation_id,
            skip_task = request.skip_task,
            "invoking create-investigation endpoint"
        );

        let call = self.transport.post(credential, token, body);
        let response = tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| GatewayError::Timeout(self.timeout))??;
        debug!(status = response.status, "create-investigation endpoint answered");

        classify_response(&response, request.skip_task)
    }
}

/// Turn a raw endpoint response into a result.
///
/// `task_optional` relaxes the `task_arn` requirement for `skip_task`
/// requests; `access_point_id` is always required.
///
/// # Errors
///
/// Returns a [`GatewayError`] for non-200 statuses, undecodable bodies, and
/// success bodies missing a required field.
pub fn classify_response(
    response: &EndpointResponse,
    task_optional: bool,
) -> Result<CreatedInvestigation, GatewayError> {
    let status = response.status;
    if status != 200 {
        let structured = serde_json::from_str::<ErrorResponse>(&response.body)
            .ok()
            .map(|e| e.error)
            .filter(|m| !m.is_empty());
        return Err(match (status, structured) {
            (401 | 403, message) => GatewayError::Unauthorized {
                status,
                message: message.unwrap_or_else(|| response.body.clone()),
            },
            (_, Some(message)) => GatewayError::Rejected { status, message },
            (_, None) => GatewayError::Unstructured {
                status,
                body: response.body.clone(),
            },
        });
    }

    let parsed: InvestigationResponse =
        serde_json::from_str(&response.body).map_err(|e| GatewayError::Decode(e.to_string()))?;

    let access_point_id = parsed
        .access_point_id
        .filter(|s| !s.is_empty())
        .ok_or(GatewayError::MissingField("access_point_id"))?;
    let task_arn = parsed.task_arn.filter(|s| !s.is_empty());
    if task_arn.is_none() && !task_optional {
        return Err(GatewayError::MissingField("task_arn"));
    }

    Ok(CreatedInvestigation {
        access_point_id,
        task_arn,
        role_arn: parsed.role_arn,
        owner: parsed.owner,
        message: parsed.message,
    })
}
