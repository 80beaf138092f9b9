use serde::{Deserialize, Serialize};

/// Body POSTed to the create-investigation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InvestigationRequest {
    pub cluster_id: String,
    pub investigation_id: String,
    /// OpenShift client version to install in the task image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oc_version: Option<String>,
    /// Task lifetime in seconds before the endpoint's reaper stops it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_timeout: Option<u64>,
    /// Create the access point only, without launching a task.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub skip_task: bool,
}

impl InvestigationRequest {
    /// Request that creates the access point and launches a task.
    #[must_use]
    pub fn new(cluster_id: impl Into<String>, investigation_id: impl Into<String>) -> Self {
        Self {
            cluster_id: cluster_id.into(),
            investigation_id: investigation_id.into(),
            oc_version: None,
            task_timeout: None,
            skip_task: false,
        }
    }

    /// Request that creates the access point only.
    #[must_use]
    pub fn workspace_only(
        cluster_id: impl Into<String>,
        investigation_id: impl Into<String>,
    ) -> Self {
        Self {
            skip_task: true,
            ..Self::new(cluster_id, investigation_id)
        }
    }
}

/// Successful endpoint response.
///
/// Every field is optional on the wire; callers decide which ones a given
/// request mode requires. `task_arn` is legitimately absent for
/// `skip_task` requests.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct InvestigationResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub role_arn: Option<String>,
    #[serde(default)]
    pub task_arn: Option<String>,
    #[serde(default)]
    pub access_point_id: Option<String>,
    #[serde(default)]
    pub investigation_id: Option<String>,
    #[serde(default)]
    pub cluster_id: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub oc_version: Option<String>,
    #[serde(default)]
    pub task_timeout: Option<u64>,
}

/// Error body returned with non-200 statuses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}
