//! Tag keys stamped on every resource belonging to an investigation.
//!
//! Discovery is a tag-equality query over these keys; nothing else identifies
//! an investigation's resources.

/// Cluster the investigation targets.
pub const CLUSTER_ID_TAG: &str = "cluster_id";

/// Investigation identifier, unique within a cluster.
pub const INVESTIGATION_ID_TAG: &str = "investigation_id";

/// Operator who launched the task. Informational, used for listing only.
pub const USERNAME_TAG: &str = "username";
