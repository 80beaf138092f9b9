//! Investigation identity, tagged resources, and id generation.
//!
//! Pure types and functions only: no I/O, no async.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use boundary_common::{CLUSTER_ID_TAG, INVESTIGATION_ID_TAG};
use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::domain::error::InvestigationError;

/// Longest id accepted; ids end up inside task-definition family names.
pub const MAX_INVESTIGATION_ID_LEN: usize = 63;

// ── Investigation key ────────────────────────────────────────────────────────

/// The `(cluster, investigation)` pair every workspace resource is tagged with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct InvestigationKey {
    pub cluster_id: String,
    pub investigation_id: String,
}

impl InvestigationKey {
    /// Build a key for an existing investigation. The investigation id is
    /// matched against tags verbatim, so only empty values are refused.
    ///
    /// # Errors
    ///
    /// Returns an error if either id is empty.
    pub fn new(
        cluster_id: impl Into<String>,
        investigation_id: impl Into<String>,
    ) -> Result<Self, InvestigationError> {
        let cluster_id = cluster_id.into();
        let investigation_id = investigation_id.into();
        if cluster_id.trim().is_empty() {
            return Err(InvestigationError::EmptyClusterId);
        }
        if investigation_id.trim().is_empty() {
            return Err(InvestigationError::EmptyInvestigationId);
        }
        Ok(Self {
            cluster_id,
            investigation_id,
        })
    }

    /// Build a key for an investigation about to be created; the id must be
    /// a valid slug (see [`validate_investigation_id`]).
    ///
    /// # Errors
    ///
    /// Returns an error if the cluster id is empty or the investigation id is
    /// not a valid slug.
    pub fn for_creation(
        cluster_id: impl Into<String>,
        investigation_id: impl Into<String>,
    ) -> Result<Self, InvestigationError> {
        let investigation_id = investigation_id.into();
        validate_investigation_id(&investigation_id)?;
        Self::new(cluster_id, investigation_id)
    }

    /// True when `tags` carries both halves of this key.
    #[must_use]
    pub fn matches(&self, tags: &HashMap<String, String>) -> bool {
        tags.get(CLUSTER_ID_TAG) == Some(&self.cluster_id)
            && tags.get(INVESTIGATION_ID_TAG) == Some(&self.investigation_id)
    }

    /// Task-definition family for this investigation:
    /// `{cluster_name}-{cluster_id}-{investigation_id}`.
    #[must_use]
    pub fn task_definition_family(&self, cluster_name: &str) -> String {
        format!("{cluster_name}-{}-{}", self.cluster_id, self.investigation_id)
    }
}

impl fmt::Display for InvestigationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.cluster_id, self.investigation_id)
    }
}

/// Validates an investigation id: lowercase ASCII letters, digits and `-`,
/// at most 63 characters, no leading or trailing `-`.
///
/// # Errors
///
/// Returns [`InvestigationError::InvalidId`] describing the first violation.
pub fn validate_investigation_id(id: &str) -> Result<(), InvestigationError> {
    let invalid = |reason: &str| InvestigationError::InvalidId {
        id: id.to_string(),
        reason: reason.to_string(),
    };
    if id.is_empty() {
        return Err(invalid("must not be empty"));
    }
    if id.len() > MAX_INVESTIGATION_ID_LEN {
        return Err(invalid("must be at most 63 characters"));
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(invalid("only lowercase letters, digits and '-' are allowed"));
    }
    if id.starts_with('-') || id.ends_with('-') {
        return Err(invalid("must not start or end with '-'"));
    }
    Ok(())
}

// ── Id generation ────────────────────────────────────────────────────────────

const ADJECTIVES: &[&str] = &[
    "amber", "bold", "brave", "brisk", "calm", "clever", "cosmic", "crisp", "eager", "fancy",
    "gentle", "glad", "golden", "grand", "happy", "jolly", "keen", "lively", "lucky", "mellow",
    "merry", "nimble", "noble", "polite", "proud", "quick", "quiet", "rapid", "sharp", "shiny",
    "silent", "smooth", "steady", "sunny", "swift", "tidy", "vivid", "warm", "wise", "witty",
];

const VERBS: &[&str] = &[
    "blink", "bounce", "chase", "climb", "dance", "dash", "drift", "float", "glide", "hike",
    "hop", "jump", "march", "paint", "race", "roam", "sail", "sing", "skate", "spin", "sprint",
    "surf", "swim", "swing", "trek", "twirl", "wander", "whirl", "wink", "zoom",
];

const NOUNS: &[&str] = &[
    "badger", "beacon", "canyon", "cloud", "comet", "falcon", "forest", "garden", "harbor",
    "island", "lagoon", "lantern", "meadow", "meteor", "orchard", "otter", "panda", "party",
    "pebble", "puffin", "quartz", "river", "rocket", "summit", "thicket", "tiger", "valley",
    "walrus", "willow", "zephyr",
];

/// Generate a three-word id such as `swift-dance-party`.
///
/// Collisions with existing investigations are not checked here.
pub fn generate_investigation_id(rng: &mut impl Rng) -> String {
    let adjective = ADJECTIVES.choose(rng).copied().unwrap_or("calm");
    let verb = VERBS.choose(rng).copied().unwrap_or("drift");
    let noun = NOUNS.choose(rng).copied().unwrap_or("river");
    format!("{adjective}-{verb}-{noun}")
}

// ── Tagged resources ─────────────────────────────────────────────────────────

/// A storage access point into the shared filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessPoint {
    pub id: String,
    pub path: String,
    pub tags: HashMap<String, String>,
}

/// Lifecycle state reported by the compute service for a task.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    Provisioning,
    Pending,
    Activating,
    Running,
    Deactivating,
    Stopping,
    Deprovisioning,
    Stopped,
    Deleted,
    /// A status this build does not know, kept verbatim.
    Other(String),
}

impl TaskStatus {
    /// Terminal statuses never transition again.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped | Self::Deleted)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Provisioning => "PROVISIONING",
            Self::Pending => "PENDING",
            Self::Activating => "ACTIVATING",
            Self::Running => "RUNNING",
            Self::Deactivating => "DEACTIVATING",
            Self::Stopping => "STOPPING",
            Self::Deprovisioning => "DEPROVISIONING",
            Self::Stopped => "STOPPED",
            Self::Deleted => "DELETED",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_uppercase().as_str() {
            "PROVISIONING" => Self::Provisioning,
            "PENDING" => Self::Pending,
            "ACTIVATING" => Self::Activating,
            "RUNNING" => Self::Running,
            "DEACTIVATING" => Self::Deactivating,
            "STOPPING" => Self::Stopping,
            "DEPROVISIONING" => Self::Deprovisioning,
            "STOPPED" => Self::Stopped,
            "DELETED" => Self::Deleted,
            _ => Self::Other(s.to_string()),
        })
    }
}

impl Serialize for TaskStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TaskStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let Ok(status) = raw.parse::<TaskStatus>();
        Ok(status)
    }
}

/// Which task statuses a listing should return.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(TaskStatus),
}

impl StatusFilter {
    /// `""` and `all` (any case) mean every status; anything else is an exact
    /// status match.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
            Self::All
        } else {
            let Ok(status) = raw.parse::<TaskStatus>();
            Self::Only(status)
        }
    }

    #[must_use]
    pub fn accepts(&self, status: &TaskStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == status,
        }
    }
}

/// A unit of compute belonging to (at most) one investigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    /// Short task id (last segment of the ARN).
    pub id: String,
    pub status: TaskStatus,
    pub tags: HashMap<String, String>,
    pub started_at: Option<DateTime<Utc>>,
}

impl Task {
    #[must_use]
    pub fn tag(&self, key: &str) -> &str {
        self.tags.get(key).map_or("", String::as_str)
    }
}

/// Short id from a task ARN (`arn:aws:ecs:…:task/cluster/abc123` → `abc123`).
#[must_use]
pub fn task_id_from_arn(arn: &str) -> &str {
    arn.rsplit('/').next().unwrap_or(arn)
}

// ── Unit tests ───────────────────────────────────────────────────────────────
