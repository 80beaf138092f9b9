//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod credential;
pub mod error;
pub mod investigation;

pub use config::{BoundaryConfig, CONFIG_KEYS, EndpointTarget};
pub use credential::{Credential, IdentityToken, PkceConfig};
pub use error::{
    CloudError, ConfigError, ErrorKind, GatewayError, InvestigationError, LifecycleError, Step,
};
pub use investigation::{
    AccessPoint, InvestigationKey, StatusFilter, Task, TaskStatus, generate_investigation_id,
    task_id_from_arn, validate_investigation_id,
};
