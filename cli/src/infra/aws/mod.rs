//! AWS adapters for the storage, compute, federation and endpoint ports.
//!
//! Every SDK failure is folded into a [`CloudError`] here so that services
//! never see SDK types.

pub mod ecs;
pub mod efs;
pub mod lambda;
pub mod sts;

use std::error::Error as StdError;
use std::fmt::Debug;

use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_ecs::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};

use crate::domain::CloudError;

pub use ecs::EcsCompute;
pub use efs::EfsStorage;
pub use lambda::LambdaInvokeTransport;
pub use sts::StsFederation;

/// Shared SDK configuration using the ambient credential chain.
pub async fn load_sdk_config(region: &str) -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .load()
        .await
}

/// Fold an SDK error into a [`CloudError`].
///
/// `not_found` decides from the service error code and message whether the
/// failure means `resource` does not exist.
pub(crate) fn classify<E, R>(
    operation: &str,
    resource: &str,
    err: &SdkError<E, R>,
    not_found: impl Fn(&str, &str) -> bool,
) -> CloudError
where
    E: ProvideErrorMetadata + StdError + 'static,
    R: Debug,
{
    if matches!(err, SdkError::TimeoutError(_)) {
        return CloudError::Timeout {
            operation: operation.to_string(),
        };
    }
    let code = err.code().unwrap_or_default();
    let message = err.message().unwrap_or_default();
    if !code.is_empty() && not_found(code, message) {
        return CloudError::not_found(resource);
    }
    CloudError::api(operation, DisplayErrorContext(err))
}

/// `NotFound`-suffixed codes, the usual AWS spelling.
pub(crate) fn code_ends_with_not_found(code: &str, _message: &str) -> bool {
    code.ends_with("NotFound") || code.ends_with("NotFoundException")
}
