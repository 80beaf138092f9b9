//! STS web-identity federation as the [`CredentialFederation`] port.

use aws_config::{BehaviorVersion, Region};
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::application::ports::CredentialFederation;
use crate::domain::{CloudError, Credential, IdentityToken};
use crate::infra::aws::{classify, code_ends_with_not_found};

/// Exchanges an OIDC id token for invoker-role credentials.
///
/// The call is unsigned, so no ambient AWS credentials are needed.
#[derive(Debug, Default, Clone, Copy)]
pub struct StsFederation;

impl CredentialFederation for StsFederation {
    async fn assume_role_with_identity(
        &self,
        region: &str,
        role_arn: &str,
        token: &IdentityToken,
        session_name: &str,
    ) -> Result<Credential, CloudError> {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .no_credentials()
            .load()
            .await;
        let client = aws_sdk_sts::Client::new(&config);

        let resp = client
            .assume_role_with_web_identity()
            .role_arn(role_arn)
            .role_session_name(session_name)
            .web_identity_token(token.expose())
            .send()
            .await
            .map_err(|e| {
                classify(
                    "AssumeRoleWithWebIdentity",
                    role_arn,
                    &e,
                    code_ends_with_not_found,
                )
            })?;

        let creds = resp.credentials().ok_or_else(|| {
            CloudError::api("AssumeRoleWithWebIdentity", "response carried no credentials")
        })?;
        let expiration = creds.expiration();
        let expires_at = DateTime::<Utc>::from_timestamp(
            expiration.secs(),
            expiration.subsec_nanos(),
        )
        .ok_or_else(|| CloudError::api("AssumeRoleWithWebIdentity", "invalid expiration"))?;
        debug!(role_arn, %expires_at, "assumed invoker role");

        Ok(Credential {
            access_key_id: creds.access_key_id().to_string(),
            secret_access_key: creds.secret_access_key().to_string(),
            session_token: creds.session_token().to_string(),
            expires_at,
        })
    }
}
