//! EFS access points as the [`StorageClient`] port.

use std::collections::HashMap;

use aws_config::SdkConfig;
use tracing::debug;

use crate::application::ports::StorageClient;
use crate::domain::{AccessPoint, CloudError};
use crate::infra::aws::{classify, code_ends_with_not_found};

/// Access points of one EFS filesystem.
pub struct EfsStorage {
    client: aws_sdk_efs::Client,
    file_system_id: String,
}

impl EfsStorage {
    #[must_use]
    pub fn new(config: &SdkConfig, file_system_id: impl Into<String>) -> Self {
        Self {
            client: aws_sdk_efs::Client::new(config),
            file_system_id: file_system_id.into(),
        }
    }
}

impl StorageClient for EfsStorage {
    async fn list_access_points(&self) -> Result<Vec<AccessPoint>, CloudError> {
        let mut access_points = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let resp = self
                .client
                .describe_access_points()
                .file_system_id(&self.file_system_id)
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| {
                    classify(
                        "DescribeAccessPoints",
                        &self.file_system_id,
                        &e,
                        code_ends_with_not_found,
                    )
                })?;

            for ap in resp.access_points() {
                let Some(id) = ap.access_point_id() else {
                    continue;
                };
                let path = ap
                    .root_directory()
                    .and_then(|root| root.path())
                    .unwrap_or("/")
                    .to_string();
                let tags: HashMap<String, String> = ap
                    .tags()
                    .iter()
                    .map(|t| (t.key().to_string(), t.value().to_string()))
                    .collect();
                access_points.push(AccessPoint {
                    id: id.to_string(),
                    path,
                    tags,
                });
            }

            match resp.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }
        debug!(
            file_system_id = %self.file_system_id,
            count = access_points.len(),
            "described access points"
        );
        Ok(access_points)
    }

    async fn delete_access_point(&self, access_point_id: &str) -> Result<(), CloudError> {
        self.client
            .delete_access_point()
            .access_point_id(access_point_id)
            .send()
            .await
            .map_err(|e| {
                classify(
                    "DeleteAccessPoint",
                    &format!("access point {access_point_id}"),
                    &e,
                    code_ends_with_not_found,
                )
            })?;
        debug!(access_point_id, "deleted access point");
        Ok(())
    }
}
