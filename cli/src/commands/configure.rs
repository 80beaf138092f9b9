//! `boundary configure`: interactive configuration.

use anyhow::Result;
use dialoguer::Input;

use crate::app::AppContext;
use crate::application::ports::ConfigStore;

/// Prompted keys and their labels. Timing keys are left to the file or env.
const PROMPTS: &[(&str, &str)] = &[
    ("keycloak_url", "Keycloak URL (required)"),
    ("keycloak_realm", "Keycloak realm"),
    ("oidc_client_id", "OIDC client ID"),
    ("lambda_function_name", "Lambda function name"),
    ("lambda_url", "Lambda function URL (used when no function name is set)"),
    ("invoker_role_arn", "Invoker role ARN (required)"),
    ("aws_region", "AWS region"),
    ("cluster_name", "ECS cluster name"),
    ("efs_filesystem_id", "EFS filesystem ID (required to close investigations)"),
];

/// Run `configure`. Current values are offered as defaults; Enter keeps them.
///
/// # Errors
///
/// Returns an error if the terminal prompt fails or the file cannot be
/// written.
pub fn run(app: &AppContext) -> Result<()> {
    // Environment overrides are not persisted.
    let mut config = app.config_store.load()?;

    for (key, label) in PROMPTS {
        loop {
            let current = config.get(key).unwrap_or_default();
            let mut input = Input::<String>::new().with_prompt(*label).allow_empty(true);
            if !current.is_empty() {
                input = input.default(current);
            }
            let value = input.interact_text()?;
            match config.set(key, &value) {
                Ok(()) => break,
                Err(e) => app.output.error(&e.to_string()),
            }
        }
    }

    app.config_store.save(&config)?;
    let path = app.config_store.path()?;
    app.output
        .success(&format!("Configuration saved to {}", path.display()));
    app.emit(&config, |r| r.render_config(&config, &path))
}
