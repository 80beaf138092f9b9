//! `boundary version`

use anyhow::Result;
use serde::Serialize;

use crate::output::{OutputContext, json};

#[derive(Serialize)]
struct VersionInfo {
    name: &'static str,
    version: &'static str,
}

/// Print the CLI version. Works without a config file.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn run(output: &OutputContext) -> Result<()> {
    let info = VersionInfo {
        name: "boundary",
        version: env!("CARGO_PKG_VERSION"),
    };
    if output.json {
        println!("{}", json::format_value(&info)?);
    } else {
        println!("{} {}", info.name, info.version);
    }
    Ok(())
}
