use std::path::Path;

use anyhow::Context;
use tapir_core::SandmanConfig;

/// Load `path`, or the built-in reference policy when no path is given.
pub fn load(path: Option<&Path>) -> anyhow::Result<SandmanConfig> {
    match path {
        Some(path) => SandmanConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display())),
        None => Ok(SandmanConfig::default()),
    }
}

pub fn print(path: Option<&Path>) -> anyhow::Result<()> {
    let config = load(path)?;
    print!("{}", config.to_toml_string()?);
    Ok(())
}
