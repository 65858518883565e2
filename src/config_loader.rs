//! Loading generator options from files.

use std::fs::File;
use std::path::Path;

use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use log::info;
use serde_json::Value;

use crate::parameters::GeneratorOptions;

/// Load generator options from a YAML or JSON file.
///
/// YAML is a superset of JSON, so one parser covers both. The top level
/// must be a mapping.
pub fn load_options(path: &Path) -> Result<GeneratorOptions> {
    info!("Loading generator options from: {:?}", path);

    let file = File::open(path)
        .wrap_err_with(|| format!("Failed to open options file '{}'", path.display()))?;
    let value: Value = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse options file '{}'", path.display()))?;

    match value {
        Value::Object(options) => Ok(options),
        Value::Null => Ok(GeneratorOptions::new()),
        other => Err(eyre!(
            "Options file '{}' must contain a mapping, found: {}",
            path.display(),
            other
        )),
    }
}
