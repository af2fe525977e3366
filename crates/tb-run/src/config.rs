//! Configuration loading.

use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};
use tb_core::errors::{ErrorInfo, TbError};
use tb_phys::SimulationConfig;

/// Configuration file as read from disk.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Where the file was read from.
    pub path: PathBuf,
    /// Verbatim contents, copied into the run directory.
    pub text: String,
    /// Parsed root mapping.
    pub raw: Mapping,
}

impl LoadedConfig {
    /// Typed view of the raw mapping.
    pub fn parse(&self) -> Result<SimulationConfig, TbError> {
        serde_yaml::from_value(Value::Mapping(self.raw.clone())).map_err(|err| {
            TbError::Serde(
                ErrorInfo::new("tb_run.config_schema", err.to_string())
                    .with_context("path", self.path.display().to_string()),
            )
        })
    }
}

/// Reads `path` and requires a non-empty YAML mapping at the root.
pub fn load_raw(path: &Path) -> Result<LoadedConfig, TbError> {
    let text = fs::read_to_string(path).map_err(|err| {
        TbError::Io(
            ErrorInfo::new("tb_run.config_read", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })?;
    if text.trim().is_empty() {
        return Err(empty_config(path));
    }
    let value: Value = serde_yaml::from_str(&text).map_err(|err| {
        TbError::Serde(
            ErrorInfo::new("tb_run.config_parse", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })?;
    let raw = match value {
        Value::Null => return Err(empty_config(path)),
        Value::Mapping(map) if map.is_empty() => return Err(empty_config(path)),
        Value::Mapping(map) => map,
        other => {
            return Err(TbError::Validation(
                ErrorInfo::new("tb_run.config_root", "config root must be a mapping")
                    .with_context("path", path.display().to_string())
                    .with_context("found", value_kind(&other)),
            ))
        }
    };
    Ok(LoadedConfig {
        path: path.to_path_buf(),
        text,
        raw,
    })
}

fn empty_config(path: &Path) -> TbError {
    TbError::Validation(
        ErrorInfo::new("tb_run.config_empty", "empty config")
            .with_context("path", path.display().to_string()),
    )
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged",
    }
}
