//! Migration configuration.
//!
//! A [`MigrationConfig`] names the two libraries, the namespace identifiers
//! they are bound to, and the table of schema-type constructors that map from
//! one to the other. It is built once before any file is processed and then
//! only read.
//!
//! Every key is optional in the JSON form; missing keys fall back to the
//! Joi-to-Zod defaults:
//!
//! ```json
//! {
//!   "sourceModule": "joi",
//!   "targetModule": "zod",
//!   "sourceNamespace": "Joi",
//!   "targetNamespace": "z",
//!   "schemaTypes": { "string": "string", "number": "number" }
//! }
//! ```

use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;

use crate::error::ConfigError;

pub const DEFAULT_SOURCE_MODULE: &str = "joi";
pub const DEFAULT_TARGET_MODULE: &str = "zod";
pub const DEFAULT_SOURCE_NAMESPACE: &str = "Joi";
pub const DEFAULT_TARGET_NAMESPACE: &str = "z";

/// Schema-type constructors that exist under the same name in both libraries.
pub const DEFAULT_SCHEMA_TYPES: &[&str] = &["string", "number", "boolean", "object", "array", "date"];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct MigrationConfig {
    /// Module specifier of the library being migrated away from.
    pub source_module: String,
    /// Module specifier of the library being migrated to.
    pub target_module: String,
    /// Name the source library is conventionally imported under.
    pub source_namespace: String,
    /// Name the target library's namespace is bound to after migration.
    pub target_namespace: String,
    /// Source schema-type name -> target schema-type name.
    pub schema_types: IndexMap<String, String>,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            source_module: DEFAULT_SOURCE_MODULE.to_string(),
            target_module: DEFAULT_TARGET_MODULE.to_string(),
            source_namespace: DEFAULT_SOURCE_NAMESPACE.to_string(),
            target_namespace: DEFAULT_TARGET_NAMESPACE.to_string(),
            schema_types: DEFAULT_SCHEMA_TYPES
                .iter()
                .map(|name| (name.to_string(), name.to_string()))
                .collect(),
        }
    }
}

impl MigrationConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text, path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source_module.trim().is_empty() {
            return Err(ConfigError::EmptyModule {
                field: "sourceModule",
            });
        }
        if self.target_module.trim().is_empty() {
            return Err(ConfigError::EmptyModule {
                field: "targetModule",
            });
        }
        check_identifier("sourceNamespace", &self.source_namespace)?;
        check_identifier("targetNamespace", &self.target_namespace)?;
        if self.source_namespace == self.target_namespace {
            return Err(ConfigError::SameNamespace(self.source_namespace.clone()));
        }
        for (from, to) in &self.schema_types {
            check_identifier("schemaTypes", from)?;
            check_identifier("schemaTypes", to)?;
        }
        Ok(())
    }

    /// Target name for a source schema-type property, if it is mapped.
    pub fn map_schema_type(&self, name: &str) -> Option<&str> {
        self.schema_types.get(name).map(String::as_str)
    }
}

fn check_identifier(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if is_identifier_name(value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidIdentifier {
            field,
            value: value.to_string(),
        })
    }
}

/// ASCII subset of ECMAScript `IdentifierName`.
pub(crate) fn is_identifier_name(value: &str) -> bool {
    let mut chars = value.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_' || first == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
