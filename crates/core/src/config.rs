//! Project configuration and emitter options.
//!
//! The configuration is a YAML file in the shape of a compiler project config:
//!
//! ```yaml
//! output-dir: generated
//! emit:
//!   - pydantic
//!   - http-api-docs
//! options:
//!   pydantic:
//!     input-module-name: requests
//!     constrain-to-used: true
//!   http-api-docs:
//!     output-file: "{service-name}.md"
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::pydantic::utils::is_python_identifier;

/// An emitter that can be selected in `emit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmitterKind {
    Pydantic,
    HttpApiDocs,
}

impl EmitterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmitterKind::Pydantic => "pydantic",
            EmitterKind::HttpApiDocs => "http-api-docs",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "pydantic" => Some(EmitterKind::Pydantic),
            "http-api-docs" => Some(EmitterKind::HttpApiDocs),
            _ => None,
        }
    }
}

impl fmt::Display for EmitterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options of the pydantic emitter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields, default)]
pub struct PydanticOptions {
    pub input_module_name: String,
    pub output_module_name: String,
    pub roundtrip_module_name: String,
    /// Drop declared types that no operation references instead of putting them
    /// in the roundtrip module.
    pub constrain_to_used: bool,
}

impl Default for PydanticOptions {
    fn default() -> Self {
        Self {
            input_module_name: "input_types".to_string(),
            output_module_name: "output_types".to_string(),
            roundtrip_module_name: "roundtrip_types".to_string(),
            constrain_to_used: false,
        }
    }
}

impl PydanticOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let names = [
            ("input-module-name", &self.input_module_name),
            ("output-module-name", &self.output_module_name),
            ("roundtrip-module-name", &self.roundtrip_module_name),
        ];
        for (option, name) in names {
            if !is_python_identifier(name) {
                return Err(ConfigError::InvalidOption {
                    option,
                    reason: format!("'{name}' is not a valid Python module name"),
                });
            }
        }
        for (i, (option, name)) in names.iter().enumerate() {
            if let Some((other, _)) = names[..i].iter().find(|(_, earlier)| earlier == name) {
                return Err(ConfigError::InvalidOption {
                    option: *option,
                    reason: format!("'{name}' is already used by {other}"),
                });
            }
        }
        Ok(())
    }
}

/// Options of the Markdown API docs emitter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields, default)]
pub struct DocsOptions {
    /// File name template; supports `{service-name}` and `{service-name-if-multiple}`.
    pub output_file: String,
}

impl Default for DocsOptions {
    fn default() -> Self {
        Self {
            output_file: "{service-name}.md".to_string(),
        }
    }
}

impl DocsOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output_file.trim().is_empty() {
            return Err(ConfigError::InvalidOption {
                option: "output-file",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmitterOptions {
    #[serde(default)]
    pub pydantic: PydanticOptions,
    #[serde(default, rename = "http-api-docs")]
    pub http_api_docs: DocsOptions,
}

/// Top-level project configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ProjectConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_emit")]
    pub emit: Vec<EmitterKind>,
    #[serde(default)]
    pub options: EmitterOptions,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("pydemit-output")
}

fn default_emit() -> Vec<EmitterKind> {
    vec![EmitterKind::Pydantic]
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            emit: default_emit(),
            options: EmitterOptions::default(),
        }
    }
}

impl ProjectConfig {
    /// Parse and validate a YAML config.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: ProjectConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&yaml)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.options.pydantic.validate()?;
        self.options.http_api_docs.validate()?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ProjectConfig::from_yaml("{}").unwrap();
        assert_eq!(config, ProjectConfig::default());
        assert_eq!(config.options.pydantic.input_module_name, "input_types");
        assert_eq!(config.options.pydantic.output_module_name, "output_types");
        assert_eq!(config.options.pydantic.roundtrip_module_name, "roundtrip_types");
        assert!(!config.options.pydantic.constrain_to_used);
        assert_eq!(config.options.http_api_docs.output_file, "{service-name}.md");
    }

    #[test]
    fn test_full_config() {
        let config = ProjectConfig::from_yaml(
            r#"
output-dir: out
emit: [pydantic, http-api-docs]
options:
  pydantic:
    input-module-name: requests
    constrain-to-used: true
  http-api-docs:
    output-file: api.md
"#,
        )
        .unwrap();
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.emit, [EmitterKind::Pydantic, EmitterKind::HttpApiDocs]);
        assert_eq!(config.options.pydantic.input_module_name, "requests");
        assert_eq!(config.options.pydantic.output_module_name, "output_types");
        assert!(config.options.pydantic.constrain_to_used);
        assert_eq!(config.options.http_api_docs.output_file, "api.md");
    }

    #[test]
    fn test_rejects_unknown_option() {
        let err = ProjectConfig::from_yaml(
            "options:\n  pydantic:\n    module-prefix: x\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "got: {err}");
    }

    #[test]
    fn test_rejects_invalid_module_name() {
        let err = ProjectConfig::from_yaml(
            "options:\n  pydantic:\n    output-module-name: my-models\n",
        )
        .unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidOption { option: "output-module-name", .. }),
            "got: {err}"
        );

        let err = ProjectConfig::from_yaml(
            "options:\n  pydantic:\n    input-module-name: class\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidOption { .. }), "got: {err}");
    }

    #[test]
    fn test_rejects_shared_module_name() {
        let err = ProjectConfig::from_yaml(
            "options:\n  pydantic:\n    input-module-name: models\n    output-module-name: models\n",
        )
        .unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidOption { option: "output-module-name", .. }),
            "got: {err}"
        );

        // Clashing with a default name counts too.
        let options = PydanticOptions {
            roundtrip_module_name: "input_types".to_string(),
            ..PydanticOptions::default()
        };
        assert!(matches!(
            options.validate(),
            Err(ConfigError::InvalidOption { option: "roundtrip-module-name", .. })
        ));
    }

    #[test]
    fn test_emitter_kind_parse() {
        assert_eq!(EmitterKind::parse("pydantic"), Some(EmitterKind::Pydantic));
        assert_eq!(EmitterKind::parse("http-api-docs"), Some(EmitterKind::HttpApiDocs));
        assert_eq!(EmitterKind::parse("csharp"), None);
        assert_eq!(EmitterKind::HttpApiDocs.to_string(), "http-api-docs");
    }
}
