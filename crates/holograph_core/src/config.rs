use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use thiserror::Error;

use crate::log::Logger;
use crate::preprocess::PreprocessorKind;

pub const CONFIG_FILE_NAME: &str = "holograph.yml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file {0} not found")]
    Missing(PathBuf),
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse YAML config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid port '{0}'")]
    InvalidPort(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub title: String,
    pub source: PathBuf,
    pub destination: PathBuf,
    pub documentation_assets: PathBuf,
    pub compat_mode: bool,
    pub dependencies: Vec<PathBuf>,
    pub preprocessor: PreprocessorKind,
    pub build: PathBuf,
    pub main_stylesheet: String,
    pub port: Port,
    pub syntax_highlight: bool,
    pub syntax_theme: String,
    /// Keys this tool does not know about, kept as written.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "Style Guide".to_string(),
            source: PathBuf::from("./components"),
            destination: PathBuf::from("./docs"),
            documentation_assets: PathBuf::from("./templates"),
            compat_mode: false,
            dependencies: vec![PathBuf::from("./build")],
            preprocessor: PreprocessorKind::Minify,
            build: PathBuf::from("./build/css"),
            main_stylesheet: "build/css/screen.css".to_string(),
            port: Port::default(),
            syntax_highlight: false,
            syntax_theme: "GitHub".to_string(),
            extra: BTreeMap::new(),
        }
    }
}

/// Dev server port; YAML may spell it as a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PortRaw")]
pub struct Port(pub String);

impl Default for Port {
    fn default() -> Self {
        Port("3232".to_string())
    }
}

impl Port {
    pub fn number(&self) -> Result<u16, ConfigError> {
        self.0
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidPort(self.0.clone()))
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PortRaw {
    Int(u64),
    String(String),
}

impl From<PortRaw> for Port {
    fn from(value: PortRaw) -> Self {
        match value {
            PortRaw::Int(port) => Port(port.to_string()),
            PortRaw::String(port) => Port(port),
        }
    }
}

impl Config {
    /// Defaults overridden by whatever keys `overrides` sets.
    pub fn from_overrides(overrides: Mapping) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_value(Value::Mapping(overrides))?)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        match serde_yaml::from_str::<Value>(raw)? {
            Value::Null => Ok(Self::default()),
            value => Ok(serde_yaml::from_value(value)?),
        }
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Loads `path`, falling back to defaults when it does not exist.
///
/// With `strict` a missing file is an error instead of a warning.
pub fn load_config(path: &Path, strict: bool, logger: &dyn Logger) -> Result<Config, ConfigError> {
    if !path.exists() {
        if strict {
            return Err(ConfigError::Missing(path.to_path_buf()));
        }
        logger.warning(&format!(
            "Config file '{}' not found, using defaults",
            path.display()
        ));
        return Ok(Config::default());
    }
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Config::from_yaml_str(&raw)
}

/// Default configuration file with every option explained.
pub fn annotated_config() -> String {
    let defaults = Config::default();
    let dependencies = defaults
        .dependencies
        .iter()
        .map(|dep| format!("  - \"{}\"", dep.display()))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "\
# Holograph configuration

# The title for this style guide (shown in the page title of the layout)
title: \"{title}\"

# The directory containing the source files to parse recursively
source: \"{source}\"

# The directory to generate the documentation pages into
destination: \"{destination}\"

# Directory holding the layout template and any asset directories to copy
documentation_assets: \"{assets}\"

# Use header.html and footer.html fragments instead of layout.html
compat_mode: {compat}

# Any other asset directories to copy into the destination
dependencies:
{dependencies}

# Preprocessor applied to the source stylesheets (minify or none)
preprocessor: \"{preprocessor}\"

# Directory to build the final CSS files into
build: \"{build}\"

# The main stylesheet the documentation pages link to
main_stylesheet: \"{main_stylesheet}\"

# Port for the serve and live servers
port: {port}

# Highlight code listings when building instead of in the browser
syntax_highlight: {highlight}

# Theme used for the generated syntax.css when syntax_highlight is on
syntax_theme: \"{theme}\"
",
        title = defaults.title,
        source = defaults.source.display(),
        destination = defaults.destination.display(),
        assets = defaults.documentation_assets.display(),
        compat = defaults.compat_mode,
        preprocessor = "minify",
        build = defaults.build.display(),
        main_stylesheet = defaults.main_stylesheet,
        port = defaults.port.0,
        highlight = defaults.syntax_highlight,
        theme = defaults.syntax_theme,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::MemoryLogger;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.title, "Style Guide");
        assert_eq!(config.source, PathBuf::from("./components"));
        assert_eq!(config.destination, PathBuf::from("./docs"));
        assert_eq!(config.documentation_assets, PathBuf::from("./templates"));
        assert!(!config.compat_mode);
        assert_eq!(config.dependencies, vec![PathBuf::from("./build")]);
        assert_eq!(config.preprocessor, PreprocessorKind::Minify);
        assert_eq!(config.build, PathBuf::from("./build/css"));
        assert_eq!(config.main_stylesheet, "build/css/screen.css");
        assert_eq!(config.port.number().expect("port"), 3232);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let mut overrides = Mapping::new();
        overrides.insert("source".into(), "FFFFFFFFF".into());
        let config = Config::from_overrides(overrides).expect("config");

        let expected = Config {
            source: PathBuf::from("FFFFFFFFF"),
            ..Config::default()
        };
        assert_eq!(config, expected);
    }

    #[test]
    fn unknown_keys_are_preserved() {
        let config = Config::from_yaml_str("title: Docs\ntheme_color: teal\n").expect("config");
        assert_eq!(config.title, "Docs");
        assert_eq!(
            config.extra.get("theme_color"),
            Some(&Value::String("teal".to_string()))
        );
    }

    #[test]
    fn port_accepts_number_or_string() {
        let numeric = Config::from_yaml_str("port: 8000\n").expect("config");
        assert_eq!(numeric.port.number().expect("port"), 8000);
        let text = Config::from_yaml_str("port: \"9000\"\n").expect("config");
        assert_eq!(text.port.number().expect("port"), 9000);
        let bad = Config::from_yaml_str("port: nope\n").expect("config");
        assert!(matches!(bad.port.number(), Err(ConfigError::InvalidPort(_))));
    }

    #[test]
    fn preprocessor_none_parses() {
        let config = Config::from_yaml_str("preprocessor: none\n").expect("config");
        assert_eq!(config.preprocessor, PreprocessorKind::None);
        assert!(Config::from_yaml_str("preprocessor: sass\n").is_err());
    }

    #[test]
    fn empty_document_is_defaults() {
        assert_eq!(Config::from_yaml_str("").expect("config"), Config::default());
    }

    #[test]
    fn annotated_config_round_trips_to_defaults() {
        let text = annotated_config();
        assert!(text.contains("Holograph configuration"));
        assert!(text.contains("Directory to build the final"));
        assert_eq!(Config::from_yaml_str(&text).expect("config"), Config::default());
    }

    #[test]
    fn missing_file_warns_unless_strict() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        let logger = MemoryLogger::new();

        let config = load_config(&path, false, &logger).expect("defaults");
        assert_eq!(config, Config::default());
        assert_eq!(logger.warnings().len(), 1);

        let err = load_config(&path, true, &logger).expect_err("expected error");
        assert!(matches!(err, ConfigError::Missing(_)));
    }

    #[test]
    fn loads_file_from_disk() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "destination: out\ncompat_mode: true\n").unwrap();
        let logger = MemoryLogger::new();
        let config = load_config(&path, true, &logger).expect("config");
        assert_eq!(config.destination, PathBuf::from("out"));
        assert!(config.compat_mode);
        assert!(logger.warnings().is_empty());
    }
}
