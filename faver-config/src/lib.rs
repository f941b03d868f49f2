//! Loader for faver configuration with YAML + environment overlays.
//!
//! Sources are merged in this order, later ones winning:
//!
//! 1. built-in defaults (every field has one, so an empty config is valid)
//! 2. YAML files / inline snippets, in the order they were added
//! 3. `FAVER__<SECTION>__<KEY>` environment variables
//!
//! String values may reference `${VAR}` placeholders, expanded after merging.
//!
//! ```yaml
//! http:
//!   timeout_secs: 30
//!   connect_timeout_secs: 5
//!   max_redirects: 10
//!   accept_invalid_certs: false
//! output:
//!   dir: "${HOME}/icons"
//!   extension: ico
//! logging:
//!   format: json
//!   stderr: true
//!   filter: "faver_web=debug,info"
//! ```
use config::{Config, ConfigError, Environment, File, FileFormat};
use faver_common::observability::{LogConfig, LogFormat};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const ENV_PREFIX: &str = "FAVER";
const ENV_SEPARATOR: &str = "__";
const DEFAULT_FILE_NAME: &str = "faver.yaml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FaverConfig {
    pub http: HttpSettings,
    pub output: OutputSettings,
    pub logging: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub max_redirects: usize,
    /// Overrides the client's built-in `faver/<version>` user agent.
    pub user_agent: Option<String>,
    /// Skip TLS certificate validation. Opt-in only.
    pub accept_invalid_certs: bool,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 5,
            max_redirects: 10,
            user_agent: None,
            accept_invalid_certs: false,
        }
    }
}

impl HttpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Directory icons are written into.
    pub dir: PathBuf,
    /// File extension for saved icons, without the dot.
    pub extension: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            extension: "ico".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub format: LogFormat,
    pub stderr: bool,
    /// Default `EnvFilter` directive; `RUST_LOG` still wins when set.
    pub filter: String,
    pub dir: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            stderr: true,
            filter: "info".to_string(),
            dir: None,
        }
    }
}

impl LogSettings {
    /// Translate into the observability layer's init options.
    pub fn to_log_config(&self, app_name: &'static str) -> LogConfig {
        LogConfig {
            app_name,
            log_dir: self.dir.clone(),
            emit_stderr: self.stderr,
            format: self.format,
            default_filter: self.filter.clone(),
        }
    }
}

/// `<config_dir>/faver/faver.yaml`, when the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("faver").join(DEFAULT_FILE_NAME))
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct FaverConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for FaverConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl FaverConfigLoader {
    /// Start from built-in defaults; `FAVER__` env overrides are applied on `load`.
    ///
    /// ```
    /// use faver_config::FaverConfigLoader;
    ///
    /// let config = FaverConfigLoader::new().load().expect("defaults load");
    ///
    /// assert_eq!(config.http.timeout_secs, 30);
    /// assert_eq!(config.output.extension, "ico");
    /// assert!(!config.http.accept_invalid_certs);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file that must exist; format is inferred by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is silently skipped when missing.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Attach [`default_config_path`] as an optional source.
    pub fn with_default_file(self) -> Self {
        match default_config_path() {
            Some(path) => self.with_optional_file(path),
            None => self,
        }
    }

    /// Merge an inline YAML snippet.
    ///
    /// ```
    /// use faver_config::FaverConfigLoader;
    ///
    /// let cfg = FaverConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// http:
    ///   timeout_secs: 3
    /// output:
    ///   extension: png
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.http.timeout_secs, 3);
    /// assert_eq!(cfg.http.connect_timeout_secs, 5);
    /// assert_eq!(cfg.output.extension, "png");
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into typed config.
    ///
    /// ```
    /// use faver_config::FaverConfigLoader;
    ///
    /// unsafe { std::env::set_var("ICON_HOME", "/srv/icons"); }
    ///
    /// let config = FaverConfigLoader::new()
    ///     .with_yaml_str("output:\n  dir: \"${ICON_HOME}/daily\"\n")
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.output.dir, std::path::PathBuf::from("/srv/icons/daily"));
    ///
    /// unsafe { std::env::remove_var("ICON_HOME"); }
    /// ```
    pub fn load(self) -> Result<FaverConfig, ConfigError> {
        // Env values stay strings; `config` coerces them per field type.
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        Config::try_from(&v)?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expands_placeholder_inside_path() {
        temp_env::with_var("FAVER_TEST_ROOT", Some("/tmp/faver"), || {
            let mut v = json!("${FAVER_TEST_ROOT}/icons");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("/tmp/faver/icons"));
        });
    }

    #[test]
    fn expands_nested_sections() {
        temp_env::with_vars(
            [("ICON_EXT", Some("png")), ("UA_NAME", Some("favbot"))],
            || {
                let mut v = json!({
                    "output": { "extension": "$ICON_EXT" },
                    "http": { "user_agent": "${UA_NAME}/1", "timeout_secs": 9 },
                    "tags": ["${ICON_EXT}", false, null]
                });
                expand_env_in_value(&mut v);
                assert_eq!(
                    v,
                    json!({
                        "output": { "extension": "png" },
                        "http": { "user_agent": "favbot/1", "timeout_secs": 9 },
                        "tags": ["png", false, null]
                    })
                );
            },
        );
    }

    #[test]
    fn follows_references_between_variables() {
        temp_env::with_vars(
            [
                ("ICON_BASE", Some("/data")),
                ("ICON_DIR", Some("${ICON_BASE}/favicons")),
            ],
            || {
                let mut v = json!("${ICON_DIR}/today");
                expand_env_in_value(&mut v);
                assert_eq!(v, json!("/data/favicons/today"));
            },
        );
    }

    #[test]
    fn cyclic_references_terminate() {
        temp_env::with_vars([("LOOP_A", Some("${LOOP_B}")), ("LOOP_B", Some("${LOOP_A}"))], || {
            let mut v = json!("dir=${LOOP_A}");
            expand_env_in_value(&mut v);
            let s = v.as_str().unwrap();
            assert!(s.starts_with("dir="));
            assert!(s.contains("${"));
        });
    }

    #[test]
    fn unknown_variables_are_left_alone() {
        let mut v = json!("${FAVER_SURELY_UNSET_VARIABLE}/x");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("${FAVER_SURELY_UNSET_VARIABLE}/x"));
    }

    #[test]
    fn log_settings_map_onto_log_config() {
        let settings = LogSettings {
            format: LogFormat::Json,
            stderr: false,
            filter: "debug".into(),
            dir: Some(PathBuf::from("/var/log/faver")),
        };
        let cfg = settings.to_log_config("faver");
        assert_eq!(cfg.app_name, "faver");
        assert_eq!(cfg.format, LogFormat::Json);
        assert!(!cfg.emit_stderr);
        assert_eq!(cfg.default_filter, "debug");
        assert_eq!(cfg.log_dir, Some(PathBuf::from("/var/log/faver")));
    }

    #[test]
    fn durations_come_from_seconds() {
        let http = HttpSettings {
            timeout_secs: 12,
            connect_timeout_secs: 2,
            ..Default::default()
        };
        assert_eq!(http.timeout(), Duration::from_secs(12));
        assert_eq!(http.connect_timeout(), Duration::from_secs(2));
    }
}
