//! Loader for Clout configuration with YAML + environment overlays.
//!
//! Sources are merged in this order, later ones winning:
//!
//! 1. built-in defaults (`llm.api_key = "${OPENAI_API_KEY}"`, OpenAI endpoint,
//!    `gpt-4o-mini`)
//! 2. YAML files or inline snippets added to the loader
//! 3. `CLOUT__`-prefixed environment variables (`CLOUT__LLM__MODEL=...`)
//!
//! `${VAR}` placeholders in any string are expanded after merging. A credential
//! that is blank or still contains an unresolved placeholder counts as absent,
//! which routes every scoring call to the local heuristics.
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const DEFAULT_API_KEY: &str = "${OPENAI_API_KEY}";

#[derive(Debug, Default, Deserialize)]
pub struct CloutConfig {
    #[serde(default)]
    pub llm: LlmSettings,
}

/// Settings for the remote chat completion endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Unset means the outbound request has no timeout.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            endpoint: default_endpoint(),
            timeout_secs: None,
        }
    }
}

impl LlmSettings {
    /// The usable credential, if any.
    ///
    /// ```
    /// use clout_config::LlmSettings;
    ///
    /// let mut settings = LlmSettings::default();
    /// assert!(settings.credential().is_none());
    ///
    /// settings.api_key = Some("${OPENAI_API_KEY}".into());
    /// assert!(settings.credential().is_none());
    ///
    /// settings.api_key = Some(" sk-live ".into());
    /// assert_eq!(settings.credential(), Some("sk-live"));
    /// ```
    pub fn credential(&self) -> Option<&str> {
        let key = self.api_key.as_deref()?.trim();
        if key.is_empty() || key.contains("${") {
            None
        } else {
            Some(key)
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_endpoint() -> String {
    "https://api.openai.com/v1".into()
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

/// Seed `llm.api_key` with the default placeholder when no source set it.
fn apply_credential_default(v: &mut Value) {
    let Value::Object(root) = v else {
        return;
    };
    let llm = root
        .entry("llm")
        .or_insert_with(|| Value::Object(Default::default()));
    if let Value::Object(llm) = llm {
        llm.entry("api_key")
            .or_insert_with(|| Value::String(DEFAULT_API_KEY.into()));
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct CloutConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
    env_prefix: String,
}

impl Default for CloutConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl CloutConfigLoader {
    /// Start with no files; `CLOUT__` environment overrides are applied last.
    ///
    /// ```
    /// use clout_config::CloutConfigLoader;
    ///
    /// let config = CloutConfigLoader::new()
    ///     .with_yaml_str("llm:\n  model: gpt-4o\n")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.llm.model, "gpt-4o");
    /// assert_eq!(config.llm.endpoint, "https://api.openai.com/v1");
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
            env_prefix: "CLOUT".into(),
        }
    }

    /// Use a different environment prefix (tests use this to stay isolated).
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Attach a YAML/TOML/JSON file that must exist.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is skipped when missing, so environment-only setups work.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources.
    ///
    /// ```
    /// use clout_config::CloutConfigLoader;
    ///
    /// unsafe { std::env::set_var("CLOUT_DOC_KEY", "sk-from-env"); }
    ///
    /// let config = CloutConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// llm:
    ///   api_key: "${CLOUT_DOC_KEY}"
    ///   timeout_secs: 12
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.llm.credential(), Some("sk-from-env"));
    /// assert_eq!(config.llm.timeout().unwrap().as_secs(), 12);
    ///
    /// unsafe { std::env::remove_var("CLOUT_DOC_KEY"); }
    /// ```
    pub fn load(self) -> Result<CloutConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix(&self.env_prefix)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        apply_credential_default(&mut v);
        expand_env_in_value(&mut v);

        serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))
    }
}
