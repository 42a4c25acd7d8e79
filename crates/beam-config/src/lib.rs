//! Configuration management for beam.
//!
//! Parses `beam.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "beam.toml";

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override Kroki URL (switches the renderer to kroki mode).
    pub kroki_url: Option<String>,
    /// Override the mmdc binary path.
    pub mmdc_path: Option<PathBuf>,
}

/// Configuration load error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("renderer mode is 'kroki' but no kroki_url is configured")]
    MissingKrokiUrl,
}

/// Which rendering backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererMode {
    /// External mermaid CLI with temp-file handoff.
    #[default]
    Mmdc,
    /// Kroki rendering service over HTTP.
    Kroki,
}

/// `[server]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 3456,
        }
    }
}

/// `[renderer]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RendererSection {
    /// Rendering backend.
    pub mode: RendererMode,
    /// Kroki server URL (required when mode is `kroki`).
    pub kroki_url: Option<String>,
    /// Path to the mmdc binary.
    pub mmdc_path: PathBuf,
    /// HTTP timeout for the kroki backend, in seconds.
    pub timeout_secs: u64,
}

impl Default for RendererSection {
    fn default() -> Self {
        Self {
            mode: RendererMode::Mmdc,
            kroki_url: None,
            mmdc_path: PathBuf::from("mmdc"),
            timeout_secs: 30,
        }
    }
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerSection,
    /// Renderer configuration.
    pub renderer: RendererSection,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration.
    ///
    /// With an explicit path, that file must exist. Otherwise `beam.toml` is
    /// discovered by walking up from the current directory; when none is
    /// found, defaults apply. CLI settings override file values last.
    pub fn load(
        explicit_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let path = match explicit_path {
            Some(path) => {
                if !path.is_file() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                Some(path.to_path_buf())
            }
            None => discover_config_file(),
        };

        let mut config = match &path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.config_path = path;

        if let Some(cli) = cli_settings {
            config.apply_cli_settings(cli);
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse a config file.
    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn apply_cli_settings(&mut self, cli: &CliSettings) {
        if let Some(host) = &cli.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = cli.port {
            self.server.port = port;
        }
        if let Some(kroki_url) = &cli.kroki_url {
            self.renderer.kroki_url = Some(kroki_url.clone());
            self.renderer.mode = RendererMode::Kroki;
        }
        if let Some(mmdc_path) = &cli.mmdc_path {
            self.renderer.mmdc_path.clone_from(mmdc_path);
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.renderer.mode == RendererMode::Kroki && self.renderer.kroki_url.is_none() {
            return Err(ConfigError::MissingKrokiUrl);
        }
        Ok(())
    }
}

/// Walk up from the current directory looking for `beam.toml`.
fn discover_config_file() -> Option<PathBuf> {
    let mut dir = std::env::current_dir().ok()?;
    loop {
        let candidate = dir.join(CONFIG_FILENAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}
