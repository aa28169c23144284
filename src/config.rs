use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::errors::IterateError;
use crate::types::{COMMAND_LIST, CommandLine};

pub const DEFAULT_MAAS_URL: &str = "http://172.16.16.2:5240/MAAS";
pub const PROJECT_CONFIG: &str = ".iterate.toml";

/// Settings that can come from a config file. CLI flags and env vars win.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub maas_url: String,
    pub maas_key: Option<String>,
    pub log_dir: PathBuf,
    pub output_log: bool,
    pub debug: bool,
    /// Command strings, in stage order.
    pub commands: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            maas_url: DEFAULT_MAAS_URL.to_string(),
            maas_key: None,
            log_dir: PathBuf::from("log"),
            output_log: true,
            debug: false,
            commands: COMMAND_LIST.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl Config {
    /// Load config with priority: `explicit` > `.iterate.toml` > global > defaults.
    ///
    /// Missing files are skipped; an explicit path must exist and parse.
    pub fn load(explicit: Option<&Path>) -> Result<Self, IterateError> {
        let mut config = Self::default();

        if let Some(path) = global_config_path()
            && path.is_file()
        {
            config = merge(config, load_file(&path)?);
        }

        let project = Path::new(PROJECT_CONFIG);
        if project.is_file() {
            config = merge(config, load_file(project)?);
        }

        if let Some(path) = explicit {
            config = merge(config, load_file(path)?);
        }

        Ok(config)
    }

    pub fn command_lines(&self) -> Vec<CommandLine> {
        self.commands
            .iter()
            .map(|c| CommandLine::from(c.as_str()))
            .collect()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialConfig {
    maas_url: Option<String>,
    maas_key: Option<String>,
    log_dir: Option<PathBuf>,
    output_log: Option<bool>,
    debug: Option<bool>,
    commands: Option<Vec<String>>,
}

fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("iterate").join("config.toml"))
}

fn load_file(path: &Path) -> Result<PartialConfig, IterateError> {
    let content = std::fs::read_to_string(path).map_err(|e| IterateError::ConfigParse {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;
    toml::from_str(&content).map_err(|e| IterateError::ConfigParse {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })
}

fn merge(base: Config, partial: PartialConfig) -> Config {
    Config {
        maas_url: partial.maas_url.unwrap_or(base.maas_url),
        maas_key: partial.maas_key.or(base.maas_key),
        log_dir: partial.log_dir.unwrap_or(base.log_dir),
        output_log: partial.output_log.unwrap_or(base.output_log),
        debug: partial.debug.unwrap_or(base.debug),
        commands: partial.commands.unwrap_or(base.commands),
    }
}
