use crate::report::OutputFormat;
use crate::sweep::SweepConfig;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tenable_io::{ClientSettings, DEFAULT_HOST, DEFAULT_PORT};
use thiserror::Error;

pub const DEFAULT_HOURS: u64 = 24;
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_CONFIG_FILE: &str = "rolloverscan.yaml";

#[derive(Debug, Default, Deserialize, Clone)]
pub struct TioConfig {
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct SweepFileConfig {
    pub scan_name: Option<String>,
    pub hours: Option<u64>,
    pub format: Option<OutputFormat>,
}

/// Contents of the optional YAML config file.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct FileConfig {
    pub tio: Option<TioConfig>,
    pub sweep: Option<SweepFileConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    Read(PathBuf, std::io::Error),
    #[error("failed to parse config file {0}: {1}")]
    Parse(PathBuf, serde_yaml::Error),
    #[error("no {0} given; pass --{1} or set {2}")]
    MissingKey(&'static str, &'static str, &'static str),
}

/// An explicit path must load; the default file is used only if present.
pub fn load_config(path: Option<&Path>) -> Result<Option<FileConfig>, ConfigError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let p = Path::new(DEFAULT_CONFIG_FILE);
            if p.exists() { p.to_path_buf() } else { return Ok(None); }
        }
    };
    let s = fs::read_to_string(&path).map_err(|e| ConfigError::Read(path.clone(), e))?;
    serde_yaml::from_str(&s).map(Some).map_err(|e| ConfigError::Parse(path, e))
}

/// Values given on the command line or through the environment.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub timeout_ms: Option<u64>,
    pub scan_name: Option<String>,
    pub hours: Option<u64>,
    pub format: Option<OutputFormat>,
}

/// Everything a run needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub client: ClientSettings,
    pub sweep: SweepConfig,
    pub format: OutputFormat,
}

impl Config {
    pub fn resolve(over: Overrides, file: Option<FileConfig>) -> Result<Self, ConfigError> {
        let file = file.unwrap_or_default();
        let tio = file.tio.unwrap_or_default();
        let sw = file.sweep.unwrap_or_default();

        let access_key = non_empty(over.access_key)
            .or(non_empty(tio.access_key))
            .ok_or(ConfigError::MissingKey("access key", "accesskey", "TIO_ACCESS_KEY"))?;
        let secret_key = non_empty(over.secret_key)
            .or(non_empty(tio.secret_key))
            .ok_or(ConfigError::MissingKey("secret key", "secretkey", "TIO_SECRET_KEY"))?;

        Ok(Config {
            client: ClientSettings {
                access_key,
                secret_key,
                host: non_empty(over.host)
                    .or(non_empty(tio.host))
                    .unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port: over.port.or(tio.port).unwrap_or(DEFAULT_PORT),
                timeout_ms: over.timeout_ms.or(tio.timeout_ms).unwrap_or(DEFAULT_TIMEOUT_MS),
            },
            sweep: SweepConfig {
                scan_name: non_empty(over.scan_name).or(non_empty(sw.scan_name)),
                lookback_hours: over.hours.or(sw.hours).unwrap_or(DEFAULT_HOURS),
            },
            format: over.format.or(sw.format).unwrap_or_default(),
        })
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.is_empty())
}

/// Shows only the last four characters of a key.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let keep = chars.len().min(4);
    let tail: String = chars[chars.len() - keep..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - keep), tail)
}
