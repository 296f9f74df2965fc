use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tmdb_api_key: Option<String>,

    /// Optional TMDB `language` parameter, e.g. `en-US`
    #[serde(default)]
    pub tmdb_language: Option<String>,

    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub static_dir: Option<String>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tmdb_api_key: None,
            tmdb_language: None,
            data_dir: default_data_dir(),
            host: default_host(),
            port: default_port(),
            static_dir: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env::<Config>()
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Whether a usable TMDB key is present (placeholder keys are rejected)
    pub fn has_api_key(&self) -> bool {
        self.tmdb_api_key.as_deref().is_some_and(is_usable_api_key)
    }
}

pub fn is_usable_api_key(key: &str) -> bool {
    key.len() > 10 && !key.contains("demo_key")
}
