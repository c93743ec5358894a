use std::{fs, path::Path};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// store config
    #[serde(default)]
    pub store: StoreConfig,
    /// generation service config
    pub generator: GeneratorConfig,
    /// number of async worker threads, range [1, 32768), defaults to 4
    #[serde(default = "default_worker_threads")]
    pub async_worker_thread_number: u16,
}

fn default_worker_threads() -> u16 {
    4
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    /// store type
    pub store_type: StoreType,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoreType {
    /// Process-local store; other media plug in through `WorkflowStore`.
    #[default]
    Mem,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratorConfig {
    /// base url of the generation service
    pub endpoint: String,
    /// model identifier forwarded with every request
    #[serde(default)]
    pub model: String,
    /// optional bearer token
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            generator: GeneratorConfig {
                endpoint: "http://127.0.0.1:8080".to_string(),
                model: String::new(),
                api_key: None,
            },
            async_worker_thread_number: default_worker_threads(),
        }
    }
}

impl Config {
    pub fn create<T: AsRef<Path>>(path: T) -> Self {
        let data = fs::read_to_string(path.as_ref()).expect(&format!("failed to load config file {:?}", path.as_ref()));

        Self::load_from_str(data.as_str())
    }

    pub fn load_from_str(toml_str: &str) -> Self {
        toml::from_str::<Config>(toml_str).expect("failed to parse the toml str")
    }
}
