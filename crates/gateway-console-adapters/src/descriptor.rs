use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing::debug;

use gateway_console_core::{DescriptorPort, PortError};

use crate::ConsoleAdapterConfig;

/// Serves `*.network.json` files from a directory, an HTTP base URL or
/// memory.
#[derive(Debug, Clone)]
pub struct DescriptorAdapter {
    source: DescriptorSource,
    fetched: Arc<Mutex<Vec<String>>>,
}

#[derive(Debug, Clone)]
enum DescriptorSource {
    Directory(PathBuf),
    Http {
        base_url: String,
        client: reqwest::blocking::Client,
    },
    InMemory(BTreeMap<String, String>),
}

impl DescriptorAdapter {
    pub fn from_config(config: &ConsoleAdapterConfig) -> Result<Self, PortError> {
        let base = config.descriptor_base.as_str();
        if base.starts_with("http://") || base.starts_with("https://") {
            Self::http(base)
        } else {
            Ok(Self::directory(base))
        }
    }

    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self::with_source(DescriptorSource::Directory(path.into()))
    }

    pub fn http(base_url: impl Into<String>) -> Result<Self, PortError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(None)
            .build()
            .map_err(|e| PortError::Transport(format!("failed to build descriptor client: {e}")))?;
        Ok(Self::with_source(DescriptorSource::Http {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            client,
        }))
    }

    pub fn in_memory(files: impl IntoIterator<Item = (String, String)>) -> Self {
        Self::with_source(DescriptorSource::InMemory(files.into_iter().collect()))
    }

    fn with_source(source: DescriptorSource) -> Self {
        Self {
            source,
            fetched: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// File names requested so far, in order.
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().map(|g| g.clone()).unwrap_or_default()
    }
}

impl DescriptorPort for DescriptorAdapter {
    fn fetch(&self, file_name: &str) -> Result<String, PortError> {
        if let Ok(mut g) = self.fetched.lock() {
            g.push(file_name.to_owned());
        }
        debug!(file_name, "fetching network descriptor");

        match &self.source {
            DescriptorSource::Directory(dir) => {
                let path = dir.join(file_name);
                std::fs::read_to_string(&path).map_err(|e| match e.kind() {
                    std::io::ErrorKind::NotFound => {
                        PortError::NotFound(format!("{}", path.display()))
                    }
                    _ => PortError::Transport(format!("read {} failed: {e}", path.display())),
                })
            }
            DescriptorSource::Http { base_url, client } => {
                let url = format!("{base_url}/{file_name}");
                let response = client
                    .get(&url)
                    .send()
                    .map_err(|e| PortError::Transport(format!("GET {url} failed: {e}")))?;
                let status = response.status();
                if status == reqwest::StatusCode::NOT_FOUND {
                    return Err(PortError::NotFound(url));
                }
                if !status.is_success() {
                    return Err(PortError::Transport(format!("GET {url} returned {status}")));
                }
                response
                    .text()
                    .map_err(|e| PortError::Transport(format!("read body of {url} failed: {e}")))
            }
            DescriptorSource::InMemory(files) => files
                .get(file_name)
                .cloned()
                .ok_or_else(|| PortError::NotFound(file_name.to_owned())),
        }
    }
}
