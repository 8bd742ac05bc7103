//! store.rs
//!
//! Saved descriptor lists. The scene core never touches this; the editing
//! side saves the active list and feeds loaded lists back in as a new
//! `BodyList`.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use reqwest::header::USER_AGENT;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{StoreBackend, StoreConfig};
use crate::systems::bodies::BodyDescriptor;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("no bodies to save")]
    NothingToSave,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("store runtime unavailable: {0}")]
    Runtime(String),
}

/// One saved descriptor list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedConfiguration {
    pub planets: Vec<BodyDescriptor>,
    pub saved_at: DateTime<Utc>,
}

impl SavedConfiguration {
    pub fn now(planets: &[BodyDescriptor]) -> Self {
        Self {
            planets: planets.to_vec(),
            saved_at: Utc::now(),
        }
    }
}

/// Configured persistence backend
#[derive(Debug, Clone)]
pub enum ConfigurationStore {
    File(FileStore),
    Remote(RemoteStore),
}

impl ConfigurationStore {
    pub fn from_config(config: &StoreConfig) -> Self {
        match config.backend {
            StoreBackend::File => Self::File(FileStore::new(config.path.clone())),
            StoreBackend::Remote => Self::Remote(RemoteStore::new(&config.endpoint, &config.collection)),
        }
    }

    pub async fn save(&self, planets: &[BodyDescriptor]) -> Result<(), StoreError> {
        if planets.is_empty() {
            return Err(StoreError::NothingToSave);
        }
        let entry = SavedConfiguration::now(planets);
        match self {
            Self::File(store) => store.save(entry).await,
            Self::Remote(store) => store.save(entry).await,
        }
    }

    /// All saved configurations, most recent first
    pub async fn load(&self) -> Result<Vec<SavedConfiguration>, StoreError> {
        let mut saved = match self {
            Self::File(store) => store.load().await?,
            Self::Remote(store) => store.load().await?,
        };
        // stores append, so reversing first keeps same-instant saves newest first
        saved.reverse();
        saved.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        Ok(saved)
    }
}

/// JSON array of saved configurations on local disk
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    async fn save(&self, entry: SavedConfiguration) -> Result<(), StoreError> {
        let mut saved = self.load().await?;
        saved.push(entry);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(&saved)?;
        tokio::fs::write(&self.path, content).await?;

        info!(path = %self.path.display(), entries = saved.len(), "Saved configuration");
        Ok(())
    }

    async fn load(&self) -> Result<Vec<SavedConfiguration>, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No saved configurations yet");
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Document collection behind a REST endpoint:
/// `POST {endpoint}/{collection}` adds a document, `GET` lists them
#[derive(Debug, Clone)]
pub struct RemoteStore {
    client: reqwest::Client,
    url: String,
}

impl RemoteStore {
    pub fn new(endpoint: &str, collection: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: collection_url(endpoint, collection),
        }
    }

    async fn save(&self, entry: SavedConfiguration) -> Result<(), StoreError> {
        self.client
            .post(&self.url)
            .header(USER_AGENT, "orrery")
            .json(&entry)
            .send()
            .await?
            .error_for_status()?;

        info!(url = %self.url, "Saved configuration");
        Ok(())
    }

    async fn load(&self) -> Result<Vec<SavedConfiguration>, StoreError> {
        let saved = self
            .client
            .get(&self.url)
            .header(USER_AGENT, "orrery")
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<SavedConfiguration>>()
            .await?;

        debug!(url = %self.url, entries = saved.len(), "Fetched saved configurations");
        Ok(saved)
    }
}

fn collection_url(endpoint: &str, collection: &str) -> String {
    format!(
        "{}/{}",
        endpoint.trim_end_matches('/'),
        collection.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    use crate::config::default_bodies;

    #[test]
    fn test_collection_url() {
        assert_eq!(
            collection_url("https://docs.example.com/v1/", "/solarSystems"),
            "https://docs.example.com/v1/solarSystems"
        );
        assert_eq!(collection_url("http://localhost:8080", "saves"), "http://localhost:8080/saves");
    }

    #[test]
    fn test_from_config() {
        let mut config = StoreConfig::default();
        assert!(matches!(ConfigurationStore::from_config(&config), ConfigurationStore::File(_)));

        config.backend = StoreBackend::Remote;
        match ConfigurationStore::from_config(&config) {
            ConfigurationStore::Remote(store) => assert_eq!(store.url, "http://127.0.0.1:8080/solarSystems"),
            other => panic!("expected remote store, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = ConfigurationStore::File(FileStore::new(temp_dir.path().join("saves/orrery.json")));

        assert!(store.load().await.unwrap().is_empty());

        let bodies = default_bodies();
        store.save(&bodies[..2]).await.unwrap();
        store.save(&bodies).await.unwrap();

        let saved = store.load().await.unwrap();
        assert_eq!(saved.len(), 2);
        // most recent first
        assert_eq!(saved[0].planets, bodies);
        assert_eq!(saved[1].planets.len(), 2);
        assert!(saved[0].saved_at >= saved[1].saved_at);
    }

    #[tokio::test]
    async fn test_empty_list_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let store = ConfigurationStore::File(FileStore::new(temp_dir.path().join("orrery.json")));

        assert!(matches!(store.save(&[]).await, Err(StoreError::NothingToSave)));
        assert!(!temp_dir.path().join("orrery.json").exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("orrery.json");
        std::fs::write(&path, "{ not json").unwrap();
        let store = ConfigurationStore::File(FileStore::new(path));

        assert!(matches!(store.load().await, Err(StoreError::Json(_))));
    }

    #[tokio::test]
    async fn test_null_numbers_load_as_zero() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("orrery.json");
        std::fs::write(
            &path,
            r#"[{"planets":[{"name":"Earth","size":4,"speed":null,"distance":22}],"saved_at":"2025-01-01T12:00:00Z"}]"#,
        )
        .unwrap();
        let store = ConfigurationStore::File(FileStore::new(path));

        let saved = store.load().await.unwrap();
        assert_eq!(saved[0].planets, vec![BodyDescriptor::new("Earth", 4.0, None, 0.0, 22.0)]);
    }

    #[tokio::test]
    async fn test_nan_saves_and_loads_back() {
        let temp_dir = TempDir::new().unwrap();
        let store = ConfigurationStore::File(FileStore::new(temp_dir.path().join("orrery.json")));

        store
            .save(&[BodyDescriptor::new("Drift", 2.0, None, f32::NAN, 30.0)])
            .await
            .unwrap();

        let saved = store.load().await.unwrap();
        assert_eq!(saved[0].planets[0].speed, 0.0);
        assert_eq!(saved[0].planets[0].distance, 30.0);
    }

    #[test]
    fn test_saved_configuration_format() {
        let json = r##"[{"planets":[{"name":"Earth","size":4,"color":"#3357ff","speed":0.6,"distance":22}],"saved_at":"2025-01-01T12:00:00Z"}]"##;
        let saved: Vec<SavedConfiguration> = serde_json::from_str(json).unwrap();

        assert_eq!(saved[0].planets[0], BodyDescriptor::new("Earth", 4.0, Some("#3357ff"), 0.6, 22.0));
    }
}
