use std::path::PathBuf;

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};

use crate::charger::{Charger, ChargerState};

/// Charger that communicates through a JSON file on disk. Useful for testing
/// or as a generic integration point for chargers without a supported
/// transport.
pub struct FileCharger {
    path: PathBuf,
    doc: ChargerFile,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ChargerFile {
    car_connected: bool,
    charging: bool,
    enabled: bool,
}

impl FileCharger {
    pub async fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let doc = match read_doc(&path).await {
            Ok(doc) => {
                tracing::info!("Charger file {} loaded", path.display());
                doc
            }
            Err(_) => {
                let doc = ChargerFile::default();
                write_doc(&path, &doc).await?;
                tracing::info!("Created new charger file {}", path.display());
                doc
            }
        };

        Ok(Self { path, doc })
    }
}

impl Charger for FileCharger {
    async fn state(&mut self) -> Result<ChargerState> {
        self.doc = read_doc(&self.path).await?;

        Ok(if self.doc.charging {
            ChargerState::Charging
        } else if self.doc.car_connected {
            ChargerState::CarConnected
        } else {
            ChargerState::NoCar
        })
    }

    async fn enabled(&mut self) -> Result<bool> {
        self.doc = read_doc(&self.path).await?;
        Ok(self.doc.enabled)
    }

    async fn set_enabled(&mut self, enabled: bool) -> Result<()> {
        self.doc.enabled = enabled;
        write_doc(&self.path, &self.doc).await
    }
}

async fn read_doc(path: &PathBuf) -> Result<ChargerFile> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Error reading charger file {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Error parsing charger file {}", path.display()))
}

async fn write_doc(path: &PathBuf, doc: &ChargerFile) -> Result<()> {
    let content = serde_json::to_string_pretty(doc)?;

    tokio::fs::write(path, content)
        .await
        .with_context(|| format!("Error writing charger file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("filecharger-{}-{}.json", name, std::process::id()))
    }

    #[tokio::test]
    async fn test_creates_file_with_defaults() {
        let path = temp_path("create");
        let _ = tokio::fs::remove_file(&path).await;

        let mut charger = FileCharger::new(&path).await.unwrap();

        assert_eq!(charger.state().await.unwrap(), ChargerState::NoCar);
        assert!(!charger.enabled().await.unwrap());

        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn test_reflects_external_changes() {
        let path = temp_path("external");
        let _ = tokio::fs::remove_file(&path).await;

        let mut charger = FileCharger::new(&path).await.unwrap();

        let doc = ChargerFile {
            car_connected: true,
            charging: true,
            enabled: false,
        };
        write_doc(&path, &doc).await.unwrap();

        assert_eq!(charger.state().await.unwrap(), ChargerState::Charging);

        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn test_set_enabled_round_trips() {
        let path = temp_path("enable");
        let _ = tokio::fs::remove_file(&path).await;

        let mut charger = FileCharger::new(&path).await.unwrap();
        charger.set_enabled(true).await.unwrap();

        let mut reopened = FileCharger::new(&path).await.unwrap();
        assert!(reopened.enabled().await.unwrap());

        let _ = tokio::fs::remove_file(&path).await;
    }
}
