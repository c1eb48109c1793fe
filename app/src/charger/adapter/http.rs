use anyhow::{Context as _, Result, bail};
use serde::Deserialize;

use crate::charger::{Charger, ChargerState};

/// Wallbox charger with a JSON HTTP interface. The state codes follow the
/// usual wallbox register values: 65 no car, 66 car connected, 67/68
/// charging, everything else is an error state.
pub struct HttpCharger {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct WallboxStatus {
    car_state: u8,
    allow_charging: bool,
}

impl HttpCharger {
    pub fn new(url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: url.trim_end_matches('/').to_owned(),
        }
    }

    async fn fetch_status(&self) -> Result<WallboxStatus> {
        let response = self
            .client
            .get(format!("{}/status", self.base_url))
            .send()
            .await
            .context("Error requesting charger status")?;

        if !response.status().is_success() {
            bail!("Charger returned HTTP {}", response.status());
        }

        response
            .json::<WallboxStatus>()
            .await
            .context("Error parsing charger status")
    }
}

impl Charger for HttpCharger {
    async fn state(&mut self) -> Result<ChargerState> {
        let status = self.fetch_status().await?;

        Ok(match status.car_state {
            65 => ChargerState::NoCar,
            66 => ChargerState::CarConnected,
            67 | 68 => ChargerState::Charging,
            _ => ChargerState::Error,
        })
    }

    async fn enabled(&mut self) -> Result<bool> {
        Ok(self.fetch_status().await?.allow_charging)
    }

    async fn set_enabled(&mut self, enabled: bool) -> Result<()> {
        let response = self
            .client
            .post(format!("{}/allow_charging", self.base_url))
            .json(&serde_json::json!({ "allow": enabled }))
            .send()
            .await
            .context("Error sending charger command")?;

        if !response.status().is_success() {
            bail!("Charger rejected command with HTTP {}", response.status());
        }

        Ok(())
    }
}
