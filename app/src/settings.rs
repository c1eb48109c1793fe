use config::{Config, ConfigError, Environment, File};
use infrastructure::{DatabaseConfig, HttpServerConfig, MonitoringConfig};
use serde::Deserialize;

use crate::charger::{AnyCharger, FileCharger, HttpCharger};
use crate::core::time::Duration;
use crate::costs::{AnyCostSource, AveragePrices, DayAheadPrices};

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub monitoring: MonitoringConfig,
    pub database: Option<DatabaseConfig>,
    pub http_server: Option<HttpServerConfig>,
    #[serde(default = "default_charger")]
    pub charger: ChargerSettings,
    pub cost_source: Option<CostSourceSettings>,
    #[serde(default)]
    pub control: ControlSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name("config.toml"))
            .add_source(Environment::default().separator("_").list_separator(","));

        let s = builder.build()?;
        s.try_deserialize()
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChargerSettings {
    File {
        #[serde(default = "default_charger_file")]
        path: String,
    },
    Http {
        url: String,
    },
}

impl ChargerSettings {
    pub async fn build(&self) -> anyhow::Result<AnyCharger> {
        Ok(match self {
            ChargerSettings::File { path } => AnyCharger::File(FileCharger::new(path).await?),
            ChargerSettings::Http { url } => AnyCharger::Http(HttpCharger::new(url)),
        })
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CostSourceSettings {
    Average {
        #[serde(default = "default_area")]
        area: String,
        #[serde(default = "default_timezone")]
        timezone: String,
    },
    DayAhead {
        url: String,
        #[serde(default = "default_timezone")]
        timezone: String,
    },
}

impl CostSourceSettings {
    pub fn build(&self) -> anyhow::Result<AnyCostSource> {
        Ok(match self {
            CostSourceSettings::Average { area, timezone } => {
                AnyCostSource::Average(AveragePrices::new(area, timezone)?)
            }
            CostSourceSettings::DayAhead { url, timezone } => {
                AnyCostSource::DayAhead(DayAheadPrices::new(url, timezone)?)
            }
        })
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ControlSettings {
    #[serde(default = "default_check_interval")]
    pub check_interval: Duration,
    #[serde(default = "default_log_interval")]
    pub log_interval: Duration,
    #[serde(default = "default_optimization_time")]
    pub optimization_time: Duration,
    #[serde(default = "default_granularity")]
    pub granularity: Duration,
    #[serde(default = "default_minimum_charging_time")]
    pub minimum_charging_time: Duration,
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            check_interval: default_check_interval(),
            log_interval: default_log_interval(),
            optimization_time: default_optimization_time(),
            granularity: default_granularity(),
            minimum_charging_time: default_minimum_charging_time(),
        }
    }
}

fn default_charger() -> ChargerSettings {
    ChargerSettings::File {
        path: default_charger_file(),
    }
}

fn default_charger_file() -> String {
    "/tmp/filecharger.json".to_owned()
}

fn default_area() -> String {
    //Germany
    "10Y1001A1001A82H".to_owned()
}

fn default_timezone() -> String {
    "Europe/Berlin".to_owned()
}

fn default_check_interval() -> Duration {
    Duration::seconds(5)
}

fn default_log_interval() -> Duration {
    Duration::seconds(60)
}

fn default_optimization_time() -> Duration {
    Duration::hours(8)
}

fn default_granularity() -> Duration {
    Duration::minutes(5)
}

fn default_minimum_charging_time() -> Duration {
    Duration::hours(3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_defaults() {
        let control = ControlSettings::default();

        assert_eq!(control.check_interval, Duration::seconds(5));
        assert_eq!(control.log_interval, Duration::seconds(60));
        assert_eq!(control.optimization_time, Duration::hours(8));
        assert_eq!(control.granularity, Duration::minutes(5));
        assert_eq!(control.minimum_charging_time, Duration::hours(3));
    }

    #[test]
    fn test_charger_settings_tagged_by_type() {
        let charger: ChargerSettings =
            serde_json::from_value(serde_json::json!({"type": "http", "url": "http://wallbox"}))
                .unwrap();
        assert!(matches!(charger, ChargerSettings::Http { .. }));

        let charger: ChargerSettings =
            serde_json::from_value(serde_json::json!({"type": "file"})).unwrap();
        assert!(matches!(charger, ChargerSettings::File { .. }));
    }

    #[test]
    fn test_control_durations_from_iso_strings() {
        let control: ControlSettings = serde_json::from_value(serde_json::json!({
            "check_interval": "PT10S",
            "log_interval": "PT2M",
            "optimization_time": "PT6H",
            "granularity": "PT15M",
            "minimum_charging_time": "PT2H30M",
        }))
        .unwrap();

        assert_eq!(control.check_interval, Duration::seconds(10));
        assert_eq!(control.log_interval, Duration::minutes(2));
        assert_eq!(control.optimization_time, Duration::hours(6));
        assert_eq!(control.granularity, Duration::minutes(15));
        assert_eq!(
            control.minimum_charging_time,
            Duration::hours(2) + Duration::minutes(30)
        );
    }
}
