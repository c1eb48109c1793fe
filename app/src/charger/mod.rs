#![allow(async_fn_in_trait)]

mod adapter;

pub use adapter::file::FileCharger;
pub use adapter::http::HttpCharger;

use anyhow::Result;
use derive_more::Display;

/// State of the charger and its connection to the car.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ChargerState {
    NoCar,
    CarConnected,
    Charging,
    Error,
}

impl ChargerState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ChargerState::CarConnected | ChargerState::Charging)
    }
}

/// The charging device, for example a wallbox charger. The enabled bit is
/// the control surface deciding whether charging is allowed; it is the last
/// accepted command, not an observed physical state.
pub trait Charger {
    async fn state(&mut self) -> Result<ChargerState>;

    async fn enabled(&mut self) -> Result<bool>;

    async fn set_enabled(&mut self, enabled: bool) -> Result<()>;
}

//Trait objects would need boxed futures, so runtime selection goes through
//an enum instead
pub enum AnyCharger {
    File(FileCharger),
    Http(HttpCharger),
}

impl Charger for AnyCharger {
    async fn state(&mut self) -> Result<ChargerState> {
        match self {
            AnyCharger::File(charger) => charger.state().await,
            AnyCharger::Http(charger) => charger.state().await,
        }
    }

    async fn enabled(&mut self) -> Result<bool> {
        match self {
            AnyCharger::File(charger) => charger.enabled().await,
            AnyCharger::Http(charger) => charger.enabled().await,
        }
    }

    async fn set_enabled(&mut self, enabled: bool) -> Result<()> {
        match self {
            AnyCharger::File(charger) => charger.set_enabled(enabled).await,
            AnyCharger::Http(charger) => charger.set_enabled(enabled).await,
        }
    }
}
