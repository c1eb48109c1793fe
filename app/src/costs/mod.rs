#![allow(async_fn_in_trait)]

mod adapter;

pub use adapter::average::AveragePrices;
pub use adapter::day_ahead::DayAheadPrices;

use anyhow::Result;

use crate::core::time::DateTime;

/// Supplies the energy cost over time, in EUR/MWh. `Ok(None)` means the cost
/// for that instant is unknown.
pub trait CostSource {
    async fn cost_at(&mut self, time: DateTime) -> Result<Option<f64>>;
}

pub enum AnyCostSource {
    Average(AveragePrices),
    DayAhead(DayAheadPrices),
}

impl CostSource for AnyCostSource {
    async fn cost_at(&mut self, time: DateTime) -> Result<Option<f64>> {
        match self {
            AnyCostSource::Average(source) => source.cost_at(time).await,
            AnyCostSource::DayAhead(source) => source.cost_at(time).await,
        }
    }
}
