mod cheapest_times;

pub use cheapest_times::CheapestTimesOptimizer;

use crate::core::timeseries::TimeSeries;

/// Forecast of energy cost per slot. `None` means no forecast is available
/// for that slot; outside the fetched horizon the cost is always unknown.
pub type CostForecast = TimeSeries<Option<f64>>;

/// Plan of slots in which charging is allowed. Before the planned horizon
/// charging is disallowed, after it the plan fails open.
pub type ChargeSchedule = TimeSeries<bool>;

/// Turns a cost forecast into a charging plan over the same horizon.
pub trait Optimizer {
    fn optimize(&self, costs: &CostForecast) -> ChargeSchedule;
}
