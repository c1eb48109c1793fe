use crate::core::time::Duration;
use crate::core::timeseries::TimeSeries;

use super::{ChargeSchedule, CostForecast, Optimizer};

/// Stands in for slots without a forecast. Larger than any real cost, so
/// unknown slots are picked last but stay eligible.
const UNKNOWN_COST: f64 = f64::INFINITY;

/// Guarantees a minimum charging time and distributes it to the cheapest
/// slots. Once the minimum charging time has been reached, charging stays
/// enabled for the rest of the horizon.
pub struct CheapestTimesOptimizer {
    minimum_charging_time: Duration,
}

impl CheapestTimesOptimizer {
    pub fn new(minimum_charging_time: Duration) -> Self {
        Self { minimum_charging_time }
    }
}

impl Optimizer for CheapestTimesOptimizer {
    fn optimize(&self, costs: &CostForecast) -> ChargeSchedule {
        let costs = costs.unknowns_replaced(UNKNOWN_COST);

        let mut slots_needed = self.minimum_charging_time.div_ceil(costs.granularity()) as usize;
        if slots_needed > costs.len() {
            tracing::warn!(
                "Minimum charging time {} does not fit into the {}-slot horizon, enabling all of it",
                self.minimum_charging_time.to_iso_string(),
                costs.len()
            );
            slots_needed = costs.len();
        }

        // cost of the slots_needed-th cheapest slot; stable sort keeps
        // equal-cost slots in chronological order
        let mut by_cost = costs.entries();
        by_cost.sort_by(|a, b| a.value.total_cmp(&b.value));
        let max_cost = if slots_needed == 0 {
            f64::NEG_INFINITY
        } else {
            by_cost[slots_needed - 1].value
        };

        // enable all slots at or below max_cost and everything after the
        // minimum charging time has been reached
        let mut enabled = Vec::with_capacity(costs.len());
        let mut count = 0;
        for entry in costs.entries() {
            if entry.value <= max_cost || count >= slots_needed {
                count += 1;
                enabled.push(true);
            } else {
                enabled.push(false);
            }
        }

        TimeSeries::new(costs.start(), costs.granularity(), enabled, false, true)
            .expect("Internal error: granularity of an existing series must be valid")
    }
}
