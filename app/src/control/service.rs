use anyhow::Result;

use crate::charger::{Charger, ChargerState};
use crate::core::time::{DateTime, Duration};
use crate::core::timeseries::TimeSeries;
use crate::costs::CostSource;
use crate::optimizer::{ChargeSchedule, CostForecast, Optimizer};
use crate::statistics::StatisticsRepository;
use crate::t;

use super::ControlRequest;

/// Owns the whole control state. Only the control loop task calls into this,
/// so every method sees the state without interleaved mutation; external
/// callers go through the request channel.
pub struct ControlService<C, S, O> {
    charger: C,
    cost_source: Option<S>,
    optimizer: Option<O>,
    statistics: Option<StatisticsRepository>,

    optimization_time: Duration,
    granularity: Duration,

    charger_state: ChargerState,
    charger_enabled: bool,
    override_active: bool,
    optim_costs: Option<CostForecast>,
    optim_result: Option<ChargeSchedule>,
    last_state_change: DateTime,
    last_enabled_change: DateTime,
}

#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub car_connected: bool,
    pub charging: bool,
    pub last_state_change: DateTime,
    pub charging_allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charging_allowed_since_or_when: Option<DateTime>,
    #[serde(rename = "override")]
    pub override_active: bool,
    pub costs: Option<f64>,
}

impl<C, S, O> ControlService<C, S, O>
where
    C: Charger,
    S: CostSource,
    O: Optimizer,
{
    pub fn new(
        charger: C,
        cost_source: Option<S>,
        optimizer: Option<O>,
        statistics: Option<StatisticsRepository>,
        optimization_time: Duration,
        granularity: Duration,
    ) -> Self {
        Self {
            charger,
            cost_source,
            optimizer,
            statistics,
            optimization_time,
            granularity,
            charger_state: ChargerState::NoCar,
            charger_enabled: false,
            override_active: false,
            optim_costs: None,
            optim_result: None,
            last_state_change: t!(now),
            last_enabled_change: t!(now),
        }
    }

    /// One control tick: poll the charger, react to connection edges,
    /// sample the schedule and reconcile the enabled bit. Any transport
    /// failure aborts the tick and is retried on the next one.
    pub async fn check_state(&mut self) {
        let previous_state = self.charger_state;
        self.charger_state = match self.charger.state().await {
            Ok(state) => state,
            Err(e) => {
                tracing::error!("Connection problem with charger: {:?}", e);
                return;
            }
        };

        if self.charger_state != previous_state {
            self.last_state_change = t!(now);
        }

        if self.charger_state == ChargerState::Error {
            tracing::error!("Charger in state ERROR");
            return;
        }

        // check for car connection edges
        if !previous_state.is_connected() && self.charger_state.is_connected() {
            tracing::info!("Car connected");
            self.plan_charging().await;
        } else if previous_state.is_connected() && !self.charger_state.is_connected() {
            tracing::info!("Car disconnected");
            self.optim_result = None;
            self.charger_enabled = false;
            self.override_active = false;
        }

        // sample the active schedule, unless overridden
        if self.charger_state.is_connected() && !self.override_active {
            if let Some(schedule) = &self.optim_result {
                self.charger_enabled = *schedule.value_at(t!(now));
            }
        }

        // reconcile the charger's enabled bit with the wanted one
        match self.charger.enabled().await {
            Ok(enabled) if enabled != self.charger_enabled => {
                tracing::info!(
                    "Setting charger to {}",
                    if self.charger_enabled { "enabled" } else { "disabled" }
                );
                match self.charger.set_enabled(self.charger_enabled).await {
                    Ok(()) => self.last_enabled_change = t!(now),
                    Err(e) => tracing::error!("Connection problem with charger: {:?}", e),
                }
            }
            Ok(_) => {}
            Err(e) => tracing::error!("Connection problem with charger: {:?}", e),
        }
    }

    /// Run the optimizer over a fresh cost forecast. Without a configured
    /// optimizer or cost source this quietly does nothing and charging stays
    /// under manual control.
    async fn plan_charging(&mut self) {
        let (Some(optimizer), Some(cost_source)) = (&self.optimizer, &mut self.cost_source) else {
            return;
        };

        let start = t!(now).round_down_to(self.granularity);
        let end = start + self.optimization_time;

        match build_forecast(cost_source, start, self.granularity, end).await {
            Ok(costs) => {
                let result = optimizer.optimize(&costs);
                let entries = result
                    .entries()
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>();
                tracing::info!("Optimization result: [{}]", entries.join(", "));
                self.optim_costs = Some(costs);
                self.optim_result = Some(result);
            }
            Err(e) => {
                tracing::error!("Error building cost forecast, no schedule planned: {:?}", e);
            }
        }
    }

    pub async fn log_state(&mut self) {
        let Some(statistics) = self.statistics.clone() else {
            return;
        };

        let now = t!(now).round_down_to(t!(1 seconds));
        let cost = self.cost_at(now).await;

        // the charger state can be a few seconds old (at most of age check_interval)
        if let Err(e) = statistics
            .log_state(now, self.charger_state, self.charger_enabled, cost)
            .await
        {
            tracing::error!("Error writing statistics: {:?}", e);
        }
    }

    /// Cost at a certain time. If an optimization has been performed, the
    /// cost used in the optimization wins; otherwise the live source is
    /// asked.
    pub async fn cost_at(&mut self, time: DateTime) -> Option<f64> {
        let mut cost = None;

        if self.optim_result.is_some() {
            if let Some(costs) = &self.optim_costs {
                cost = *costs.value_at(time);
            }
        }

        if cost.is_none() {
            if let Some(source) = &mut self.cost_source {
                cost = match source.cost_at(time).await {
                    Ok(cost) => cost,
                    Err(e) => {
                        tracing::warn!("Error getting live cost at {}: {:?}", time, e);
                        None
                    }
                };
            }
        }

        cost
    }

    /// Time of the next planned enabled-state change strictly after
    /// `after_time`, if any entry of the active schedule differs.
    pub fn next_enabled_change(&self, after_time: DateTime) -> Option<DateTime> {
        let schedule = self.optim_result.as_ref()?;
        let enabled = *schedule.value_at(after_time);

        schedule
            .entries()
            .into_iter()
            .find(|entry| entry.timestamp > after_time && entry.value != enabled)
            .map(|entry| entry.timestamp)
    }

    pub async fn handle_request(&mut self, request: ControlRequest) {
        match request {
            ControlRequest::Status { respond_to } => {
                let _ = respond_to.send(self.status().await);
            }
            ControlRequest::SetOverride { active } => self.override_active = active,
            ControlRequest::SetChargingAllowed { allowed } => self.charger_enabled = allowed,
        }
    }

    pub async fn status(&mut self) -> StatusReport {
        let now = t!(now);

        let charging_allowed_since_or_when = if self.charger_enabled {
            Some(self.last_enabled_change)
        } else {
            self.next_enabled_change(now)
        };

        StatusReport {
            car_connected: self.charger_state.is_connected(),
            charging: self.charger_state == ChargerState::Charging,
            last_state_change: self.last_state_change,
            charging_allowed: self.charger_enabled,
            charging_allowed_since_or_when,
            override_active: self.override_active,
            costs: self.cost_at(now).await,
        }
    }
}

async fn build_forecast<S: CostSource>(
    cost_source: &mut S,
    start: DateTime,
    granularity: Duration,
    end: DateTime,
) -> Result<CostForecast> {
    let mut items = Vec::new();

    let mut time = start;
    while time < end {
        let cost = match cost_source.cost_at(time).await {
            Ok(cost) => cost,
            Err(e) => {
                tracing::warn!("No cost forecast for {}: {:?}", time, e);
                None
            }
        };
        items.push(cost);
        time = time + granularity;
    }

    TimeSeries::new(start, granularity, items, None, None)
}
