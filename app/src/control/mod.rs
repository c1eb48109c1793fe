mod service;

pub use service::{ControlService, StatusReport};

use anyhow::{Context as _, Result};
use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::charger::Charger;
use crate::core::time::Duration;
use crate::costs::CostSource;
use crate::optimizer::Optimizer;
use crate::t;

pub enum ControlRequest {
    Status {
        respond_to: oneshot::Sender<StatusReport>,
    },
    SetOverride {
        active: bool,
    },
    SetChargingAllowed {
        allowed: bool,
    },
}

/// Drives the control service: a fixed-delay check tick, a fixed-rate
/// statistics tick aligned to full days, and externally submitted requests,
/// all serialized through one task.
pub struct ControlRunner<C, S, O> {
    service: ControlService<C, S, O>,
    check_interval: Duration,
    log_interval: Duration,
    request_tx: mpsc::Sender<ControlRequest>,
    request_rx: mpsc::Receiver<ControlRequest>,
    cancel: CancellationToken,
}

//Handle for other tasks; all accesses run inside the control loop task
#[derive(Clone)]
pub struct ControlClient {
    request_tx: mpsc::Sender<ControlRequest>,
}

impl<C, S, O> ControlRunner<C, S, O>
where
    C: Charger,
    S: CostSource,
    O: Optimizer,
{
    pub fn new(
        service: ControlService<C, S, O>,
        check_interval: Duration,
        log_interval: Duration,
    ) -> Self {
        let (request_tx, request_rx) = mpsc::channel(16);

        Self {
            service,
            check_interval,
            log_interval,
            request_tx,
            request_rx,
            cancel: CancellationToken::new(),
        }
    }

    pub fn client(&self) -> ControlClient {
        ControlClient {
            request_tx: self.request_tx.clone(),
        }
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub async fn run(mut self) {
        let mut check_timer = tokio::time::interval(self.check_interval.into());
        check_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // let logging intervals coincide with full days
        let now = t!(now);
        let next_log = now.round_down_to(self.log_interval) + self.log_interval;
        let start_offset: std::time::Duration = next_log.elapsed_since(now).into();
        let mut log_timer = tokio::time::interval_at(
            tokio::time::Instant::now() + start_offset,
            self.log_interval.into(),
        );

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = check_timer.tick() => self.service.check_state().await,
                _ = log_timer.tick() => self.service.log_state().await,
                request = self.request_rx.recv() => match request {
                    Some(request) => self.service.handle_request(request).await,
                    None => break,
                },
            }
        }

        tracing::info!("Control loop finished");
    }
}

impl ControlClient {
    pub async fn status(&self) -> Result<StatusReport> {
        let (respond_to, response) = oneshot::channel();

        self.submit(ControlRequest::Status { respond_to }).await?;
        response.await.context("Control loop dropped the request")
    }

    pub async fn set_override(&self, active: bool) -> Result<()> {
        self.submit(ControlRequest::SetOverride { active }).await
    }

    pub async fn set_charging_allowed(&self, allowed: bool) -> Result<()> {
        self.submit(ControlRequest::SetChargingAllowed { allowed }).await
    }

    async fn submit(&self, request: ControlRequest) -> Result<()> {
        self.request_tx
            .send(request)
            .await
            .ok()
            .context("Control loop not available")
    }
}
