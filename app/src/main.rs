use settings::Settings;

use crate::charger::Charger as _;
use crate::control::{ControlRunner, ControlService};
use crate::optimizer::CheapestTimesOptimizer;
use crate::statistics::StatisticsRepository;

mod api;
mod charger;
mod control;
mod core;
mod costs;
mod optimizer;
mod settings;
mod statistics;

const SHUTDOWN_GRACE: std::time::Duration = std::time::Duration::from_secs(5);

#[tokio::main(flavor = "multi_thread")]
pub async fn main() {
    let settings = Settings::new().expect("Error reading configuration");

    settings
        .monitoring
        .init()
        .expect("Error initializing monitoring");

    let statistics = match &settings.database {
        Some(database) => {
            let pool = database
                .new_pool()
                .await
                .expect("Error initializing database");
            let repository = StatisticsRepository::new(pool);
            repository
                .ensure_schema()
                .await
                .expect("Error preparing statistics schema");
            Some(repository)
        }
        None => None,
    };

    let charger = settings
        .charger
        .build()
        .await
        .expect("Error initializing charger");

    let cost_source = settings
        .cost_source
        .as_ref()
        .map(|cost_source| cost_source.build().expect("Error initializing cost source"));

    let control = &settings.control;
    let service = ControlService::new(
        charger,
        cost_source,
        Some(CheapestTimesOptimizer::new(control.minimum_charging_time)),
        statistics,
        control.optimization_time,
        control.granularity,
    );

    let runner = ControlRunner::new(service, control.check_interval, control.log_interval);
    let control_client = runner.client();
    let cancel = runner.cancellation_token();
    let mut runner_handle = tokio::spawn(runner.run());

    let http_server_exec = {
        let http_server = settings.http_server.clone();
        let client = control_client.clone();

        async move {
            match http_server {
                Some(http_server) => http_server
                    .run_server(move || vec![api::new_routes(client.clone())])
                    .await
                    .expect("HTTP server execution failed"),
                None => std::future::pending::<()>().await,
            }
        }
    };

    tracing::info!("Starting main loop");

    tokio::select!(
        _ = tokio::signal::ctrl_c() => tracing::info!("Shutdown signal received"),
        _ = http_server_exec => {},
    );

    tracing::info!("Shutting down...");
    cancel.cancel();

    match tokio::time::timeout(SHUTDOWN_GRACE, &mut runner_handle).await {
        Ok(_) => tracing::info!("Finished."),
        Err(_) => {
            tracing::info!("Trying again...");
            runner_handle.abort();
            match tokio::time::timeout(SHUTDOWN_GRACE, &mut runner_handle).await {
                Ok(_) => tracing::info!("Finished."),
                Err(_) => tracing::error!("Could not shut down control loop."),
            }
        }
    }

    // leave charger in enabled state
    match settings.charger.build().await {
        Ok(mut charger) => {
            if let Err(e) = charger.set_enabled(true).await {
                tracing::error!("Could not set charger enabled state: {:?}", e);
            }
        }
        Err(e) => tracing::error!("Could not set charger enabled state: {:?}", e),
    }
}
