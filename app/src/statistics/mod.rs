use anyhow::Result;
use sqlx::PgPool;

use crate::charger::ChargerState;
use crate::core::time::DateTime;

const TABLE_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS chargelog (
  time              TIMESTAMPTZ       NOT NULL  PRIMARY KEY,
  car_connected     BOOLEAN           NOT NULL,
  charging          BOOLEAN           NOT NULL,
  charging_allowed  BOOLEAN           NOT NULL,
  price             DOUBLE PRECISION  NOT NULL
)"#;

/// Persists the periodically sampled charger state for statistics.
#[derive(Debug, Clone)]
pub struct StatisticsRepository {
    pool: PgPool,
}

impl StatisticsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(TABLE_DDL).execute(&self.pool).await?;
        Ok(())
    }

    /// One sample row; an unknown price is stored as NaN.
    pub async fn log_state(
        &self,
        time: DateTime,
        state: ChargerState,
        charging_allowed: bool,
        price: Option<f64>,
    ) -> Result<()> {
        tracing::debug!(
            "Logging at {}, state={}, charging_allowed={}, price={:?}",
            time,
            state,
            charging_allowed,
            price
        );

        sqlx::query(
            r#"INSERT INTO chargelog (time, car_connected, charging, charging_allowed, price)
               VALUES ($1, $2, $3, $4, $5)"#,
        )
        .bind(time.into_db())
        .bind(state.is_connected())
        .bind(state == ChargerState::Charging)
        .bind(charging_allowed)
        .bind(price.unwrap_or(f64::NAN))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
