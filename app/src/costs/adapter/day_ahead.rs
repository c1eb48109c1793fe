use std::collections::BTreeMap;

use anyhow::{Context as _, Result, bail};
use chrono::{NaiveTime, Timelike as _, Utc};
use chrono_tz::Tz;
use serde::Deserialize;

use crate::core::time::{DateTime, Duration};
use crate::costs::CostSource;
use crate::t;

/// Day-ahead price information from a JSON market-data endpoint. Fetched
/// prices are cached per full hour; the whole local-time day containing a
/// queried instant is fetched at once.
pub struct DayAheadPrices {
    client: reqwest::Client,
    base_url: String,
    timezone: Tz,
    prices: BTreeMap<chrono::DateTime<Utc>, f64>,
    max_cache_size: usize,

    // after a failed fetch, do not retry the same day or an earlier one
    // until the cool-off time has passed
    unavailable_day: Option<chrono::DateTime<Utc>>,
    was_unavailable_at: Option<DateTime>,
    cool_off_time: Duration,
}

#[derive(Debug, Deserialize)]
struct MarketDataDocument {
    data: Vec<MarketDataEntry>,
}

#[derive(Debug, Deserialize)]
struct MarketDataEntry {
    start_timestamp: i64,
    marketprice: f64,
}

impl DayAheadPrices {
    pub fn new(url: &str, timezone: &str) -> Result<Self> {
        let timezone: Tz = timezone
            .parse()
            .ok()
            .with_context(|| format!("Unknown timezone {}", timezone))?;

        tracing::info!("url = {}, timezone = {}", url, timezone);

        Ok(Self {
            client: reqwest::Client::new(),
            base_url: url.trim_end_matches('/').to_owned(),
            timezone,
            prices: BTreeMap::new(),
            max_cache_size: 5000,
            unavailable_day: None,
            was_unavailable_at: None,
            cool_off_time: Duration::minutes(5),
        })
    }

    /// Fetch the prices for the whole local-time day containing `full_hour`
    /// into the cache.
    async fn fetch_costs_at(&mut self, full_hour: chrono::DateTime<Utc>) -> Result<()> {
        if self.prices.len() > self.max_cache_size - 24 {
            self.prices.clear();
        }

        // start and end of the local-time day, in UTC
        let local_date = full_hour.with_timezone(&self.timezone).date_naive();
        let day_start = local_day_start(local_date, self.timezone)?.with_timezone(&Utc);
        let day_end =
            local_day_start(local_date + chrono::Days::new(1), self.timezone)?.with_timezone(&Utc);

        // day-ahead prices do not exist further out than that
        let now_utc = t!(now).into_db().with_timezone(&Utc);
        if full_hour > now_utc + chrono::Duration::days(2) {
            tracing::debug!("Ignored market data request too far in the future");
            return Ok(());
        }

        // if a similar request has failed recently, do not try again now
        if let (Some(unavailable_day), Some(was_unavailable_at)) =
            (self.unavailable_day, self.was_unavailable_at)
        {
            if unavailable_day <= day_start && t!(now) < was_unavailable_at + self.cool_off_time {
                return Ok(());
            }
        }

        self.fetch_costs(day_start, day_end).await
    }

    async fn fetch_costs(
        &mut self,
        start: chrono::DateTime<Utc>,
        end: chrono::DateTime<Utc>,
    ) -> Result<()> {
        tracing::info!("Fetching market data from {} to {}", start, end);

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("start", start.timestamp_millis()),
                ("end", end.timestamp_millis()),
            ])
            .send()
            .await
            .context("Error requesting market data")?;

        if !response.status().is_success() {
            self.unavailable_day = Some(start);
            self.was_unavailable_at = Some(t!(now));
            bail!("Market data server returned HTTP {}", response.status());
        }

        let document: MarketDataDocument = response
            .json()
            .await
            .context("Error parsing market data document")?;

        for entry in document.data {
            if let Some(timestamp) = chrono::DateTime::from_timestamp_millis(entry.start_timestamp)
            {
                self.prices.insert(timestamp, entry.marketprice);
            }
        }

        Ok(())
    }
}

impl CostSource for DayAheadPrices {
    async fn cost_at(&mut self, time: DateTime) -> Result<Option<f64>> {
        let utc = time.into_db().with_timezone(&Utc);
        let full_hour = utc
            .with_minute(0)
            .and_then(|t| t.with_second(0))
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(utc);

        if let Some(price) = self.prices.get(&full_hour) {
            return Ok(Some(*price));
        }

        // price not in cache, get the whole day
        self.fetch_costs_at(full_hour).await?;
        Ok(self.prices.get(&full_hour).copied())
    }
}

fn local_day_start(date: chrono::NaiveDate, timezone: Tz) -> Result<chrono::DateTime<Tz>> {
    date.and_time(NaiveTime::MIN)
        .and_local_timezone(timezone)
        .earliest()
        .with_context(|| format!("No valid start of day for {} in {}", date, timezone))
}
