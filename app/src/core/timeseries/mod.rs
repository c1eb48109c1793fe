pub mod datapoint;

pub use datapoint::DataPoint;

use anyhow::{Result, ensure};

use crate::core::time::{DateTime, Duration};

/// Evenly-spaced time series. `items[i]` holds for the half-open slot
/// `[start + i*granularity, start + (i+1)*granularity)`. Queries before
/// `start` yield `before`, queries at or past the end yield `after`, so
/// lookup is total over the whole timeline.
#[derive(Debug, Clone)]
pub struct TimeSeries<T> {
    start: DateTime,
    granularity: Duration,
    items: Vec<T>,
    before: T,
    after: T,
}

impl<T> TimeSeries<T> {
    pub fn new(
        start: DateTime,
        granularity: Duration,
        items: Vec<T>,
        before: T,
        after: T,
    ) -> Result<Self> {
        ensure!(
            granularity.is_positive(),
            "granularity must be positive, got {}",
            granularity.to_iso_string()
        );

        Ok(Self {
            start,
            granularity,
            items,
            before,
            after,
        })
    }

    /// Build a series by sampling `f` at every slot start in `[start, end)`.
    pub fn sample(
        start: DateTime,
        granularity: Duration,
        end: DateTime,
        f: impl Fn(DateTime) -> T,
        before: T,
        after: T,
    ) -> Result<Self> {
        ensure!(
            granularity.is_positive(),
            "granularity must be positive, got {}",
            granularity.to_iso_string()
        );

        let mut items = Vec::new();
        let mut time = start;
        while time < end {
            items.push(f(time));
            time = time + granularity;
        }

        Self::new(start, granularity, items, before, after)
    }

    pub fn value_at(&self, at: DateTime) -> &T {
        if at < self.start {
            return &self.before;
        }

        let pos = at.elapsed_since(self.start) / self.granularity;
        if pos as usize >= self.items.len() {
            &self.after
        } else {
            &self.items[pos as usize]
        }
    }

    pub fn start(&self) -> DateTime {
        self.start
    }

    pub fn end(&self) -> DateTime {
        self.start + self.granularity * self.items.len() as i64
    }

    pub fn granularity(&self) -> Duration {
        self.granularity
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn map<U>(&self, f: impl Fn(&T) -> U) -> TimeSeries<U> {
        TimeSeries {
            start: self.start,
            granularity: self.granularity,
            items: self.items.iter().map(&f).collect(),
            before: f(&self.before),
            after: f(&self.after),
        }
    }
}

impl<T: Clone> TimeSeries<T> {
    /// All stored slots as data points in chronological order.
    pub fn entries(&self) -> Vec<DataPoint<T>> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| DataPoint::new(item.clone(), self.start + self.granularity * i as i64))
            .collect()
    }
}

impl<T: Clone> TimeSeries<Option<T>> {
    /// Derived series with every unknown entry (sentinels included)
    /// substituted by `replacement`.
    pub fn unknowns_replaced(&self, replacement: T) -> TimeSeries<T> {
        self.map(|item| item.clone().unwrap_or_else(|| replacement.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::t;

    fn start() -> DateTime {
        DateTime::from_iso("2024-09-10T14:00:00Z").unwrap()
    }

    fn test_series() -> TimeSeries<i32> {
        TimeSeries::new(start(), t!(1 hours), vec![10, 20, 30], -1, 99).unwrap()
    }

    #[test]
    fn test_value_before_start() {
        let ts = test_series();

        assert_eq!(*ts.value_at(start() - t!(1 seconds)), -1);
        assert_eq!(*ts.value_at(start() - t!(5 hours)), -1);
    }

    #[test]
    fn test_value_within_range() {
        let ts = test_series();

        assert_eq!(*ts.value_at(start()), 10);
        assert_eq!(*ts.value_at(start() + t!(59 minutes)), 10);
        assert_eq!(*ts.value_at(start() + t!(1 hours)), 20);
        assert_eq!(*ts.value_at(start() + t!(2 hours) + t!(30 minutes)), 30);
    }

    #[test]
    fn test_value_at_or_after_end() {
        let ts = test_series();

        assert_eq!(*ts.value_at(start() + t!(3 hours)), 99);
        assert_eq!(*ts.value_at(start() + t!(30 hours)), 99);
    }

    #[test]
    fn test_empty_series_only_sentinels() {
        let ts = TimeSeries::new(start(), t!(5 minutes), Vec::<i32>::new(), -1, 99).unwrap();

        assert!(ts.is_empty());
        assert_eq!(ts.start(), ts.end());
        assert_eq!(*ts.value_at(start() - t!(1 seconds)), -1);
        assert_eq!(*ts.value_at(start()), 99);
    }

    #[test]
    fn test_non_positive_granularity_rejected() {
        assert!(TimeSeries::new(start(), t!(0 seconds), vec![1], 0, 0).is_err());
        assert!(TimeSeries::new(start(), Duration::seconds(-5), vec![1], 0, 0).is_err());
    }

    #[test]
    fn test_sample_excludes_end() {
        let ts = TimeSeries::sample(
            start(),
            t!(30 minutes),
            start() + t!(2 hours),
            |time| time.elapsed_since(start()).as_minutes(),
            -1,
            -1,
        )
        .unwrap();

        assert_eq!(ts.len(), 4);
        assert_eq!(ts.items(), &[0, 30, 60, 90]);
        assert_eq!(ts.end(), start() + t!(2 hours));
    }

    #[test]
    fn test_entries_chronological() {
        let ts = test_series();

        let entries = ts.entries();

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0], DataPoint::new(10, start()));
        assert_eq!(entries[2], DataPoint::new(30, start() + t!(2 hours)));
    }

    #[test]
    fn test_unknowns_replaced() {
        let ts = TimeSeries::new(
            start(),
            t!(1 hours),
            vec![Some(1.0), None, Some(3.0)],
            None,
            None,
        )
        .unwrap();

        let filled = ts.unknowns_replaced(f64::INFINITY);

        assert_eq!(filled.items(), &[1.0, f64::INFINITY, 3.0]);
        assert_eq!(*filled.value_at(start() - t!(1 hours)), f64::INFINITY);
    }
}
