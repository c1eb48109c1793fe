use std::ops::{Add, Div, Mul, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Duration {
    #[serde(with = "duration_format")]
    pub(super) delegate: chrono::Duration,
}

impl Duration {
    pub(super) fn new(delegate: chrono::Duration) -> Self {
        Self { delegate }
    }

    pub fn hours(hours: i64) -> Self {
        Self::new(chrono::Duration::hours(hours))
    }

    pub fn minutes(minutes: i64) -> Self {
        Self::new(chrono::Duration::minutes(minutes))
    }

    pub fn seconds(seconds: i64) -> Self {
        Self::new(chrono::Duration::seconds(seconds))
    }

    pub fn millis(millis: i64) -> Self {
        Self::new(chrono::Duration::milliseconds(millis))
    }

    pub fn is_positive(&self) -> bool {
        self.delegate > chrono::Duration::zero()
    }

    pub fn as_secs(&self) -> i64 {
        self.delegate.num_seconds()
    }

    pub fn as_millis(&self) -> i64 {
        self.delegate.num_milliseconds()
    }

    pub fn as_minutes(&self) -> i64 {
        self.delegate.num_minutes()
    }

    pub fn as_hours(&self) -> i64 {
        self.delegate.num_hours()
    }

    //smallest number of rhs-sized steps that covers self
    pub fn div_ceil(&self, rhs: Duration) -> i64 {
        let lhs_millis = self.as_millis();
        let rhs_millis = rhs.as_millis();
        (lhs_millis + rhs_millis - 1) / rhs_millis
    }

    pub fn to_iso_string(&self) -> String {
        from_chrono_duration(&self.delegate).to_string()
    }
}

impl Add<Duration> for Duration {
    type Output = Duration;

    fn add(self, rhs: Duration) -> Self::Output {
        Self {
            delegate: self.delegate + rhs.delegate,
        }
    }
}

impl Sub<Duration> for Duration {
    type Output = Duration;

    fn sub(self, rhs: Duration) -> Self::Output {
        Self {
            delegate: self.delegate - rhs.delegate,
        }
    }
}

impl Mul<i64> for Duration {
    type Output = Duration;

    fn mul(self, rhs: i64) -> Self::Output {
        Self {
            delegate: self.delegate * rhs as i32,
        }
    }
}

//whole steps of rhs that fit into self, truncated towards zero
impl Div<Duration> for Duration {
    type Output = i64;

    fn div(self, rhs: Duration) -> Self::Output {
        self.as_millis() / rhs.as_millis()
    }
}

impl From<Duration> for std::time::Duration {
    fn from(val: Duration) -> Self {
        let millis = val.delegate.num_milliseconds();
        std::time::Duration::from_millis(millis as u64)
    }
}

mod duration_format {
    use iso8601_duration::Duration as Iso8601Duration;
    use serde::{Deserializer, Serializer, de::Visitor};

    // Serialize `chrono::Duration` to ISO 8601 string format (e.g., "P1DT2H30M")
    pub fn serialize<S>(duration: &chrono::TimeDelta, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let iso_duration = super::from_chrono_duration(duration);
        let iso_string = iso_duration.to_string();
        serializer.serialize_str(&iso_string)
    }

    // Deserialize ISO 8601 string format to `chrono::Duration`
    pub fn deserialize<'de, D>(deserializer: D) -> Result<chrono::Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DurationVisitor;

        impl Visitor<'_> for DurationVisitor {
            type Value = chrono::TimeDelta;

            fn expecting(&self, formatter: &mut core::fmt::Formatter) -> core::fmt::Result {
                formatter.write_str("a string representing an ISO 8601 duration (e.g., PT8H15M)")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                let iso_duration = Iso8601Duration::parse(value).map_err(|e| {
                    E::custom(format!("Error parsing {} to duration: {:?}", value, e))
                })?;

                match iso_duration.to_chrono() {
                    Some(duration) => Ok(duration),
                    None => Err(E::custom(format!(
                        "Duration too long. Must not contain years and/or months. Received {}",
                        value
                    ))),
                }
            }
        }

        deserializer.deserialize_str(DurationVisitor)
    }
}

fn from_chrono_duration(duration: &chrono::Duration) -> iso8601_duration::Duration {
    let days = duration.num_days();
    let seconds = duration.num_seconds() - days * 86400; // remove days in seconds
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let seconds = seconds % 60;

    iso8601_duration::Duration::new(
        0.0, //years
        0.0, //months
        days as f32,
        hours as f32,
        minutes as f32,
        seconds as f32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::t;

    #[test]
    fn test_serialize_duration() {
        let duration = t!(8 hours) + t!(15 minutes);
        let serialized = serde_json::to_string(&duration).unwrap();
        assert_eq!(serialized, r#""PT8H15M""#);
    }

    #[test]
    fn test_deserialize_duration() {
        let duration = serde_json::from_str::<Duration>(r#""PT8H15M""#).unwrap();
        assert_eq!(duration, t!(8 hours) + t!(15 minutes));
    }

    #[test]
    fn test_div_whole_steps() {
        assert_eq!(t!(25 minutes) / t!(5 minutes), 5);
        assert_eq!(t!(24 minutes) / t!(5 minutes), 4);
    }

    #[test]
    fn test_div_ceil() {
        assert_eq!(t!(3 hours).div_ceil(t!(1 hours)), 3);
        assert_eq!(t!(3 hours).div_ceil(t!(2 hours)), 2);
        assert_eq!(t!(5 minutes).div_ceil(t!(5 minutes)), 1);
    }

    #[test]
    fn test_mul() {
        assert_eq!(t!(5 minutes) * 12, t!(1 hours));
    }
}
