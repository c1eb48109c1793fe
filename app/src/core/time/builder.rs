#[macro_export]
macro_rules! t {
    (now) => {{
        $crate::core::time::DateTime::now()
    }};

    ($amount:literal seconds) => {{
        $crate::core::time::Duration::seconds($amount)
    }};
    ($amount:literal minutes) => {{
        $crate::core::time::Duration::minutes($amount)
    }};
    ($amount:literal hours) => {{
        $crate::core::time::Duration::hours($amount)
    }};

    ($amount:literal seconds ago) => {{
        t!(now) - t!($amount seconds)
    }};
    ($amount:literal minutes ago) => {{
        t!(now) - t!($amount minutes)
    }};
    ($amount:literal hours ago) => {{
        t!(now) - t!($amount hours)
    }};

    (in $amount:literal seconds) => {{
        t!(now) + t!($amount seconds)
    }};
    (in $amount:literal minutes) => {{
        t!(now) + t!($amount minutes)
    }};
    (in $amount:literal hours) => {{
        t!(now) + t!($amount hours)
    }};
}

#[cfg(test)]
mod tests {
    use crate::core::time::*;

    #[test]
    fn test_now() {
        let now = t!(now);
        assert!(DateTime::now().elapsed_since(now) < Duration::seconds(1));
    }

    #[test]
    fn test_duration_seconds() {
        let duration = t!(10 seconds);

        assert_eq!(duration.as_secs(), 10);
    }

    #[test]
    fn test_duration_minutes() {
        let duration = t!(10 minutes);

        assert_eq!(duration.as_minutes(), 10);
    }

    #[test]
    fn test_duration_hours() {
        let duration = t!(10 hours);

        assert_eq!(duration.as_hours(), 10);
    }

    #[test]
    fn test_duration_minutes_ago() {
        let now = DateTime::now();
        let dt = t!(10 minutes ago);

        assert!(now >= dt);
        assert!(now - Duration::minutes(10) <= dt);
    }

    #[test]
    fn test_in_duration_hours() {
        let now = DateTime::now();
        let dt = t!(in 2 hours);

        assert!(dt >= now);
        assert!(dt <= now + Duration::hours(2));
    }
}
