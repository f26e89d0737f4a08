//! Time source and day arithmetic.

use chrono::{DateTime, Duration, Utc};

const MS_PER_DAY: f64 = 86_400_000.0;

/// Where the engine gets "now" from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Clock {
    #[default]
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// Move a fixed clock forward. No effect on the system clock.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(t) = self {
            *t += delta;
        }
    }
}

/// Fractional days between two instants; negative if `to` is before `from`.
pub fn elapsed_days(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / MS_PER_DAY
}

/// `at` pushed forward by a fractional number of days, saturating at the
/// latest representable instant.
pub fn add_days(at: DateTime<Utc>, days: f64) -> DateTime<Utc> {
    let ms = (days * MS_PER_DAY).round() as i64;
    Duration::try_milliseconds(ms)
        .and_then(|delta| at.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn epoch_plus_days(days: i64) -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH + Duration::days(days)
    }

    #[test]
    fn fixed_clock_advances() {
        let mut clock = Clock::fixed(epoch_plus_days(10));
        clock.advance(Duration::days(2));
        assert_eq!(clock.now(), epoch_plus_days(12));
    }

    #[test]
    fn elapsed_days_is_fractional() {
        let from = epoch_plus_days(1);
        let to = from + Duration::hours(36);
        assert_eq!(elapsed_days(from, to), 1.5);
        assert_eq!(elapsed_days(to, from), -1.5);
    }

    #[test]
    fn add_days_saturates() {
        assert_eq!(add_days(epoch_plus_days(0), 6.0), epoch_plus_days(6));
        assert_eq!(add_days(Utc::now(), 1e30), DateTime::<Utc>::MAX_UTC);
    }
}
