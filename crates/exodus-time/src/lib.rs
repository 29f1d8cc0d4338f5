//! Time utilities for the exodus origin request path.
//!
//! Every request captures "now" exactly once, truncated to millisecond
//! precision and normalized to UTC, and uses that instant for its versioned
//! lookup. The [`TimeProvider`] trait makes that instant injectable so tests can
//! pin it.
//!
//! # TimeProvider Trait
//!
//! Use [`SystemTimeProvider`] in production and [`SimulatedTimeProvider`]
//! (behind the `simulation` feature) in tests.
//!
//! # Index Keys
//!
//! The versioned index orders records by their `from_date` attribute, stored
//! as an RFC 3339 string with millisecond precision and an explicit `+00:00`
//! offset. [`index_timestamp`] renders an instant in exactly that form so that
//! lexicographic and chronological ordering agree.

use std::sync::Arc;
#[cfg(feature = "simulation")]
use std::sync::atomic::AtomicI64;
#[cfg(feature = "simulation")]
use std::sync::atomic::Ordering;

use chrono::DateTime;
use chrono::SecondsFormat;
use chrono::Utc;

// ============================================================================
// Free Functions
// ============================================================================

/// Current wall-clock instant in UTC, truncated to whole milliseconds.
#[inline]
pub fn now_utc_ms() -> DateTime<Utc> {
    truncate_to_ms(Utc::now())
}

/// Drop sub-millisecond precision from an instant.
///
/// Falls back to the input unchanged if the millisecond timestamp is out of
/// chrono's representable range (never the case for wall-clock instants).
#[inline]
pub fn truncate_to_ms(instant: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(instant.timestamp_millis()).unwrap_or(instant)
}

/// Render an instant as the index sort-key form, e.g.
/// `2024-03-01T12:00:00.000+00:00`.
pub fn index_timestamp(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, false)
}

/// Parse an index sort-key (any RFC 3339 string) back into a UTC instant.
pub fn parse_index_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc))
}

// ============================================================================
// TimeProvider Trait
// ============================================================================

/// Injectable source of the per-request "now".
///
/// # Example
///
/// ```
/// use exodus_time::{SystemTimeProvider, TimeProvider};
///
/// let time = SystemTimeProvider;
/// let now = time.now_utc();
/// assert_eq!(now.timestamp_subsec_nanos() % 1_000_000, 0);
/// ```
pub trait TimeProvider: Send + Sync {
    /// Current instant in UTC with millisecond precision.
    fn now_utc(&self) -> DateTime<Utc>;

    /// Current instant as Unix milliseconds.
    fn now_unix_ms(&self) -> i64 {
        self.now_utc().timestamp_millis()
    }
}

impl<T: TimeProvider + ?Sized> TimeProvider for Arc<T> {
    fn now_utc(&self) -> DateTime<Utc> {
        (**self).now_utc()
    }
}

// ============================================================================
// SystemTimeProvider (Production)
// ============================================================================

/// Production time provider using the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    #[inline]
    fn now_utc(&self) -> DateTime<Utc> {
        now_utc_ms()
    }
}

// ============================================================================
// SimulatedTimeProvider (Testing)
// ============================================================================

/// Simulated time provider for deterministic testing.
///
/// Clones share the same clock.
///
/// ```ignore
/// use exodus_time::{SimulatedTimeProvider, TimeProvider};
///
/// let time = SimulatedTimeProvider::new(1_700_000_000_000);
/// time.advance_ms(500);
/// assert_eq!(time.now_unix_ms(), 1_700_000_000_500);
/// ```
#[cfg(feature = "simulation")]
#[derive(Debug, Clone)]
pub struct SimulatedTimeProvider {
    current_time_ms: Arc<AtomicI64>,
}

#[cfg(feature = "simulation")]
impl SimulatedTimeProvider {
    /// Create a simulated clock starting at the given Unix milliseconds.
    pub fn new(initial_time_ms: i64) -> Self {
        Self {
            current_time_ms: Arc::new(AtomicI64::new(initial_time_ms)),
        }
    }

    /// Create a simulated clock pinned to the given instant.
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self::new(instant.timestamp_millis())
    }

    /// Advance the clock by the given number of milliseconds.
    pub fn advance_ms(&self, delta_ms: i64) {
        self.current_time_ms.fetch_add(delta_ms, Ordering::SeqCst);
    }

    /// Set the clock to a specific instant.
    pub fn set(&self, instant: DateTime<Utc>) {
        self.current_time_ms.store(instant.timestamp_millis(), Ordering::SeqCst);
    }
}

#[cfg(feature = "simulation")]
impl TimeProvider for SimulatedTimeProvider {
    #[inline]
    fn now_utc(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.current_time_ms.load(Ordering::SeqCst)).unwrap_or_default()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn now_utc_ms_has_no_sub_millisecond_part() {
        let now = now_utc_ms();
        assert_eq!(now.timestamp_subsec_nanos() % 1_000_000, 0);
    }

    #[test]
    fn now_utc_ms_reasonable_range() {
        let year_2020_ms = 1_577_836_800_000i64;
        let year_2100_ms = 4_102_444_800_000i64;
        let now = now_utc_ms().timestamp_millis();
        assert!(now > year_2020_ms, "now {} should be after year 2020", now);
        assert!(now < year_2100_ms, "now {} should be before year 2100", now);
    }

    #[test]
    fn index_timestamp_uses_millis_and_utc_offset() {
        let instant = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 5).unwrap();
        assert_eq!(index_timestamp(&instant), "2024-03-01T12:00:05.000+00:00");
    }

    #[test]
    fn index_timestamp_orders_like_instants() {
        let earlier = Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert!(index_timestamp(&earlier) < index_timestamp(&later));
    }

    #[test]
    fn parse_index_timestamp_normalizes_offsets() {
        let parsed = parse_index_timestamp("2024-03-01T14:00:00.250+02:00").unwrap();
        assert_eq!(index_timestamp(&parsed), "2024-03-01T12:00:00.250+00:00");
    }

    #[test]
    fn parse_index_timestamp_rejects_garbage() {
        assert!(parse_index_timestamp("yesterday").is_err());
    }

    #[test]
    fn system_time_provider_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SystemTimeProvider>();
    }
}

#[cfg(all(test, feature = "simulation"))]
mod simulation_tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn simulated_time_initial_value() {
        let time = SimulatedTimeProvider::new(1_000_000);
        assert_eq!(time.now_unix_ms(), 1_000_000);
    }

    #[test]
    fn simulated_time_advance_and_set() {
        let time = SimulatedTimeProvider::new(1_000_000);
        time.advance_ms(500);
        assert_eq!(time.now_unix_ms(), 1_000_500);

        let instant = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        time.set(instant);
        assert_eq!(time.now_utc(), instant);
    }

    #[test]
    fn simulated_time_clone_shares_state() {
        let time1 = SimulatedTimeProvider::new(1_000_000);
        let time2 = time1.clone();
        time1.advance_ms(500);
        assert_eq!(time2.now_unix_ms(), 1_000_500);
    }
}
