//! Maps wall-clock time to the baseline rhythm feature vector.

use chrono::{DateTime, Datelike, Timelike, Utc};

/// Length of the baseline feature vector: intercept, first and second
/// harmonic of hour-of-day, first harmonic of day-of-week.
pub const FEATURE_DIM: usize = 7;

/// `[1, sin(2πh/24), cos(2πh/24), sin(4πh/24), cos(4πh/24), sin(2πd/7), cos(2πd/7)]`
/// for UTC hour-with-fraction `h` and UTC day-of-week `d` (`0` = Sunday).
///
/// All 7 slots are kept for fidelity to the reference model even though
/// the summarizer only reads the intercept and first-harmonic slots (see
/// `DESIGN.md` for the open-question resolution this follows).
pub fn feature_vector(time_ms: f64) -> [f64; FEATURE_DIM] {
    let (hour, dow) = hour_and_weekday(time_ms);
    let h = hour * std::f64::consts::TAU / 24.0;
    let d = dow * std::f64::consts::TAU / 7.0;
    [
        1.0,
        h.sin(),
        h.cos(),
        (2.0 * h).sin(),
        (2.0 * h).cos(),
        d.sin(),
        d.cos(),
    ]
}

/// UTC hour-with-fraction in `[0, 24)` and UTC day-of-week in `[0, 7)`
/// (`0` = Sunday), matching the `Date.getUTCDay()` convention of the
/// original web client.
pub fn hour_and_weekday(time_ms: f64) -> (f64, f64) {
    let millis = time_ms.round() as i64;
    let secs = millis.div_euclid(1000);
    let nanos = (millis.rem_euclid(1000) * 1_000_000) as u32;
    let dt = DateTime::<Utc>::from_timestamp(secs, nanos).unwrap_or_default();

    let hour = dt.hour() as f64
        + dt.minute() as f64 / 60.0
        + dt.second() as f64 / 3600.0
        + dt.nanosecond() as f64 / 3_600_000_000_000.0;
    let dow = dt.weekday().num_days_from_sunday() as f64;
    (hour, dow)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_is_thursday_midnight() {
        // 1970-01-01T00:00:00Z is a Thursday.
        let (hour, dow) = hour_and_weekday(0.0);
        assert_eq!(hour, 0.0);
        assert_eq!(dow, 4.0);
    }

    #[test]
    fn intercept_slot_is_always_one() {
        let f = feature_vector(1_700_000_000_000.0);
        assert_eq!(f[0], 1.0);
    }

    #[test]
    fn feature_vector_is_periodic_in_24h() {
        let t0 = 1_700_000_000_000.0;
        let one_day_ms = 24.0 * 3_600_000.0;
        let f0 = feature_vector(t0);
        let f1 = feature_vector(t0 + one_day_ms);
        for i in 0..FEATURE_DIM {
            assert!((f0[i] - f1[i]).abs() < 1e-9, "slot {i} not periodic");
        }
    }

    #[test]
    fn hour_harmonics_match_trig_identities() {
        let f = feature_vector(6.0 * 3_600_000.0); // 06:00 UTC, 1970-01-01
        assert!((f[1] - 1.0).abs() < 1e-9); // sin(2*pi*6/24) = sin(pi/2) = 1
        assert!(f[2].abs() < 1e-9); // cos(pi/2) = 0
    }
}
