use time::{OffsetDateTime, UtcOffset};

const EPOCH_SECONDS_CUTOFF: i128 = 100_000_000_000;
const EPOCH_MILLIS_CUTOFF: i128 = 100_000_000_000_000;
const EPOCH_MICROS_CUTOFF: i128 = 100_000_000_000_000_000;
const NANOS_PER_MILLI: i128 = 1_000_000;

/// Renders an epoch value of unknown unit as RFC 3339 UTC with millisecond
/// precision. Webhooks mix seconds (`created_time`, WhatsApp `timestamp`) and
/// milliseconds (messaging `timestamp`, entry `time`), so the unit is inferred
/// from magnitude.
#[must_use]
pub fn format_epoch(raw: i64) -> Option<String> {
    epoch_to_unix_ms(raw).and_then(format_unix_ms)
}

/// Seconds, milliseconds, microseconds, or nanoseconds to milliseconds.
/// Negative values are rejected.
#[must_use]
pub fn epoch_to_unix_ms(raw: i64) -> Option<u64> {
    let epoch_raw = i128::from(raw);
    if epoch_raw < 0 {
        return None;
    }

    let epoch_ms = if epoch_raw < EPOCH_SECONDS_CUTOFF {
        epoch_raw.checked_mul(1_000)?
    } else if epoch_raw < EPOCH_MILLIS_CUTOFF {
        epoch_raw
    } else if epoch_raw < EPOCH_MICROS_CUTOFF {
        epoch_raw / 1_000
    } else {
        epoch_raw / 1_000_000
    };

    u64::try_from(epoch_ms).ok()
}

#[must_use]
pub fn format_unix_ms(timestamp_unix_ms: u64) -> Option<String> {
    let nanos = i128::from(timestamp_unix_ms).checked_mul(NANOS_PER_MILLI)?;
    let dt = OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .ok()?
        .to_offset(UtcOffset::UTC);
    Some(format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}Z",
        dt.year(),
        u8::from(dt.month()),
        dt.day(),
        dt.hour(),
        dt.minute(),
        dt.second(),
        dt.millisecond()
    ))
}

#[cfg(test)]
mod tests {
    use super::{epoch_to_unix_ms, format_epoch, format_unix_ms};

    #[test]
    fn infers_epoch_seconds() {
        assert_eq!(epoch_to_unix_ms(1_653_253_313), Some(1_653_253_313_000));
    }

    #[test]
    fn infers_epoch_millis() {
        assert_eq!(epoch_to_unix_ms(1_458_668_856_463), Some(1_458_668_856_463));
    }

    #[test]
    fn infers_epoch_micros_and_nanos() {
        assert_eq!(epoch_to_unix_ms(1_770_274_803_000_000), Some(1_770_274_803_000));
        assert_eq!(
            epoch_to_unix_ms(1_770_274_803_000_000_000),
            Some(1_770_274_803_000)
        );
    }

    #[test]
    fn rejects_negative_epoch() {
        assert_eq!(epoch_to_unix_ms(-1), None);
        assert_eq!(format_epoch(-1), None);
    }

    #[test]
    fn formats_as_utc_with_millis() {
        assert_eq!(
            format_unix_ms(1_770_274_803_042).as_deref(),
            Some("2026-02-05T07:00:03.042Z")
        );
        assert_eq!(
            format_epoch(1_653_253_313).as_deref(),
            Some("2022-05-22T21:01:53.000Z")
        );
    }
}
