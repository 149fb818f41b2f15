use std::time::Duration;

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;

/// Compact human-readable duration, two most significant units.
///
/// `<1 minute` below a minute, then `8m 20s`, `3h 5m`, `2d 4h`. A zero
/// lower unit is dropped (`5m`, `1d`).
pub fn humanize_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < MINUTE {
        return "<1 minute".to_string();
    }

    let (major, major_unit, minor, minor_unit) = if secs < HOUR {
        (secs / MINUTE, "m", secs % MINUTE, "s")
    } else if secs < DAY {
        (secs / HOUR, "h", (secs % HOUR) / MINUTE, "m")
    } else {
        (secs / DAY, "d", (secs % DAY) / HOUR, "h")
    };

    if minor == 0 {
        format!("{major}{major_unit}")
    } else {
        format!("{major}{major_unit} {minor}{minor_unit}")
    }
}
