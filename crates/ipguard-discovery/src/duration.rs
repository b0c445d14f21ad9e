//! Minimal ISO-8601 duration parsing, for the platform's `PT#H#M#S` video-length field.
//! Malformed input yields 0 seconds, logged by the caller (§4.2 step 1).

/// Parses an ISO-8601 duration like `PT1H2M3S` into whole seconds. Only the time
/// designator (hours/minutes/seconds) is supported; platform video durations never
/// carry a date component.
pub fn parse_iso8601_duration_seconds(raw: &str) -> Option<u32> {
    let rest = raw.strip_prefix("PT")?;
    if rest.is_empty() {
        return None;
    }

    let mut total: u64 = 0;
    let mut number = String::new();
    for ch in rest.chars() {
        match ch {
            '0'..='9' | '.' => number.push(ch),
            'H' | 'M' | 'S' => {
                let value: f64 = number.parse().ok()?;
                number.clear();
                let seconds = match ch {
                    'H' => value * 3600.0,
                    'M' => value * 60.0,
                    'S' => value,
                    _ => unreachable!(),
                };
                total += seconds as u64;
            }
            _ => return None,
        }
    }
    if !number.is_empty() {
        return None;
    }
    u32::try_from(total).ok()
}

/// Formats whole seconds back into the `PT#H#M#S` shape `parse_iso8601_duration_seconds`
/// accepts, so `parse(format(x)) == x` (§8). Zero-valued components are omitted, except
/// that zero itself formats as `PT0S` rather than the invalid empty `PT`.
pub fn format_iso8601_duration_seconds(total_seconds: u32) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    let mut out = String::from("PT");
    if hours > 0 {
        out.push_str(&format!("{hours}H"));
    }
    if minutes > 0 {
        out.push_str(&format!("{minutes}M"));
    }
    if seconds > 0 || total_seconds == 0 {
        out.push_str(&format!("{seconds}S"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hours_minutes_seconds() {
        assert_eq!(parse_iso8601_duration_seconds("PT1H2M3S"), Some(3723));
        assert_eq!(parse_iso8601_duration_seconds("PT45S"), Some(45));
        assert_eq!(parse_iso8601_duration_seconds("PT10M"), Some(600));
    }

    #[test]
    fn malformed_durations_yield_none() {
        assert_eq!(parse_iso8601_duration_seconds("garbage"), None);
        assert_eq!(parse_iso8601_duration_seconds("P1D"), None);
        assert_eq!(parse_iso8601_duration_seconds("PT"), None);
    }

    #[test]
    fn formats_omit_zero_components() {
        assert_eq!(format_iso8601_duration_seconds(3723), "PT1H2M3S");
        assert_eq!(format_iso8601_duration_seconds(45), "PT45S");
        assert_eq!(format_iso8601_duration_seconds(600), "PT10M");
        assert_eq!(format_iso8601_duration_seconds(0), "PT0S");
    }

    #[test]
    fn parse_format_round_trips_for_well_formed_durations() {
        for seconds in [0, 1, 45, 59, 60, 600, 3599, 3600, 3723, 86_399, 90_000] {
            let formatted = format_iso8601_duration_seconds(seconds);
            assert_eq!(parse_iso8601_duration_seconds(&formatted), Some(seconds));
        }
    }
}
