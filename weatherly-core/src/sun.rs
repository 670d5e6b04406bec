use chrono::NaiveTime;

/// How far the day has progressed between sunrise and sunset, in percent.
///
/// Clamped to `[0, 100]`. A span where sunset is not after sunrise reports 0
/// until sunset and 100 from then on.
pub fn day_progress(sunrise: NaiveTime, sunset: NaiveTime, now: NaiveTime) -> f64 {
    let total = (sunset - sunrise).num_seconds() as f64;
    if total <= 0.0 {
        return if now >= sunset { 100.0 } else { 0.0 };
    }

    let elapsed = (now - sunrise).num_seconds() as f64;
    (elapsed / total * 100.0).clamp(0.0, 100.0)
}

/// Parse an `"HH:MM"` clock string.
pub fn parse_clock(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> NaiveTime {
        parse_clock(s).unwrap()
    }

    #[test]
    fn progress_is_clamped_outside_daylight() {
        assert_eq!(day_progress(t("06:00"), t("18:00"), t("05:00")), 0.0);
        assert_eq!(day_progress(t("06:00"), t("18:00"), t("06:00")), 0.0);
        assert_eq!(day_progress(t("06:00"), t("18:00"), t("18:00")), 100.0);
        assert_eq!(day_progress(t("06:00"), t("18:00"), t("23:30")), 100.0);
    }

    #[test]
    fn progress_is_linear_in_between() {
        assert_eq!(day_progress(t("06:00"), t("18:00"), t("12:00")), 50.0);
        assert_eq!(day_progress(t("06:00"), t("18:00"), t("09:00")), 25.0);
    }

    #[test]
    fn degenerate_span_never_divides_by_zero() {
        assert_eq!(day_progress(t("12:00"), t("12:00"), t("11:00")), 0.0);
        assert_eq!(day_progress(t("12:00"), t("12:00"), t("13:00")), 100.0);
        assert_eq!(day_progress(t("20:00"), t("04:00"), t("02:00")), 0.0);
    }

    #[test]
    fn clock_parsing() {
        assert_eq!(parse_clock(" 07:05 "), NaiveTime::from_hms_opt(7, 5, 0));
        assert_eq!(parse_clock("7am"), None);
    }
}
