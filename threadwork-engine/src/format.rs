use crate::api::{Time, SCORE_MAX_B, SCORE_MAX_K, SCORE_MAX_M, SCORE_MULTIPLIER};

/// Renders a stored score as a compact string: plain integers up to 10⁴,
/// then one decimal with a K, M or B suffix, then an infinity sign
pub fn format_score(raw: i64) -> String {
    let base = raw as f64 / SCORE_MULTIPLIER as f64;
    if base == 0.0 {
        // log10(0) is -inf
        return String::from("0");
    }
    let magnitude = base.abs().log10().ceil();
    let (score, unit) = if magnitude < 5.0 {
        return format!("{}", base.ceil() as i64);
    } else if magnitude < 8.0 {
        (base / SCORE_MAX_K, "K")
    } else if magnitude < 11.0 {
        (base / SCORE_MAX_M, "M")
    } else if magnitude < 13.0 {
        (base / SCORE_MAX_B, "B")
    } else {
        let sign = if base < 0.0 { "-" } else { "" };
        return format!("{sign}∞");
    };
    format!("{score:.1}{unit}")
}

const HOUR: f64 = 1.;
const DAY: f64 = 24. * HOUR;
const WEEK: f64 = 7. * DAY;
const MONTH: f64 = 4. * WEEK;
const YEAR: f64 = 8760. * HOUR;
const DECADE: f64 = 10. * YEAR;
const CENTURY: f64 = 10. * DECADE;

/// Describes how long before `now` the time `t` was, eg. "3 hours ago".
///
/// Units are approximations (a month is four weeks), and values are rounded
/// to the closest integer.
pub fn humanize(t: Time, now: Time) -> String {
    let seconds = now.signed_duration_since(t).num_milliseconds() as f64 / 1000.;
    let when = if seconds < 0. { "in the future" } else { "ago" };
    let seconds = seconds.abs();
    if seconds < 30. {
        return String::from("now");
    }
    let minutes = seconds / 60.;
    let hours = minutes / 60.;

    let (val, unit) = if hours < HOUR {
        if minutes < 1. {
            (seconds % 60., "second")
        } else {
            (minutes % 60., "minute")
        }
    } else if hours < DAY {
        (hours, "hour")
    } else if hours < WEEK {
        (hours / DAY, "day")
    } else if hours < MONTH {
        (hours / WEEK, "week")
    } else if hours < YEAR {
        (hours / MONTH, "month")
    } else if hours < DECADE {
        (hours / YEAR, "year")
    } else if hours < CENTURY {
        (hours / DECADE, "decade")
    } else {
        (hours / CENTURY, "century")
    };
    format!("{val:.0} {} {when}", pluralize(val, unit))
}

fn pluralize(val: f64, unit: &str) -> String {
    if val.round() == 1. {
        return String::from(unit);
    }
    match unit {
        "century" => String::from("centuries"),
        _ => format!("{unit}s"),
    }
}
