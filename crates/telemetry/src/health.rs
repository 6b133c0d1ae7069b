//! Battery health ("maximum capacity") percentage.

#![forbid(unsafe_code)]

use config::RoundingPolicy;

/// Render `100 * nominal / design` under `policy`.
///
/// Returns `None` when `design` is not positive.
///
/// ```
/// # use config::RoundingPolicy;
/// # use telemetry::health_percent;
/// assert_eq!(health_percent(4200, 4500, RoundingPolicy::Ceiling).as_deref(), Some("94"));
/// assert_eq!(health_percent(875, 1000, RoundingPolicy::Keep).as_deref(), Some("87.5"));
/// assert_eq!(health_percent(88, 0, RoundingPolicy::Keep), None);
/// ```
pub fn health_percent(nominal: i64, design: i64, policy: RoundingPolicy) -> Option<String> {
    if design <= 0 {
        return None;
    }
    let raw = nominal as f64 * 100.0 / design as f64;

    let rendered = match policy {
        // Two decimals, read back as a number: 87.50 shows as 87.5, 88.00 as 88.
        RoundingPolicy::Keep => {
            let fixed = format!("{raw:.2}");
            let value = fixed.parse::<f64>().unwrap_or(raw) + 0.0;
            format!("{value}")
        }
        RoundingPolicy::Ceiling => (raw.ceil() as i64).to_string(),
        RoundingPolicy::Round => (raw.round() as i64).to_string(),
        RoundingPolicy::Floor => (raw.floor() as i64).to_string(),
    };
    Some(rendered)
}
