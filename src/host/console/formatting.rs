// Chat-facing number and time formatting.

use chrono::Duration;

/// Group digits in thousands: 1234567 -> "1,234,567".
pub fn format_number(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if n < 0 {
        grouped.insert(0, '-');
    }
    grouped
}

/// Amount with the currency suffix, singular for exactly one.
pub fn format_money(amount: i64, singular: &str, plural: &str) -> String {
    let unit = if amount == 1 { singular } else { plural };
    format!("{} {}", format_number(amount), unit)
}

/// Compact remaining time, largest two units: "6d 23h", "4m 10s".
/// Zero or negative durations read as "expired".
pub fn format_duration(duration: Duration) -> String {
    let total = duration.num_seconds();
    if total <= 0 {
        return "expired".to_string();
    }

    let parts = [
        (total / 86_400, "d"),
        (total % 86_400 / 3_600, "h"),
        (total % 3_600 / 60, "m"),
        (total % 60, "s"),
    ];

    parts
        .iter()
        .skip_while(|(value, _)| *value == 0)
        .take(2)
        .filter(|(value, _)| *value > 0)
        .map(|(value, unit)| format!("{value}{unit}"))
        .collect::<Vec<_>>()
        .join(" ")
}
