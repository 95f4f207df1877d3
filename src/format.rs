use chrono::{DateTime, Datelike, NaiveDate, TimeDelta, Utc};

/// Short relative label for a conversation list entry.
pub fn format_last_message_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now - timestamp;

    if diff < TimeDelta::minutes(1) {
        return "Just now".to_string();
    }
    if diff < TimeDelta::hours(1) {
        return format!("{}m ago", diff.num_minutes());
    }
    if diff < TimeDelta::days(1) {
        return format!("{}h ago", diff.num_hours());
    }
    if diff < TimeDelta::days(7) {
        return format!("{}d ago", diff.num_days());
    }

    format!(
        "{}/{}/{}",
        timestamp.month(),
        timestamp.day(),
        timestamp.format("%y")
    )
}

/// Long form date, e.g. `January 5, 2025`.
pub fn format_review_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}
