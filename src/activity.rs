//! Recent-activity feed: best-effort append plus feed presentation.
//!
//! Activity writes are side effects of the main flows (a recording
//! transcribed, medical info saved, a report rendered). They must never
//! fail the flow that triggered them, so errors are logged and dropped.

use serde::Serialize;
use tracing::warn;

use crate::firestore::DocumentStore;
use crate::models::{ActivityEntry, ActivityKind};

/// One feed row, ready for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    /// Font Awesome icon name.
    pub icon: String,
    pub title: String,
    pub details: String,
    pub time_text: String,
}

/// Append an activity entry; failures are logged, never surfaced.
pub fn log_activity(store: &dyn DocumentStore, user_id: &str, kind: ActivityKind, details: &str) {
    let entry = ActivityEntry {
        id: None,
        user_id: user_id.to_string(),
        kind,
        details: details.to_string(),
        timestamp: None,
    };
    if let Err(e) = store.append_activity(&entry) {
        warn!(?kind, "Failed to record activity: {e}");
    }
}

/// Present a stored entry as a feed row.
pub fn feed_item(entry: &ActivityEntry) -> FeedItem {
    let details = if entry.details.is_empty() {
        entry.kind.default_details().to_string()
    } else {
        entry.details.clone()
    };
    FeedItem {
        icon: entry.kind.icon().to_string(),
        title: entry.kind.title().to_string(),
        details,
        time_text: time_text(entry.timestamp.as_deref()),
    }
}

/// "Just now" / "N minutes ago" / "N hours ago", falling back to the
/// calendar date for anything older than a day.
fn time_text(timestamp: Option<&str>) -> String {
    let Some(ts) = timestamp else {
        return "Just now".to_string();
    };
    let Ok(parsed) = chrono::DateTime::parse_from_rfc3339(ts) else {
        return "Just now".to_string();
    };
    let elapsed = chrono::Utc::now().signed_duration_since(parsed);
    let minutes = elapsed.num_minutes();
    if minutes < 1 {
        "Just now".to_string()
    } else if minutes < 60 {
        format!("{minutes} minute{} ago", if minutes == 1 { "" } else { "s" })
    } else if minutes < 24 * 60 {
        let hours = elapsed.num_hours();
        format!("{hours} hour{} ago", if hours == 1 { "" } else { "s" })
    } else {
        parsed.format("%Y-%m-%d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_item_uses_default_details_when_empty() {
        let entry = ActivityEntry {
            id: None,
            user_id: "u1".into(),
            kind: ActivityKind::VoiceInput,
            details: String::new(),
            timestamp: None,
        };
        let item = feed_item(&entry);
        assert_eq!(item.icon, "fa-microphone");
        assert_eq!(item.title, "Voice Recording");
        assert_eq!(item.details, "Recorded voice symptoms for analysis");
        assert_eq!(item.time_text, "Just now");
    }

    #[test]
    fn feed_item_keeps_stored_details() {
        let entry = ActivityEntry {
            id: None,
            user_id: "u1".into(),
            kind: ActivityKind::HealthReport,
            details: "Generated health report for review".into(),
            timestamp: None,
        };
        assert_eq!(feed_item(&entry).details, "Generated health report for review");
    }

    #[test]
    fn recent_timestamps_render_relative() {
        let five_min_ago = (chrono::Utc::now() - chrono::Duration::minutes(5)).to_rfc3339();
        assert_eq!(time_text(Some(&five_min_ago)), "5 minutes ago");

        let two_hours_ago = (chrono::Utc::now() - chrono::Duration::hours(2)).to_rfc3339();
        assert_eq!(time_text(Some(&two_hours_ago)), "2 hours ago");
    }

    #[test]
    fn old_timestamps_render_as_dates() {
        let last_week = (chrono::Utc::now() - chrono::Duration::days(7)).to_rfc3339();
        let text = time_text(Some(&last_week));
        assert!(text.contains('-'), "expected a date, got {text}");
    }

    #[test]
    fn unparseable_timestamp_falls_back() {
        assert_eq!(time_text(Some("yesterday-ish")), "Just now");
    }
}
