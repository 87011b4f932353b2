//! Dashboard analytics: client-side aggregation of stored health
//! reports into chart-ready series, the condensed last-report summary,
//! the activity feed, and the display-name resolution ladder.

use std::collections::HashMap;

use serde::Serialize;
use tracing::warn;

use crate::activity::{self, FeedItem};
use crate::firestore::{DocumentStore, RECENT_ACTIVITY_LIMIT};
use crate::models::report::format_iso_date;
use crate::models::{RawHealthReport, UrgencyTier, UserProfile};

/// How many symptoms the trend chart tracks.
const TOP_SYMPTOM_COUNT: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("{0}")]
    Store(#[from] crate::firestore::StoreError),
}

// ═══════════════════════════════════════════════════════════
// Chart-ready shapes
// ═══════════════════════════════════════════════════════════

/// Everything the trend charts need, computed in one pass over the
/// user's reports.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymptomTrends {
    /// Up to three most frequent symptom labels.
    pub top_symptoms: Vec<String>,
    /// Sorted unique report dates (`YYYY-MM-DD`).
    pub dates: Vec<String>,
    /// One line per top symptom, counts aligned with `dates`.
    pub series: Vec<SymptomSeries>,
    /// Every symptom with its total, first-encounter order.
    pub histogram: Vec<SymptomCount>,
    /// Health score per dated report, oldest first.
    pub health_scores: Vec<ScorePoint>,
    /// False when the charts should show their "no data" placeholders.
    pub has_data: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymptomSeries {
    pub label: String,
    pub counts: Vec<u32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymptomCount {
    pub label: String,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScorePoint {
    pub date: String,
    pub score: f64,
}

/// Condensed last-report panel.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    /// Most likely condition, when the last report predicted one.
    pub condition: Option<String>,
    pub urgency: Option<UrgencyTier>,
    pub should_see_doctor: bool,
    pub recommendations: Vec<String>,
    pub generated_date: String,
    /// False when the panel should show its empty state.
    pub has_report: bool,
}

// ═══════════════════════════════════════════════════════════
// Aggregation
// ═══════════════════════════════════════════════════════════

/// Fetch the user's reports and fold them into chart series.
pub fn load_trends(
    store: &dyn DocumentStore,
    user_id: &str,
) -> Result<SymptomTrends, DashboardError> {
    Ok(compute_trends(&store.health_reports(user_id)?))
}

/// Pure aggregation over the report set, oldest first.
pub fn compute_trends(reports: &[RawHealthReport]) -> SymptomTrends {
    if reports.is_empty() {
        return SymptomTrends::default();
    }

    // Totals in first-encounter order, which also breaks ties below.
    let mut order: Vec<String> = Vec::new();
    let mut totals: HashMap<String, u32> = HashMap::new();
    for report in reports {
        for symptom in report.symptoms.as_deref().unwrap_or_default() {
            if !totals.contains_key(symptom) {
                order.push(symptom.clone());
            }
            *totals.entry(symptom.clone()).or_insert(0) += 1;
        }
    }

    let histogram: Vec<SymptomCount> = order
        .iter()
        .map(|label| SymptomCount {
            label: label.clone(),
            count: totals[label],
        })
        .collect();

    // Top three by count; equal counts keep first-encounter order
    // because the sort is stable over `order`.
    let mut ranked = histogram.clone();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    let top_symptoms: Vec<String> = ranked
        .into_iter()
        .take(TOP_SYMPTOM_COUNT)
        .map(|c| c.label)
        .collect();

    // Per-date counts for the top symptoms.
    let mut dates: Vec<String> = reports
        .iter()
        .filter_map(report_date)
        .collect();
    dates.sort();
    dates.dedup();

    let mut per_date: HashMap<(String, String), u32> = HashMap::new();
    for report in reports {
        let Some(date) = report_date(report) else {
            continue;
        };
        for symptom in report.symptoms.as_deref().unwrap_or_default() {
            *per_date.entry((symptom.clone(), date.clone())).or_insert(0) += 1;
        }
    }
    let series: Vec<SymptomSeries> = top_symptoms
        .iter()
        .map(|label| SymptomSeries {
            label: label.clone(),
            counts: dates
                .iter()
                .map(|date| {
                    per_date
                        .get(&(label.clone(), date.clone()))
                        .copied()
                        .unwrap_or(0)
                })
                .collect(),
        })
        .collect();

    let health_scores: Vec<ScorePoint> = reports
        .iter()
        .filter_map(|report| {
            let date = report_date(report)?;
            let score = report_score(report)?;
            Some(ScorePoint { date, score })
        })
        .collect();

    SymptomTrends {
        has_data: !histogram.is_empty(),
        top_symptoms,
        dates,
        series,
        histogram,
        health_scores,
    }
}

fn report_date(report: &RawHealthReport) -> Option<String> {
    let ts = report
        .created
        .as_deref()
        .or(report.report_generated_at.as_deref())?;
    let date = format_iso_date(Some(ts));
    if date == "Unknown date" {
        None
    } else {
        Some(date)
    }
}

/// Health score ladder: the explicit field, else the score inside the
/// analysis, else a symptom-count derived estimate.
fn report_score(report: &RawHealthReport) -> Option<f64> {
    if let Some(score) = report.health_score {
        return Some(score);
    }
    if let Some(score) = report.ai_analysis.as_ref().and_then(|a| a.health_score) {
        return Some(score);
    }
    let symptoms = report.symptoms.as_deref().unwrap_or_default();
    if symptoms.is_empty() {
        None
    } else {
        Some((100.0 - 10.0 * symptoms.len() as f64).max(0.0))
    }
}

// ═══════════════════════════════════════════════════════════
// Summary panel, feed, display name
// ═══════════════════════════════════════════════════════════

/// Build the condensed panel from the most recent report.
pub fn load_summary(
    store: &dyn DocumentStore,
    user_id: &str,
) -> Result<DashboardSummary, DashboardError> {
    let Some(raw) = store.latest_report(user_id)? else {
        return Ok(DashboardSummary::default());
    };
    let view = raw.normalize();
    let generated_date = view.generated_date_text();
    let Some(analysis) = view.analysis else {
        return Ok(DashboardSummary {
            generated_date,
            has_report: true,
            ..Default::default()
        });
    };
    Ok(DashboardSummary {
        condition: analysis.primary_ailment().map(|a| a.name.clone()),
        urgency: analysis.urgency,
        should_see_doctor: analysis.should_see_doctor.unwrap_or(false),
        recommendations: analysis.recommendations.clone(),
        generated_date,
        has_report: true,
    })
}

/// The four most recent feed rows, newest first.
pub fn load_activity_feed(
    store: &dyn DocumentStore,
    user_id: &str,
) -> Result<Vec<FeedItem>, DashboardError> {
    let entries = store.recent_activity(user_id, RECENT_ACTIVITY_LIMIT)?;
    Ok(entries.iter().map(activity::feed_item).collect())
}

/// Greeting name ladder: cached profile, then the provider display
/// name, then the users document, then the fixed fallback.
pub fn resolve_display_name(
    cached: Option<&UserProfile>,
    provider_display_name: Option<&str>,
    store: &dyn DocumentStore,
    uid: &str,
) -> String {
    if let Some(name) = cached.and_then(|p| p.display_name()) {
        return name.to_string();
    }
    if let Some(name) = provider_display_name.filter(|n| !n.is_empty()) {
        return name.to_string();
    }
    match store.user_profile(uid) {
        Ok(Some(profile)) => {
            if let Some(name) = profile.display_name() {
                return name.to_string();
            }
        }
        Ok(None) => {}
        Err(e) => warn!("Could not load profile for greeting: {e}"),
    }
    "User".to_string()
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
