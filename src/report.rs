//! Health report page: resolution ladder and HTML assembly.
//!
//! Finding the report to show walks a fixed ladder:
//! 1. the one-shot handoff key stashed by report generation;
//! 2. otherwise the user's most recent symptom record;
//! 3. the detailed fetch for that id — a 404 means the record has no
//!    report yet, so one is generated and re-fetched by symptom id;
//! 4. if the detailed payload still cannot be had, a basic assessment
//!    is rendered from the symptom record alone;
//! 5. with no records at all, the no-reports call-to-action.
//!
//! All dynamic text is HTML-escaped before it reaches a fragment.

use serde::Serialize;
use tracing::{info, warn};

use crate::activity;
use crate::backend::BackendApi;
use crate::firestore::DocumentStore;
use crate::models::{ActivityKind, HealthReportView, SymptomRecord};
use crate::models::report::format_iso_date;
use crate::session_store::SessionStore;

/// Heading of the empty-state call-to-action.
pub const NO_REPORTS_HEADING: &str = "No Health Reports Available";

// ═══════════════════════════════════════════════════════════
// Errors and outcomes
// ═══════════════════════════════════════════════════════════

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("{0}")]
    Backend(#[from] crate::backend::BackendError),
}

/// What the ladder settled on.
#[derive(Debug)]
pub enum ResolvedReport {
    /// Detailed payload fetched and normalized.
    Full(Box<HealthReportView>),
    /// Detailed payload unavailable; degrade to the symptom record.
    Basic(Box<SymptomRecord>),
    /// The user has no records at all.
    None,
}

/// Rendered page, shaped for IPC.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedReport {
    pub kind: ReportKind,
    pub html: String,
    /// Symptom id backing the report, when known; feeds the booking form.
    pub symptom_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Full,
    Basic,
    Empty,
}

// ═══════════════════════════════════════════════════════════
// Resolution ladder
// ═══════════════════════════════════════════════════════════

/// Walk the ladder and return the report to render.
pub fn resolve_report(
    backend: &dyn BackendApi,
    session_store: &SessionStore,
    user_id: &str,
) -> Result<ResolvedReport, ReportError> {
    // Rung 1: the handoff key, consumed whether or not it pans out.
    let stashed = match session_store.take_latest_report_id() {
        Ok(id) => id,
        Err(e) => {
            warn!("Could not read report handoff key: {e}");
            None
        }
    };
    if let Some(id) = stashed {
        match backend.detailed_report(&id) {
            Ok(raw) => return Ok(ResolvedReport::Full(Box::new(raw.normalize()))),
            Err(e) => warn!(report_id = %id, "Stashed report unavailable, falling back: {e}"),
        }
    }

    // Rung 2: the most recent symptom record.
    let records = backend.health_reports(user_id)?;
    let Some(record) = most_recent(records) else {
        return Ok(ResolvedReport::None);
    };

    // Rung 3: detailed fetch; 404 means no report exists yet.
    match backend.detailed_report(&record.id) {
        Ok(raw) => Ok(ResolvedReport::Full(Box::new(raw.normalize()))),
        Err(e) if e.is_not_found() => {
            info!(symptom_id = %record.id, "No report yet, generating");
            let generated = backend.generate_report(user_id, &record.id)?;
            match backend.detailed_report(&generated.report_id) {
                Ok(raw) => Ok(ResolvedReport::Full(Box::new(raw.normalize()))),
                Err(e) => {
                    warn!("Generated report could not be fetched, degrading: {e}");
                    Ok(ResolvedReport::Basic(Box::new(record)))
                }
            }
        }
        Err(e) => {
            warn!("Detailed report fetch failed, degrading: {e}");
            Ok(ResolvedReport::Basic(Box::new(record)))
        }
    }
}

/// Newest record by `created` (ISO strings order lexicographically);
/// records without a timestamp sort last.
fn most_recent(records: Vec<SymptomRecord>) -> Option<SymptomRecord> {
    records
        .into_iter()
        .max_by(|a, b| a.created.cmp(&b.created))
}

/// Resolve and render the report page. A successful full render logs a
/// `health_report` activity.
pub fn load_report_page(
    backend: &dyn BackendApi,
    store: &dyn DocumentStore,
    session_store: &SessionStore,
    user_id: &str,
) -> Result<RenderedReport, ReportError> {
    match resolve_report(backend, session_store, user_id)? {
        ResolvedReport::Full(view) => {
            activity::log_activity(
                store,
                user_id,
                ActivityKind::HealthReport,
                "Viewed health report",
            );
            Ok(RenderedReport {
                kind: ReportKind::Full,
                html: render_full(&view),
                symptom_id: view.symptom_id.clone().or_else(|| view.record_id.clone()),
            })
        }
        ResolvedReport::Basic(record) => Ok(RenderedReport {
            kind: ReportKind::Basic,
            html: render_basic(&record),
            symptom_id: Some(record.id.clone()),
        }),
        ResolvedReport::None => Ok(RenderedReport {
            kind: ReportKind::Empty,
            html: render_no_reports(),
            symptom_id: None,
        }),
    }
}

// ═══════════════════════════════════════════════════════════
// HTML assembly
// ═══════════════════════════════════════════════════════════

/// Escape text for interpolation into an HTML fragment.
pub fn html_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn symptom_chips(symptoms: &[String]) -> String {
    symptoms
        .iter()
        .map(|s| {
            format!(
                "<span class=\"px-3 py-1 bg-blue-100 text-blue-800 rounded-full text-sm\">{}</span>",
                html_escape(s)
            )
        })
        .collect::<Vec<_>>()
        .join("")
}

/// Full report: patient info, medical history, transcript, symptoms,
/// differential diagnosis, recommendations, urgency, advice, booking
/// action, disclaimer.
pub fn render_full(view: &HealthReportView) -> String {
    let mut html = String::new();

    html.push_str("<div class=\"health-report\">");
    html.push_str(&format!(
        "<div class=\"report-header\"><h2 class=\"text-2xl font-bold\">Health Report</h2>\
         <p class=\"text-gray-500\">Generated on {} {}</p></div>",
        html_escape(&view.generated_date_text()),
        html_escape(&view.generated_time_text())
    ));

    if let Some(patient) = &view.patient_info {
        html.push_str(&format!(
            "<section class=\"patient-info\"><h3>Patient Information</h3>\
             <p>Name: {}</p><p>Age: {}</p><p>Gender: {}</p><p>Email: {}</p></section>",
            html_escape(&patient.name),
            html_escape(&patient.age_text()),
            html_escape(&patient.gender),
            html_escape(&patient.email)
        ));
    }

    if let Some(medical) = &view.medical_info {
        html.push_str(&format!(
            "<section class=\"medical-history\"><h3>Medical History</h3>\
             <p>Blood Type: {}</p><p>Allergies: {}</p>\
             <p>Medications: {}</p><p>Conditions: {}</p></section>",
            html_escape(&medical.blood_type),
            html_escape(&medical.allergies),
            html_escape(&medical.medications),
            html_escape(&medical.conditions)
        ));
    }

    if !view.transcript.is_empty() {
        html.push_str(&format!(
            "<section class=\"transcript\"><h3>Reported Symptoms</h3>\
             <p class=\"italic\">\"{}\"</p></section>",
            html_escape(&view.transcript)
        ));
    }

    if !view.symptoms.is_empty() {
        html.push_str(&format!(
            "<section class=\"symptoms\"><h3>Identified Symptoms</h3>\
             <div class=\"flex flex-wrap gap-2\">{}</div></section>",
            symptom_chips(&view.symptoms)
        ));
    }

    if let Some(analysis) = &view.analysis {
        if !analysis.possible_ailments.is_empty() {
            html.push_str("<section class=\"diagnosis\"><h3>Possible Conditions</h3>");
            for ailment in &analysis.possible_ailments {
                html.push_str(&format!(
                    "<div class=\"ailment\"><span class=\"font-semibold\">{}</span>\
                     <span class=\"px-2 py-1 rounded-full text-xs {}\">{} confidence</span>\
                     <p class=\"text-sm text-gray-600\">{}</p></div>",
                    html_escape(&ailment.name),
                    ailment.confidence.badge_classes(),
                    ailment.confidence,
                    html_escape(&ailment.description)
                ));
            }
            html.push_str("</section>");
        }

        if !analysis.recommendations.is_empty() {
            html.push_str("<section class=\"recommendations\"><h3>Recommendations</h3><ul>");
            for rec in &analysis.recommendations {
                html.push_str(&format!("<li>{}</li>", html_escape(rec)));
            }
            html.push_str("</ul></section>");
        }

        if let Some(urgency) = analysis.urgency {
            html.push_str(&format!(
                "<section class=\"urgency\"><h3>Urgency</h3>\
                 <span class=\"px-3 py-1 rounded-full {}\">\
                 <i class=\"fas fa-{}\"></i> {} urgency</span></section>",
                urgency.badge_classes(),
                urgency.icon(),
                urgency
            ));
        }

        if analysis.should_see_doctor == Some(true) {
            html.push_str(
                "<section class=\"doctor-advice\">\
                 <p class=\"font-semibold text-red-700\">\
                 Based on your symptoms, we recommend consulting a doctor.</p>\
                 <button id=\"book-appointment-btn\" class=\"btn-primary\">\
                 Book an Appointment</button></section>",
            );
        }
    }

    html.push_str(
        "<footer class=\"disclaimer text-xs text-gray-400\">\
         This report is generated by an AI assistant and is not a medical \
         diagnosis. Always consult a qualified healthcare professional.\
         </footer></div>",
    );
    html
}

/// Degraded render from the symptom record alone.
pub fn render_basic(record: &SymptomRecord) -> String {
    let mut html = String::new();
    html.push_str("<div class=\"health-report basic\">");
    html.push_str(&format!(
        "<div class=\"report-header\"><h2 class=\"text-2xl font-bold\">Basic Health Assessment</h2>\
         <p class=\"text-gray-500\">Recorded on {}</p></div>",
        html_escape(&format_iso_date(record.created.as_deref()))
    ));

    if !record.transcript.is_empty() {
        html.push_str(&format!(
            "<section class=\"transcript\"><h3>Reported Symptoms</h3>\
             <p class=\"italic\">\"{}\"</p></section>",
            html_escape(&record.transcript)
        ));
    }
    if !record.symptoms.is_empty() {
        html.push_str(&format!(
            "<section class=\"symptoms\"><h3>Identified Symptoms</h3>\
             <div class=\"flex flex-wrap gap-2\">{}</div></section>",
            symptom_chips(&record.symptoms)
        ));
    }

    html.push_str(
        "<p class=\"text-gray-500\">A detailed analysis is not available for \
         this record yet. Please try again later.</p></div>",
    );
    html
}

/// Empty-state call-to-action.
pub fn render_no_reports() -> String {
    format!(
        "<div class=\"no-reports text-center\">\
         <i class=\"fas fa-file-medical text-4xl text-gray-300\"></i>\
         <h2 class=\"text-xl font-semibold\">{NO_REPORTS_HEADING}</h2>\
         <p class=\"text-gray-500\">Record your symptoms to generate your first health report.</p>\
         <a href=\"voice.html\" class=\"btn-primary\">Record Symptoms</a></div>"
    )
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
