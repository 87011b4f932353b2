//! Appointment flow: booking form validation, booking, list rendering,
//! and the intentionally unimplemented cancel/reschedule actions.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::backend::BackendApi;
use crate::models::{Appointment, BookingRequest, UrgencyTier};
use crate::report::html_escape;

/// The bookable half-hour slots, as offered by the form.
pub const TIME_SLOTS: [&str; 6] = ["09:00", "10:00", "11:00", "14:00", "15:00", "16:00"];

/// Fixed texts for the not-yet-built actions.
pub const CANCEL_PENDING_MESSAGE: &str =
    "Appointment cancellation feature will be implemented soon.";
pub const RESCHEDULE_PENDING_MESSAGE: &str =
    "Appointment rescheduling feature will be implemented soon.";

// ═══════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════

/// Booking validation and transport errors; Display strings are shown
/// to the user as-is.
#[derive(Debug, thiserror::Error)]
pub enum AppointmentError {
    #[error("No symptom record to book an appointment for.")]
    MissingSymptomId,
    #[error("Please choose a date from today onwards.")]
    InvalidDate,
    #[error("Please choose one of the available time slots.")]
    InvalidSlot,
    #[error("{0}")]
    Backend(#[from] crate::backend::BackendError),
}

// ═══════════════════════════════════════════════════════════
// Booking
// ═══════════════════════════════════════════════════════════

/// Raw form input as entered on the page.
#[derive(Debug, Clone, Default)]
pub struct BookingForm {
    pub preferred_date: String,
    pub preferred_time: String,
    /// Absent selection defaults to medium.
    pub urgency: Option<UrgencyTier>,
    pub notes: String,
}

impl BookingForm {
    /// Validate the form locally; no network is touched on failure.
    pub fn validate(
        &self,
        user_id: &str,
        symptom_id: Option<&str>,
        today: NaiveDate,
    ) -> Result<BookingRequest, AppointmentError> {
        let symptom_id = symptom_id.ok_or(AppointmentError::MissingSymptomId)?;

        let date = NaiveDate::parse_from_str(self.preferred_date.trim(), "%Y-%m-%d")
            .map_err(|_| AppointmentError::InvalidDate)?;
        if date < today {
            return Err(AppointmentError::InvalidDate);
        }

        let slot = self.preferred_time.trim();
        if !TIME_SLOTS.contains(&slot) {
            return Err(AppointmentError::InvalidSlot);
        }

        Ok(BookingRequest {
            user_id: user_id.to_string(),
            symptom_id: symptom_id.to_string(),
            preferred_date: date.format("%Y-%m-%d").to_string(),
            preferred_time: slot.to_string(),
            urgency: self.urgency.unwrap_or_default(),
            notes: self.notes.trim().to_string(),
        })
    }
}

/// Successful booking, shaped for the page banner.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingConfirmation {
    pub appointment_id: String,
    pub message: String,
    /// Where the banner's "view appointments" link points.
    pub appointments_link: String,
}

/// Validate and submit a booking.
pub fn book(
    backend: &dyn BackendApi,
    form: &BookingForm,
    user_id: &str,
    symptom_id: Option<&str>,
    today: NaiveDate,
) -> Result<BookingConfirmation, AppointmentError> {
    let request = form.validate(user_id, symptom_id, today)?;
    let appointment_id = backend.book_appointment(&request)?;
    info!(%appointment_id, "Appointment booked");
    Ok(BookingConfirmation {
        appointment_id,
        message: "Appointment booked successfully.".to_string(),
        appointments_link: "appointments.html".to_string(),
    })
}

// ═══════════════════════════════════════════════════════════
// List rendering
// ═══════════════════════════════════════════════════════════

/// Fetch and render the user's appointment cards.
pub fn load_appointments(
    backend: &dyn BackendApi,
    user_id: &str,
) -> Result<String, AppointmentError> {
    let appointments = backend.appointments(user_id)?;
    Ok(render_appointments(&appointments))
}

/// Assemble the list HTML; an empty list gets its placeholder.
pub fn render_appointments(appointments: &[Appointment]) -> String {
    if appointments.is_empty() {
        return "<div class=\"no-appointments text-center\">\
                <i class=\"fas fa-calendar-times text-4xl text-gray-300\"></i>\
                <p class=\"text-gray-500\">No appointments scheduled.</p></div>"
            .to_string();
    }

    let mut html = String::from("<div class=\"appointments-list\">");
    for appointment in appointments {
        html.push_str(&render_card(appointment));
    }
    html.push_str("</div>");
    html
}

fn render_card(appointment: &Appointment) -> String {
    let date = appointment.preferred_date.as_deref().unwrap_or("Not set");
    let time = appointment.preferred_time.as_deref().unwrap_or("");
    let symptoms = if appointment.symptoms.is_empty() {
        "None recorded".to_string()
    } else {
        html_escape(&appointment.symptoms.join(", "))
    };

    format!(
        "<div class=\"appointment-card\" data-id=\"{id}\">\
         <div class=\"card-header\"><span class=\"font-semibold\">{date} {time}</span>\
         <span class=\"status {status_color}\">{status}</span></div>\
         <p class=\"symptoms text-sm\">Symptoms: {symptoms}</p>\
         <p class=\"urgency {urgency_color}\">{urgency} urgency</p>\
         <p class=\"notes text-sm text-gray-600\">{notes}</p>\
         <div class=\"card-actions\">\
         <button class=\"reschedule-btn\" data-id=\"{id}\">Reschedule</button>\
         <button class=\"cancel-btn\" data-id=\"{id}\">Cancel</button>\
         </div></div>",
        id = html_escape(&appointment.id),
        date = html_escape(date),
        time = html_escape(time),
        status = appointment.status,
        status_color = appointment.status.text_color(),
        symptoms = symptoms,
        urgency = appointment.urgency,
        urgency_color = appointment.urgency.text_color(),
        notes = html_escape(&appointment.notes),
    )
}

// ═══════════════════════════════════════════════════════════
// Unimplemented actions
// ═══════════════════════════════════════════════════════════

/// Cancellation is not built yet; only the fixed message is produced.
pub fn cancel_appointment(_appointment_id: &str) -> String {
    CANCEL_PENDING_MESSAGE.to_string()
}

/// Rescheduling is not built yet; only the fixed message is produced.
pub fn reschedule_appointment(_appointment_id: &str) -> String {
    RESCHEDULE_PENDING_MESSAGE.to_string()
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
