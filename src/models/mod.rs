pub mod activity;
pub mod appointment;
pub mod enums;
pub mod medical_info;
pub mod prediction;
pub mod report;
pub mod symptom;
pub mod user;

pub use activity::{ActivityEntry, ActivityKind};
pub use appointment::{Appointment, AppointmentPatientInfo, BookingRequest};
pub use enums::{AppointmentStatus, ConfidenceTier, UrgencyTier};
pub use medical_info::MedicalInformation;
pub use prediction::{PossibleAilment, Prediction};
pub use report::{HealthReportView, RawHealthReport};
pub use symptom::SymptomRecord;
pub use user::{PatientInfo, UserProfile};
