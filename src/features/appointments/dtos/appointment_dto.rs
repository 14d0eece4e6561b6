use chrono::NaiveDateTime;
use validator::Validate;

use crate::shared::validation::PHONE_REGEX;

/// Appointment / prescription request from the landing page.
///
/// The attached prescription is only acknowledged by name; its contents are
/// not kept.
#[derive(Debug, Default, Validate)]
pub struct AppointmentRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(regex(path = *PHONE_REGEX, message = "Invalid phone number"))]
    pub phone: String,

    pub appointment_at: Option<NaiveDateTime>,

    #[validate(length(max = 1000, message = "Message must not exceed 1000 characters"))]
    pub message: Option<String>,

    pub attachment_name: Option<String>,
}
