use axum::{extract::Multipart, response::Response};
use chrono::{NaiveDateTime, Utc};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::appointments::dtos::AppointmentRequest;
use crate::features::appointments::services::{appointment_window, DATETIME_LOCAL_FORMAT};
use crate::shared::constants::{MSG_APPOINTMENT_BOOKED, MSG_APPOINTMENT_FAILED};
use crate::shared::flash::redirect_with_toast;
use crate::shared::toast::Toast;

const RETURN_TO: &str = "/#appointment";

/// Accept an appointment request and bounce back to the landing page
pub async fn book_appointment(mut multipart: Multipart) -> Response {
    let result = read_request(&mut multipart)
        .await
        .and_then(|request| check_request(request, Utc::now().naive_utc()));

    match result {
        Ok(request) => {
            tracing::info!(
                "Appointment requested: name={}, at={:?}, attachment={:?}",
                request.name,
                request.appointment_at,
                request.attachment_name
            );
            redirect_with_toast(RETURN_TO, &Toast::success(MSG_APPOINTMENT_BOOKED))
        }
        Err(e) => {
            tracing::warn!("Appointment request rejected: {}", e);
            redirect_with_toast(RETURN_TO, &Toast::error(MSG_APPOINTMENT_FAILED))
        }
    }
}

async fn read_request(multipart: &mut Multipart) -> Result<AppointmentRequest> {
    let mut request = AppointmentRequest::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid form data: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "prescription" => {
                let file_name = field.file_name().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read attachment: {}", e)))?;
                if !bytes.is_empty() {
                    tracing::debug!("Attachment {:?} received ({} bytes), not stored", file_name, bytes.len());
                    request.attachment_name = file_name;
                }
            }
            _ => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Invalid form field {}: {}", name, e)))?;
                let value = value.trim().to_string();
                match name.as_str() {
                    "name" => request.name = value,
                    "phone" => request.phone = value,
                    "appointment-date" if !value.is_empty() => {
                        let at = NaiveDateTime::parse_from_str(&value, DATETIME_LOCAL_FORMAT)
                            .map_err(|_| AppError::Validation("Invalid appointment time".to_string()))?;
                        request.appointment_at = Some(at);
                    }
                    "message" if !value.is_empty() => request.message = Some(value),
                    _ => {}
                }
            }
        }
    }

    Ok(request)
}

fn check_request(request: AppointmentRequest, now: NaiveDateTime) -> Result<AppointmentRequest> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    if let Some(at) = request.appointment_at {
        if !appointment_window(now.date()).contains(at) {
            return Err(AppError::Validation(
                "Appointment time must be tomorrow between 09:00 and 18:00".to_string(),
            ));
        }
    }

    Ok(request)
}
