use axum::{routing::post, Router};

use crate::features::appointments::handlers;

/// Landing page appointment form (public)
pub fn routes() -> Router {
    Router::new().route("/appointments", post(handlers::book_appointment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, StatusCode};
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;

    fn cookie(response: &axum_test::TestResponse) -> String {
        response
            .header(header::SET_COOKIE)
            .to_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_booking_redirects_with_success_toast() {
        let server = TestServer::new(routes()).unwrap();

        let form = MultipartForm::new()
            .add_text("name", "Asha")
            .add_text("phone", "+91 98765 43210")
            .add_text("message", "Refill for my mother")
            .add_part(
                "prescription",
                Part::bytes(vec![0xFF, 0xD8, 0xFF])
                    .file_name("rx.jpg")
                    .mime_type("image/jpeg"),
            );

        let response = server.post("/appointments").multipart(form).await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header(header::LOCATION), "/#appointment");
        assert!(cookie(&response).starts_with("flash=success:Appointment%20booked%20successfully"));
    }

    #[tokio::test]
    async fn test_invalid_booking_redirects_with_error_toast() {
        let server = TestServer::new(routes()).unwrap();

        let form = MultipartForm::new()
            .add_text("name", "")
            .add_text("phone", "nope");

        let response = server.post("/appointments").multipart(form).await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert!(cookie(&response).starts_with("flash=error:An%20error%20occurred"));
    }
}
