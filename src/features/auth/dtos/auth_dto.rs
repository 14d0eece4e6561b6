use serde::Deserialize;
use validator::Validate;

/// Admin login form
#[derive(Debug, Deserialize, Validate)]
pub struct LoginFormDto {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_form_validation() {
        let dto = LoginFormDto {
            email: "admin@example.com".to_string(),
            password: "secret".to_string(),
        };
        assert!(dto.validate().is_ok());

        let dto = LoginFormDto {
            email: "not-an-email".to_string(),
            password: String::new(),
        };
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
        assert!(errors.field_errors().contains_key("password"));
    }
}
