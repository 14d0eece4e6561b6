use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::core::config::SupabaseConfig;
use crate::core::error::{AppError, Result};

/// Token response from `/auth/v1/token?grant_type=password`
#[derive(Debug, Clone, Deserialize)]
pub struct GoTrueSession {
    pub access_token: String,
    pub expires_in: u64,
    pub user: GoTrueUser,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoTrueUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
struct PasswordGrantRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// GoTrue reports errors in two shapes depending on its version
#[derive(Debug, Deserialize)]
struct GoTrueErrorResponse {
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
}

impl GoTrueErrorResponse {
    fn message(self) -> Option<String> {
        self.error_description.or(self.msg)
    }
}

/// Client for the hosted auth service
pub struct GoTrueClient {
    http_client: Client,
    auth_url: String,
    anon_key: String,
    configured: bool,
}

impl GoTrueClient {
    pub fn new(config: &SupabaseConfig) -> Self {
        Self {
            http_client: Client::new(),
            auth_url: format!("{}/auth/v1", config.url),
            anon_key: config.anon_key.clone(),
            configured: config.is_configured(),
        }
    }

    /// Exchange email and password for a session
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<GoTrueSession> {
        if !self.configured {
            return Err(AppError::ExternalServiceError(
                "Supabase is not configured".to_string(),
            ));
        }

        let url = format!("{}/token", self.auth_url);

        tracing::debug!("Signing in {} via GoTrue", email);

        let response = self
            .http_client
            .post(&url)
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&PasswordGrantRequest { email, password })
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to reach GoTrue: {}", e);
                AppError::ExternalServiceError(format!("Failed to reach auth service: {}", e))
            })?;

        let status = response.status();
        if status.is_success() {
            let session = response.json::<GoTrueSession>().await.map_err(|e| {
                tracing::error!("Failed to parse GoTrue session: {}", e);
                AppError::ExternalServiceError(format!("Failed to parse auth response: {}", e))
            })?;
            tracing::info!("Admin signed in: {}", session.user.id);
            return Ok(session);
        }

        let body = response.text().await.unwrap_or_default();

        // 400 = wrong credentials or unconfirmed email
        if status.as_u16() == 400 {
            let message = serde_json::from_str::<GoTrueErrorResponse>(&body)
                .ok()
                .and_then(GoTrueErrorResponse::message)
                .unwrap_or_else(|| "Invalid login credentials".to_string());
            return Err(AppError::Unauthorized(message));
        }

        tracing::error!("GoTrue error: HTTP {} - {}", status, body);
        Err(AppError::ExternalServiceError(format!(
            "Auth service error: HTTP {}",
            status
        )))
    }

    /// Revoke the session's refresh tokens
    ///
    /// Best-effort: the local session cookie is dropped regardless.
    pub async fn sign_out(&self, access_token: &str) {
        if !self.configured {
            return;
        }

        let url = format!("{}/logout", self.auth_url);
        let result = self
            .http_client
            .post(&url)
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                tracing::debug!("GoTrue session revoked");
            }
            Ok(response) => {
                tracing::warn!("GoTrue logout returned HTTP {}", response.status());
            }
            Err(e) => {
                tracing::warn!("Failed to reach GoTrue for logout: {}", e);
            }
        }
    }
}
