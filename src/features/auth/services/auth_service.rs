use std::sync::Arc;

use crate::core::error::Result;
use crate::features::auth::dtos::LoginFormDto;
use crate::features::auth::model::Session;
use crate::modules::supabase::GoTrueClient;

/// A freshly issued session and how long it stays valid
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub session: Session,
    pub expires_in: u64,
}

/// Password sign-in and sign-out against the hosted auth service
pub struct AuthService {
    gotrue: Arc<GoTrueClient>,
}

impl AuthService {
    pub fn new(gotrue: Arc<GoTrueClient>) -> Self {
        Self { gotrue }
    }

    pub async fn login(&self, dto: &LoginFormDto) -> Result<IssuedSession> {
        let issued = self
            .gotrue
            .sign_in_with_password(dto.email.trim(), &dto.password)
            .await?;

        Ok(IssuedSession {
            session: Session {
                access_token: issued.access_token,
            },
            expires_in: issued.expires_in,
        })
    }

    pub async fn logout(&self, session: &Session) {
        self.gotrue.sign_out(&session.access_token).await;
    }
}
