/// An admin's backend session, taken from the session cookie or a bearer
/// header. The token itself is checked by the backend on every write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
}

impl Session {
    /// `None` for an empty or whitespace-only token
    pub fn from_token(token: &str) -> Option<Self> {
        let token = token.trim();
        if token.is_empty() {
            None
        } else {
            Some(Self {
                access_token: token.to_string(),
            })
        }
    }
}
