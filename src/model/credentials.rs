use base64::Engine;

#[derive(Clone)]
pub struct Credentials {
    pub user: String,
    pub personal_token: String,
}

impl Credentials {
    pub fn new(user: String, personal_token: String) -> Self {
        Self {
            user,
            personal_token,
        }
    }

    /// `Basic` header value shared by every request of a run.
    pub fn authorization_header(&self) -> String {
        let creds = format!("{}:{}", self.user, self.personal_token);
        let encoded = base64::engine::general_purpose::STANDARD.encode(creds);
        format!("Basic {encoded}")
    }
}

// Keep the token out of debug output and logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("personal_token", &"***")
            .finish()
    }
}
