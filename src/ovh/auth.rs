//! Credentials
//!
//! Request signing is handled outside of this client; the only credential
//! carried here is an optional OAuth2 access token sent as a bearer token.

use crate::config::Config;

#[derive(Clone, Default)]
pub struct Credentials {
    access_token: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Security: never print the token itself
        f.debug_struct("Credentials")
            .field("access_token", &self.access_token.as_ref().map(|_| "***"))
            .finish()
    }
}

impl Credentials {
    pub fn from_token(token: impl Into<String>) -> Self {
        Self {
            access_token: Some(token.into()),
        }
    }

    /// Credentials from the loaded configuration (file or environment)
    pub fn from_config(config: &Config) -> Self {
        Self {
            access_token: config.effective_access_token(),
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }
}
