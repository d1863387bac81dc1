//! Credential strategies applied to every outbound backend request.

use reqwest::RequestBuilder;

/// Attaches credentials to a request before it is sent.
pub trait RequestAuth: Send + Sync {
    /// Decorate `request` with the credentials this strategy carries.
    fn apply(&self, request: RequestBuilder) -> RequestBuilder;
}

/// `Authorization: Bearer <key>` authentication used by SparkyFitness API keys.
pub struct BearerAuth {
    api_key: String,
}

impl BearerAuth {
    /// Wrap an API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }
}

impl RequestAuth for BearerAuth {
    fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(&self.api_key)
    }
}

impl std::fmt::Debug for BearerAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerAuth")
            .field("api_key", &"<redacted>")
            .finish()
    }
}
