// Credential and token endpoint wire types

use serde::{Deserialize, Serialize};

/// Credential pair held by the session and mirrored to the token store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl TokenPair {
    /// True when neither credential is present (logged out)
    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }
}

/// Authorization-code exchange request, sent form-encoded
#[derive(Serialize)]
pub struct CodeExchangeRequest<'a> {
    pub grant_type: &'a str,
    pub code: &'a str,
    pub redirect_uri: &'a str,
}

/// Refresh exchange request, sent as JSON
#[derive(Serialize)]
pub struct RefreshRequest<'a> {
    pub grant_type: &'a str,
    pub refresh_token: &'a str,
}

/// Token endpoint response, shared by both grant shapes
///
/// The authorization server also returns `expires_in`, `scope` and
/// `token_type`; only the two token strings are retained.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_pair_is_empty() {
        assert!(TokenPair::default().is_empty());

        let pair = TokenPair {
            access_token: Some("A".to_string()),
            refresh_token: None,
        };
        assert!(!pair.is_empty());
    }

    #[test]
    fn test_token_response_ignores_extra_fields() {
        let json = r#"{
            "access_token": "A",
            "refresh_token": "R",
            "token_type": "Bearer",
            "expires_in": 3600,
            "scope": "api.read openid"
        }"#;

        let response: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.access_token, "A");
        assert_eq!(response.refresh_token, "R");
        assert_eq!(response.expires_in, Some(3600));
    }

    #[test]
    fn test_token_response_requires_both_tokens() {
        let json = r#"{"access_token": "A"}"#;
        assert!(serde_json::from_str::<TokenResponse>(json).is_err());
    }
}
