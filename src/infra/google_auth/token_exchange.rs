// Shared plumbing for talking to Google's token endpoint.

use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;

use super::token_cache::StoredToken;
use crate::core::auth::AuthError;

/// Response from Google's token endpoint.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

impl TokenResponse {
    /// Converts the response into a cacheable token.
    /// A missing refresh token (normal on refresh) falls back to `previous_refresh`.
    pub fn into_stored(
        self,
        now: DateTime<Utc>,
        previous_refresh: Option<String>,
        requested_scopes: &[&str],
    ) -> StoredToken {
        let scopes = match self.scope {
            Some(scope) => scope.split_whitespace().map(str::to_string).collect(),
            None => requested_scopes.iter().map(|s| s.to_string()).collect(),
        };

        StoredToken {
            access_token: self.access_token,
            refresh_token: self.refresh_token.or(previous_refresh),
            expiry: self.expires_in.map(|secs| now + Duration::seconds(secs)),
            scopes,
        }
    }
}

/// POSTs a form to the token endpoint and decodes the answer.
pub async fn request_token(
    client: &Client,
    token_uri: &str,
    form: &[(&str, &str)],
) -> Result<TokenResponse, AuthError> {
    let response = client
        .post(token_uri)
        .form(form)
        .send()
        .await
        .map_err(|e| AuthError::TokenExchange(e.to_string()))?;

    if !response.status().is_success() {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AuthError::TokenExchange(e.to_string()))?;
        return Err(AuthError::TokenExchange(format!("({}): {}", status, text)));
    }

    response
        .json()
        .await
        .map_err(|e| AuthError::TokenExchange(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_without_new_refresh_token_keeps_the_old_one() {
        let response: TokenResponse = serde_json::from_str(
            r#"{"access_token":"new","expires_in":3599,"token_type":"Bearer"}"#,
        )
        .unwrap();
        let now = Utc::now();
        let stored = response.into_stored(now, Some("old-refresh".into()), &["a", "b"]);

        assert_eq!(stored.access_token, "new");
        assert_eq!(stored.refresh_token.as_deref(), Some("old-refresh"));
        assert_eq!(stored.expiry, Some(now + Duration::seconds(3599)));
        assert_eq!(stored.scopes, vec!["a", "b"]);
    }

    #[test]
    fn granted_scopes_come_from_the_response() {
        let response: TokenResponse = serde_json::from_str(
            r#"{"access_token":"t","refresh_token":"r","scope":"x y"}"#,
        )
        .unwrap();
        let stored = response.into_stored(Utc::now(), Some("old".into()), &["a"]);

        assert_eq!(stored.refresh_token.as_deref(), Some("r"));
        assert_eq!(stored.expiry, None);
        assert_eq!(stored.scopes, vec!["x", "y"]);
    }
}
