// Installed-application OAuth flow with an on-disk token cache.
//
// **Token lifecycle:**
// 1. Cached token still fresh and granted our scopes -> use it
// 2. Cached token expired but has a refresh token -> refresh it
// 3. Otherwise (or if refreshing fails) -> ask the user for consent
//
// Every new token is written back to the cache file.

use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use reqwest::{Client, Url};
use serde::Deserialize;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::RwLock;

use super::token_cache::{StoredToken, TokenCacheFile};
use super::token_exchange::request_token;
use super::{default_auth_uri, default_token_uri, SCOPES};
use crate::core::auth::{AuthError, TokenProvider};

/// The registered OAuth client, as found in the downloaded credentials file.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecret {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

/// Google wraps the client under "installed" (desktop apps) or "web".
#[derive(Debug, Deserialize)]
struct ClientSecretFile {
    installed: Option<ClientSecret>,
    web: Option<ClientSecret>,
}

impl ClientSecret {
    pub fn from_json(json: &str) -> Result<Self, AuthError> {
        let file: ClientSecretFile = serde_json::from_str(json)
            .map_err(|e| AuthError::InvalidCredentials(e.to_string()))?;
        file.installed.or(file.web).ok_or_else(|| {
            AuthError::InvalidCredentials(
                "expected an \"installed\" or \"web\" client section".to_string(),
            )
        })
    }
}

/// What came back to the loopback listener.
#[derive(Debug, PartialEq, Eq)]
enum Redirect {
    Code { code: String, state: Option<String> },
    Denied(String),
    /// Favicon requests and the like.
    Unrelated,
}

pub struct InstalledAppAuth {
    secret: ClientSecret,
    cache: TokenCacheFile,
    client: Client,
    current: RwLock<Option<StoredToken>>,
}

impl InstalledAppAuth {
    /// Loads the client file (required) and the token cache (optional).
    pub async fn from_files(
        credentials_path: &Path,
        token_path: &Path,
    ) -> Result<Self, AuthError> {
        if !credentials_path.exists() {
            return Err(AuthError::MissingCredentials(
                credentials_path.display().to_string(),
            ));
        }

        let json = tokio::fs::read_to_string(credentials_path)
            .await
            .map_err(|e| {
                AuthError::InvalidCredentials(format!("{}: {}", credentials_path.display(), e))
            })?;
        let secret = ClientSecret::from_json(&json)?;

        let cache = TokenCacheFile::new(token_path);
        let current = match cache.load().await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!("Ignoring unreadable token cache: {}", e);
                None
            }
        };

        Ok(Self {
            secret,
            cache,
            client: Client::new(),
            current: RwLock::new(current),
        })
    }

    async fn refresh(
        &self,
        token: &StoredToken,
        refresh_token: &str,
    ) -> Result<StoredToken, AuthError> {
        tracing::info!("Refreshing cached access token");
        let response = request_token(
            &self.client,
            &self.secret.token_uri,
            &[
                ("client_id", self.secret.client_id.as_str()),
                ("client_secret", self.secret.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ],
        )
        .await?;

        let mut stored = response.into_stored(Utc::now(), token.refresh_token.clone(), SCOPES);
        if stored.scopes.is_empty() {
            stored.scopes = token.scopes.clone();
        }
        Ok(stored)
    }

    /// Runs the browser consent flow against a loopback redirect.
    async fn authorize(&self) -> Result<StoredToken, AuthError> {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| AuthError::Consent(format!("cannot open loopback listener: {}", e)))?;
        let port = listener
            .local_addr()
            .map_err(|e| AuthError::Consent(e.to_string()))?
            .port();
        let redirect_uri = format!("http://127.0.0.1:{}/", port);
        let state = random_state();

        let auth_url = authorization_url(&self.secret, &redirect_uri, &state)?;
        println!("Please visit this URL to authorize this application:\n{}", auth_url);

        let code = wait_for_code(&listener, &state).await?;

        let response = request_token(
            &self.client,
            &self.secret.token_uri,
            &[
                ("code", code.as_str()),
                ("client_id", self.secret.client_id.as_str()),
                ("client_secret", self.secret.client_secret.as_str()),
                ("redirect_uri", redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ],
        )
        .await?;

        tracing::info!("Authorization complete");
        Ok(response.into_stored(Utc::now(), None, SCOPES))
    }
}

#[async_trait]
impl TokenProvider for InstalledAppAuth {
    async fn access_token(&self) -> Result<String, AuthError> {
        {
            let current = self.current.read().await;
            if let Some(token) = current.as_ref() {
                if token.is_fresh(Utc::now()) && token.covers(SCOPES) {
                    return Ok(token.access_token.clone());
                }
            }
        }

        let mut current = self.current.write().await;
        let previous = current.take().filter(|token| token.covers(SCOPES));

        let token = match previous {
            Some(previous) => match previous.refresh_token.as_deref() {
                Some(refresh_token) => match self.refresh(&previous, refresh_token).await {
                    Ok(token) => token,
                    Err(e) => {
                        tracing::warn!("Token refresh failed ({}), asking for consent again", e);
                        self.authorize().await?
                    }
                },
                None => self.authorize().await?,
            },
            None => self.authorize().await?,
        };

        if let Err(e) = self.cache.save(&token).await {
            tracing::warn!(
                "Could not save token to {}: {}",
                self.cache.path().display(),
                e
            );
        }

        let access_token = token.access_token.clone();
        *current = Some(token);
        Ok(access_token)
    }
}

fn random_state() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

fn authorization_url(
    secret: &ClientSecret,
    redirect_uri: &str,
    state: &str,
) -> Result<Url, AuthError> {
    let scope = SCOPES.join(" ");
    Url::parse_with_params(
        &secret.auth_uri,
        &[
            ("response_type", "code"),
            ("client_id", secret.client_id.as_str()),
            ("redirect_uri", redirect_uri),
            ("scope", scope.as_str()),
            ("state", state),
            ("access_type", "offline"),
            ("prompt", "consent"),
        ],
    )
    .map_err(|e| AuthError::InvalidCredentials(format!("auth_uri: {}", e)))
}

/// Accepts loopback connections until the OAuth redirect arrives.
async fn wait_for_code(listener: &TcpListener, expected_state: &str) -> Result<String, AuthError> {
    loop {
        let (mut stream, _) = listener
            .accept()
            .await
            .map_err(|e| AuthError::Consent(e.to_string()))?;

        let request_line = read_request_line(&mut stream).await?;
        match parse_redirect(&request_line) {
            Redirect::Unrelated => {
                respond(&mut stream, "404 Not Found", "Not found").await;
            }
            Redirect::Denied(reason) => {
                respond(
                    &mut stream,
                    "200 OK",
                    "Authorization was denied. You may close this window.",
                )
                .await;
                return Err(AuthError::Consent(format!("access denied: {}", reason)));
            }
            Redirect::Code { code, state } => {
                if state.as_deref() != Some(expected_state) {
                    respond(&mut stream, "400 Bad Request", "State mismatch.").await;
                    return Err(AuthError::Consent("state parameter mismatch".to_string()));
                }
                respond(
                    &mut stream,
                    "200 OK",
                    "The authentication flow has completed. You may close this window.",
                )
                .await;
                return Ok(code);
            }
        }
    }
}

/// Reads until the end of the HTTP request line (or 8 KiB).
async fn read_request_line(stream: &mut TcpStream) -> Result<String, AuthError> {
    let mut buffer = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];

    while !buffer.windows(2).any(|w| w == b"\r\n") && buffer.len() < 8192 {
        let read = stream
            .read(&mut chunk)
            .await
            .map_err(|e| AuthError::Consent(e.to_string()))?;
        if read == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..read]);
    }

    let text = String::from_utf8_lossy(&buffer);
    Ok(text.lines().next().unwrap_or_default().to_string())
}

async fn respond(stream: &mut TcpStream, status: &str, message: &str) {
    let body = format!("<html><body><p>{}</p></body></html>", message);
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    if let Err(e) = stream.write_all(response.as_bytes()).await {
        tracing::debug!("Failed to answer loopback request: {}", e);
    }
}

/// Parses `GET /?state=..&code=.. HTTP/1.1`.
fn parse_redirect(request_line: &str) -> Redirect {
    let mut parts = request_line.split_whitespace();
    let (Some("GET"), Some(target)) = (parts.next(), parts.next()) else {
        return Redirect::Unrelated;
    };

    let Ok(url) = Url::parse(&format!("http://127.0.0.1{}", target)) else {
        return Redirect::Unrelated;
    };

    let mut code = None;
    let mut state = None;
    let mut error = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }

    match (code, error) {
        (_, Some(error)) => Redirect::Denied(error),
        (Some(code), None) => Redirect::Code { code, state },
        (None, None) => Redirect::Unrelated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CLIENT_FILE: &str = r#"{
        "installed": {
            "client_id": "id.apps.googleusercontent.com",
            "client_secret": "shh",
            "auth_uri": "https://accounts.google.com/o/oauth2/auth",
            "token_uri": "https://oauth2.googleapis.com/token",
            "redirect_uris": ["http://localhost"]
        }
    }"#;

    #[test]
    fn installed_and_web_sections_are_accepted() {
        let installed = ClientSecret::from_json(CLIENT_FILE).unwrap();
        assert_eq!(installed.client_id, "id.apps.googleusercontent.com");

        let web = ClientSecret::from_json(r#"{"web":{"client_id":"w","client_secret":"s"}}"#)
            .unwrap();
        assert_eq!(web.client_id, "w");
        assert_eq!(web.token_uri, "https://oauth2.googleapis.com/token");
    }

    #[test]
    fn client_file_without_section_is_invalid() {
        let err = ClientSecret::from_json(r#"{"other":{}}"#).unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials(_)));
    }

    #[test]
    fn authorization_url_carries_scopes_and_state() {
        let secret = ClientSecret::from_json(CLIENT_FILE).unwrap();
        let url = authorization_url(&secret, "http://127.0.0.1:8080/", "xyz").unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();

        assert!(pairs.contains(&("state".into(), "xyz".into())));
        assert!(pairs.contains(&("access_type".into(), "offline".into())));
        assert!(pairs.contains(&("redirect_uri".into(), "http://127.0.0.1:8080/".into())));
        assert!(pairs.contains(&("scope".into(), SCOPES.join(" "))));
    }

    #[test]
    fn redirect_with_code_is_parsed() {
        assert_eq!(
            parse_redirect("GET /?state=abc&code=4%2F0Ab&scope=x HTTP/1.1"),
            Redirect::Code {
                code: "4/0Ab".into(),
                state: Some("abc".into())
            }
        );
    }

    #[test]
    fn denied_and_unrelated_requests() {
        assert_eq!(
            parse_redirect("GET /?error=access_denied&state=abc HTTP/1.1"),
            Redirect::Denied("access_denied".into())
        );
        assert_eq!(parse_redirect("GET /favicon.ico HTTP/1.1"), Redirect::Unrelated);
        assert_eq!(parse_redirect("POST /?code=x HTTP/1.1"), Redirect::Unrelated);
        assert_eq!(parse_redirect(""), Redirect::Unrelated);
    }

    #[test]
    fn states_are_random() {
        let a = random_state();
        assert_eq!(a.len(), 32);
        assert_ne!(a, random_state());
    }

    #[tokio::test]
    async fn missing_client_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let err = InstalledAppAuth::from_files(
            &dir.path().join("credentials.json"),
            &dir.path().join("token.json"),
        )
        .await
        .err()
        .unwrap();
        assert!(matches!(err, AuthError::MissingCredentials(_)));
    }

    #[tokio::test]
    async fn fresh_cached_token_is_used_without_network() {
        let dir = TempDir::new().unwrap();
        let credentials = dir.path().join("credentials.json");
        std::fs::write(&credentials, CLIENT_FILE).unwrap();

        let cache = TokenCacheFile::new(dir.path().join("token.json"));
        cache
            .save(&StoredToken {
                access_token: "cached".into(),
                refresh_token: Some("r".into()),
                expiry: Some(Utc::now() + chrono::Duration::hours(1)),
                scopes: SCOPES.iter().map(|s| s.to_string()).collect(),
            })
            .await
            .unwrap();

        let auth = InstalledAppAuth::from_files(&credentials, cache.path())
            .await
            .unwrap();
        assert_eq!(auth.access_token().await.unwrap(), "cached");
    }
}
