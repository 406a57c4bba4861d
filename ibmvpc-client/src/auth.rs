//! IAM authentication
//!
//! Exchanges an IBM Cloud API key for a bearer token at the IAM token
//! endpoint. The token is reused until shortly before it expires.

use std::time::{Duration, Instant};

use serde::Deserialize;
use tokio::sync::Mutex;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

const APIKEY_GRANT_TYPE: &str = "urn:ibm:params:oauth:grant-type:apikey";
/// Refresh this long before the reported expiry
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Source of bearer tokens for API requests
pub enum Authenticator {
    Iam(IamAuthenticator),
    /// A pre-issued token, used as-is
    Bearer(String),
}

impl Authenticator {
    pub async fn token(&self, http: &reqwest::Client) -> Result<String> {
        match self {
            Authenticator::Iam(iam) => iam.token(http).await,
            Authenticator::Bearer(token) => Ok(token.clone()),
        }
    }
}

pub struct IamAuthenticator {
    token_url: String,
    api_key: String,
    cached: Mutex<Option<CachedToken>>,
}

struct CachedToken {
    access_token: String,
    refresh_at: Instant,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    /// Lifetime in seconds
    expires_in: u64,
}

impl IamAuthenticator {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            token_url: config.token_url(),
            api_key: config.api_key.clone(),
            cached: Mutex::new(None),
        }
    }

    pub async fn token(&self, http: &reqwest::Client) -> Result<String> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref()
            && Instant::now() < token.refresh_at
        {
            return Ok(token.access_token.clone());
        }

        log::debug!("Requesting IAM token from {}", self.token_url);
        let response = http
            .post(&self.token_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[
                ("grant_type", APIKEY_GRANT_TYPE),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ClientError::Auth(format!(
                "token request returned HTTP {}: {}",
                status.as_u16(),
                error_message(&body)
            )));
        }

        let token: TokenResponse = serde_json::from_str(&body)?;
        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(EXPIRY_MARGIN);
        *cached = Some(CachedToken {
            access_token: token.access_token.clone(),
            refresh_at: Instant::now() + lifetime,
        });
        Ok(token.access_token)
    }
}

/// IAM reports failures as `{"errorCode", "errorMessage"}`
fn error_message(body: &str) -> String {
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct IamError {
        error_code: Option<String>,
        error_message: String,
    }

    match serde_json::from_str::<IamError>(body) {
        Ok(e) => match e.error_code {
            Some(code) => format!("{} ({})", e.error_message, code),
            None => e.error_message,
        },
        Err(_) => body.trim().to_string(),
    }
}
