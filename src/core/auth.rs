use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::error::CheckError;

pub const DEFAULT_TOKEN_URL: &str = "https://service-account.api.stackit.cloud/token";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 600;

// --- Service account key file ---

#[derive(Debug, Deserialize)]
pub struct ServiceAccountKey {
    pub id: String,
    pub credentials: KeyCredentials,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyCredentials {
    pub kid: String,
    pub iss: String,
    pub sub: String,
    pub aud: String,
    private_key: String,
}

impl std::fmt::Debug for KeyCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyCredentials")
            .field("kid", &self.kid)
            .field("iss", &self.iss)
            .field("sub", &self.sub)
            .field("aud", &self.aud)
            .finish_non_exhaustive()
    }
}

/// Default key location: ~/.stackit/sa-key.json
pub fn default_key_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("~"))
        .join(".stackit")
        .join("sa-key.json")
}

/// Read a service account key as downloaded from the portal.
pub fn read_service_account_key(path: &Path) -> Result<ServiceAccountKey> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let key: ServiceAccountKey = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse service account key {}", path.display()))?;
    if key.credentials.private_key.trim().is_empty() {
        anyhow::bail!("Empty private key in {}", path.display());
    }
    Ok(key)
}

// --- Token exchange ---

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    sub: &'a str,
    aud: &'a str,
    jti: String,
    iat: i64,
    exp: i64,
}

/// Build the RS512-signed JWT presented to the token endpoint.
fn build_assertion(key: &ServiceAccountKey, now: DateTime<Utc>) -> Result<String> {
    let creds = &key.credentials;
    let mut header = Header::new(Algorithm::RS512);
    header.kid = Some(creds.kid.clone());

    let iat = now.timestamp();
    let claims = AssertionClaims {
        iss: &creds.iss,
        sub: &creds.sub,
        aud: &creds.aud,
        jti: uuid::Uuid::new_v4().to_string(),
        iat,
        exp: iat + ASSERTION_LIFETIME_SECS,
    };

    let encoding_key = EncodingKey::from_rsa_pem(creds.private_key.as_bytes())
        .context("Invalid private key in service account key")?;
    jsonwebtoken::encode(&header, &claims, &encoding_key).context("Failed to sign JWT assertion")
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// Short-lived bearer token for API calls.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Exchange the key's signed assertion for an access token.
pub async fn exchange_token(
    client: &reqwest::Client,
    token_url: &str,
    key: &ServiceAccountKey,
) -> Result<AccessToken> {
    let assertion = build_assertion(key, Utc::now())?;
    debug!("Requesting access token for service account key {}", key.id);

    let response = client
        .post(token_url)
        .header("Accept", "application/json")
        .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
        .send()
        .await
        .context("Failed to send request to token endpoint")?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("HTTP {} from token endpoint: {}", status.as_u16(), body.trim());
    }

    let data: TokenResponse = response
        .json()
        .await
        .context("Failed to parse token endpoint response")?;
    match data.access_token {
        Some(token) if !token.is_empty() => Ok(AccessToken::new(token)),
        _ => anyhow::bail!("Token endpoint returned no access_token"),
    }
}

/// Load the key file and obtain a bearer token. Any failure is an `AuthError`.
pub async fn authenticate(
    client: &reqwest::Client,
    token_url: &str,
    key_path: &Path,
) -> Result<AccessToken, CheckError> {
    let key = read_service_account_key(key_path).map_err(CheckError::auth)?;
    exchange_token(client, token_url, &key)
        .await
        .map_err(CheckError::auth)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use jsonwebtoken::{DecodingKey, Validation};
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PRIVATE_PEM: &str = include_str!("../../testdata/test_rsa_private.pem");
    const PUBLIC_PEM: &str = include_str!("../../testdata/test_rsa_public.pem");

    pub(crate) fn key_json() -> String {
        serde_json::json!({
            "id": "key-1",
            "publicKey": "ignored",
            "active": true,
            "credentials": {
                "kid": "kid-1",
                "iss": "sa@sa.stackit.cloud",
                "sub": "sub-1",
                "aud": "https://stackit-service-account-prod.apps.01.cf.eu01.stackit.cloud",
                "privateKey": PRIVATE_PEM
            }
        })
        .to_string()
    }

    pub(crate) fn write_key_file() -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), key_json()).unwrap();
        file
    }

    #[derive(Deserialize)]
    struct DecodedClaims {
        iss: String,
        sub: String,
        jti: String,
        iat: i64,
        exp: i64,
    }

    #[test]
    fn parse_key_file_happy_path() {
        let file = write_key_file();
        let key = read_service_account_key(file.path()).unwrap();
        assert_eq!(key.id, "key-1");
        assert_eq!(key.credentials.kid, "kid-1");
    }

    #[test]
    fn debug_output_hides_private_key() {
        let key: ServiceAccountKey = serde_json::from_str(&key_json()).unwrap();
        let debug = format!("{:?}", key);
        assert!(!debug.contains("PRIVATE KEY"));
        assert_eq!(format!("{:?}", AccessToken::new("secret")), "AccessToken(***)");
    }

    #[test]
    fn missing_key_file_is_descriptive() {
        let err = read_service_account_key(Path::new("/nonexistent/sa-key.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }

    #[test]
    fn malformed_key_file_fails() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), r#"{"id": "x"}"#).unwrap();
        let err = read_service_account_key(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn assertion_is_signed_and_carries_claims() {
        let key: ServiceAccountKey = serde_json::from_str(&key_json()).unwrap();
        let token = build_assertion(&key, Utc::now()).unwrap();

        let header = jsonwebtoken::decode_header(&token).unwrap();
        assert_eq!(header.alg, Algorithm::RS512);
        assert_eq!(header.kid.as_deref(), Some("kid-1"));

        let mut validation = Validation::new(Algorithm::RS512);
        validation.set_audience(&[key.credentials.aud.as_str()]);
        let decoded = jsonwebtoken::decode::<DecodedClaims>(
            &token,
            &DecodingKey::from_rsa_pem(PUBLIC_PEM.as_bytes()).unwrap(),
            &validation,
        )
        .unwrap();
        assert_eq!(decoded.claims.iss, "sa@sa.stackit.cloud");
        assert_eq!(decoded.claims.sub, "sub-1");
        assert_eq!(decoded.claims.exp - decoded.claims.iat, ASSERTION_LIFETIME_SECS);
        assert!(!decoded.claims.jti.is_empty());
    }

    #[test]
    fn garbage_private_key_fails() {
        let mut key: ServiceAccountKey = serde_json::from_str(&key_json()).unwrap();
        key.credentials.private_key = "not a pem".to_string();
        let err = build_assertion(&key, Utc::now()).unwrap_err();
        assert!(err.to_string().contains("Invalid private key"));
    }

    #[tokio::test]
    async fn authenticate_exchanges_assertion_for_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer"))
            .and(body_string_contains("assertion="))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "at-123",
                "token_type": "Bearer",
                "expires_in": 3600
            })))
            .expect(1)
            .mount(&server)
            .await;

        let file = write_key_file();
        let token = authenticate(
            &reqwest::Client::new(),
            &format!("{}/token", server.uri()),
            file.path(),
        )
        .await
        .unwrap();
        assert_eq!(token.as_str(), "at-123");
    }

    #[tokio::test]
    async fn rejected_exchange_is_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
            .mount(&server)
            .await;

        let file = write_key_file();
        let err = authenticate(&reqwest::Client::new(), &server.uri(), file.path())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckError::Auth(_)));
        assert!(err.to_string().contains("invalid_grant"));
    }

    #[tokio::test]
    async fn missing_key_file_is_auth_error() {
        let err = authenticate(
            &reqwest::Client::new(),
            DEFAULT_TOKEN_URL,
            Path::new("/nonexistent/sa-key.json"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CheckError::Auth(_)));
    }
}
