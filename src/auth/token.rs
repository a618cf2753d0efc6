use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AuthConfig;
use crate::error::{AppError, AppResult};

/// Intended use of a token, carried in the `typ` claim.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject of the token: the user's id, stringified.
    pub sub: String,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    pub typ: TokenKind,
}

impl Claims {
    /// The subject parsed back into a user id, if it is one.
    pub fn user_id(&self) -> Option<i32> {
        self.sub.parse().ok()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }
}

/// Why a token was rejected. Callers at the HTTP boundary collapse all of these into
/// one generic authentication failure; the distinction only feeds the logs.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InvalidToken {
    #[error("token has expired")]
    Expired,
    #[error("token signature does not match")]
    BadSignature,
    #[error("token is malformed")]
    Malformed,
}

impl From<jsonwebtoken::errors::Error> for InvalidToken {
    fn from(error: jsonwebtoken::errors::Error) -> Self {
        match error.kind() {
            ErrorKind::ExpiredSignature => InvalidToken::Expired,
            ErrorKind::InvalidSignature => InvalidToken::BadSignature,
            _ => InvalidToken::Malformed,
        }
    }
}

/// Access and refresh tokens returned by register, login and refresh.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
}

/// Issues and verifies stateless HMAC-signed tokens.
///
/// There is no revocation list: a token stays valid until its `exp`, even if it
/// leaks, and refresh tokens may be replayed until they expire.
pub struct TokenService {
    header: Header,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> AppResult<Self> {
        let access_ttl = Duration::try_minutes(config.access_token_expire_minutes)
            .ok_or_else(|| AppError::Internal("Access token lifetime out of range".into()))?;
        let refresh_ttl = Duration::try_days(config.refresh_token_expire_days)
            .ok_or_else(|| AppError::Internal("Refresh token lifetime out of range".into()))?;

        Ok(Self::with_ttl(
            config.secret_key.as_bytes(),
            config.algorithm,
            access_ttl,
            refresh_ttl,
        ))
    }

    pub fn with_ttl(
        secret: &[u8],
        algorithm: Algorithm,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.leeway = 0;

        Self {
            header: Header::new(algorithm),
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn issue_access(&self, subject: &str) -> AppResult<String> {
        self.issue(subject, TokenKind::Access, self.access_ttl)
    }

    pub fn issue_refresh(&self, subject: &str) -> AppResult<String> {
        self.issue(subject, TokenKind::Refresh, self.refresh_ttl)
    }

    pub fn issue_pair(&self, subject: &str) -> AppResult<TokenPair> {
        Ok(TokenPair {
            access_token: self.issue_access(subject)?,
            refresh_token: self.issue_refresh(subject)?,
            token_type: "bearer".to_string(),
        })
    }

    /// Checks signature and expiry. Never panics on attacker-controlled input.
    pub fn verify(&self, token: &str) -> Result<Claims, InvalidToken> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(InvalidToken::from)
    }

    fn issue(&self, subject: &str, typ: TokenKind, ttl: Duration) -> AppResult<String> {
        let now = Utc::now();
        let expires = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AppError::Internal("Token expiry overflows the calendar".into()))?;
        let claims = Claims {
            sub: subject.to_string(),
            exp: expires.timestamp(),
            iat: now.timestamp(),
            typ,
        };

        encode(&self.header, &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
    }
}
