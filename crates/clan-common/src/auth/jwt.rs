//! Signed tokens for caller sessions and identity picks
//!
//! Two kinds of token share one signing key:
//! - `session`: who the caller is. Issued after the platform OAuth
//!   exchange and carried as a cookie or bearer token.
//! - `resolve`: an opaque handle for one guild member returned by member
//!   search, so staff pick a candidate without typing raw platform ids.

use chrono::{Duration, Utc};
use clan_core::Snowflake;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Session,
    Resolve,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Platform user id (session) or candidate id (resolve)
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub kind: TokenKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl SessionClaims {
    /// # Errors
    /// Returns an error if the subject is not a snowflake
    pub fn subject_id(&self) -> Result<Snowflake, AppError> {
        Snowflake::parse(&self.sub).map_err(|_| AppError::InvalidToken)
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    session_ttl_secs: i64,
    resolve_ttl_secs: i64,
}

impl JwtService {
    #[must_use]
    pub fn new(secret: &str, session_ttl_secs: i64, resolve_ttl_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            session_ttl_secs,
            resolve_ttl_secs,
        }
    }

    /// # Errors
    /// Returns an error if token encoding fails
    pub fn issue_session(
        &self,
        user_id: Snowflake,
        username: Option<String>,
        avatar: Option<String>,
    ) -> Result<String, AppError> {
        self.encode_claims(user_id, TokenKind::Session, self.session_ttl_secs, username, avatar)
    }

    /// # Errors
    /// Returns an error if token encoding fails
    pub fn issue_resolve_token(&self, candidate_id: Snowflake) -> Result<String, AppError> {
        self.encode_claims(candidate_id, TokenKind::Resolve, self.resolve_ttl_secs, None, None)
    }

    fn encode_claims(
        &self,
        subject: Snowflake,
        kind: TokenKind,
        ttl_secs: i64,
        username: Option<String>,
        avatar: Option<String>,
    ) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(ttl_secs)).timestamp(),
            kind,
            username,
            avatar,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Failed to encode JWT")))
    }

    /// # Errors
    /// Returns an error if the token is malformed, forged, or expired
    pub fn decode_token(&self, token: &str) -> Result<SessionClaims, AppError> {
        let token_data = decode::<SessionClaims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
                _ => AppError::InvalidToken,
            })?;

        Ok(token_data.claims)
    }

    fn decode_kind(&self, token: &str, kind: TokenKind) -> Result<SessionClaims, AppError> {
        let claims = self.decode_token(token)?;
        if claims.kind != kind {
            return Err(AppError::InvalidToken);
        }
        Ok(claims)
    }

    /// # Errors
    /// Returns an error unless `token` is a valid session token
    pub fn validate_session(&self, token: &str) -> Result<SessionClaims, AppError> {
        self.decode_kind(token, TokenKind::Session)
    }

    /// Candidate id carried by a resolve token
    ///
    /// # Errors
    /// Returns an error unless `token` is a valid resolve token
    pub fn validate_resolve_token(&self, token: &str) -> Result<Snowflake, AppError> {
        self.decode_kind(token, TokenKind::Resolve)?.subject_id()
    }
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("session_ttl_secs", &self.session_ttl_secs)
            .field("resolve_ttl_secs", &self.resolve_ttl_secs)
            .finish_non_exhaustive()
    }
}
