//! Token Service
//!
//! RS256 JWT issuance (user service only) and verification (every service).

use std::path::Path;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::JwtSettings;
use crate::domain::{RoleType, User};

/// JWT claims structure
///
/// `email` and `role` are optional on the way in so that a correctly signed
/// token lacking them is reported as missing claims rather than as invalid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub iss: String,
    pub aud: String,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Subject parsed as a user id.
    pub fn user_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }

    /// Role claim parsed as a role type.
    pub fn role_type(&self) -> Option<RoleType> {
        self.role.as_deref().and_then(RoleType::parse)
    }
}

/// Token errors
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Failed to read key {path}: {source}")]
    KeyFile {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid RSA key: {0}")]
    Key(jsonwebtoken::errors::Error),

    #[error("Token generation failed: {0}")]
    Encode(jsonwebtoken::errors::Error),

    #[error("Token expired")]
    Expired,

    #[error("Invalid token")]
    Invalid,
}

fn read_pem(path: &str) -> Result<Vec<u8>, TokenError> {
    std::fs::read(Path::new(path)).map_err(|source| TokenError::KeyFile {
        path: path.to_string(),
        source,
    })
}

/// Signs access tokens with the RSA private key.
pub struct TokenIssuer {
    key: EncodingKey,
    issuer: String,
    audience: String,
    lifetime: Duration,
}

impl TokenIssuer {
    /// Build from a PEM-encoded RSA private key.
    pub fn from_pem(pem: &[u8], settings: &JwtSettings) -> Result<Self, TokenError> {
        let key = EncodingKey::from_rsa_pem(pem).map_err(TokenError::Key)?;
        Ok(Self {
            key,
            issuer: settings.issuer.clone(),
            audience: settings.audience.clone(),
            lifetime: Duration::minutes(settings.expiration_minutes),
        })
    }

    /// Load the private key from `path`.
    pub fn from_file(path: &str, settings: &JwtSettings) -> Result<Self, TokenError> {
        Self::from_pem(&read_pem(path)?, settings)
    }

    /// Issue a token for `user` carrying id, email and role.
    pub fn issue(&self, user: &User) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            email: Some(user.email.clone()),
            role: Some(user.role.role_type.as_str().to_string()),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            exp: (now + self.lifetime).timestamp(),
        };

        encode(&Header::new(Algorithm::RS256), &claims, &self.key).map_err(TokenError::Encode)
    }
}

/// Verifies access tokens with the RSA public key.
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// Build from a PEM-encoded RSA public key.
    pub fn from_pem(pem: &[u8], settings: &JwtSettings) -> Result<Self, TokenError> {
        let key = DecodingKey::from_rsa_pem(pem).map_err(TokenError::Key)?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[settings.issuer.as_str()]);
        validation.set_audience(&[settings.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

        Ok(Self { key, validation })
    }

    /// Load the public key from `path`.
    pub fn from_file(path: &str, settings: &JwtSettings) -> Result<Self, TokenError> {
        Self::from_pem(&read_pem(path)?, settings)
    }

    /// Check signature, expiry, issuer and audience.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }
}
