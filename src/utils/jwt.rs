use crate::config::AuthConfig;
use crate::error::{AppError, AppResult};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

pub const ADMIN_ROLE: &str = "admin";

/// 身份提供方签发的 token 声明
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // 提供方用户 ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(subject: &str, ttl_secs: i64) -> Self {
        let now = Utc::now();
        Self {
            sub: subject.to_string(),
            email: None,
            given_name: None,
            family_name: None,
            picture: None,
            role: None,
            iss: None,
            aud: None,
            exp: (now + Duration::seconds(ttl_secs)).timestamp(),
            iat: now.timestamp(),
        }
    }
}

/// 校验托管身份提供方签发的 HS256 token
#[derive(Clone)]
pub struct TokenVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: Option<String>,
    audience: Option<String>,
}

impl TokenVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.token_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.token_secret.as_bytes()),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
        }
    }

    /// 本地开发与测试用，生产环境由身份提供方签发
    pub fn issue(&self, claims: &Claims) -> AppResult<String> {
        let mut claims = claims.clone();
        if claims.iss.is_none() {
            claims.iss = self.issuer.clone();
        }
        if claims.aud.is_none() {
            claims.aud = self.audience.clone();
        }
        encode(&Header::default(), &claims, &self.encoding_key).map_err(AppError::JwtError)
    }

    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        if let Some(iss) = &self.issuer {
            validation.set_issuer(&[iss]);
        }
        match &self.audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(AppError::JwtError)?;

        if claims.sub.trim().is_empty() {
            return Err(AppError::AuthError("Token has no subject".to_string()));
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(issuer: Option<&str>) -> AuthConfig {
        AuthConfig {
            token_secret: "test-secret".to_string(),
            issuer: issuer.map(str::to_string),
            audience: None,
        }
    }

    #[test]
    fn test_issue_and_verify() {
        let verifier = TokenVerifier::new(&config(Some("https://auth.example.org")));
        let mut claims = Claims::new("user_123", 600);
        claims.email = Some("ada@example.org".to_string());
        let token = verifier.issue(&claims).unwrap();

        let verified = verifier.verify(&token).unwrap();
        assert_eq!(verified.sub, "user_123");
        assert_eq!(verified.email.as_deref(), Some("ada@example.org"));
    }

    #[test]
    fn test_rejects_wrong_issuer() {
        let issuer = TokenVerifier::new(&config(Some("https://other.example.org")));
        let verifier = TokenVerifier::new(&config(Some("https://auth.example.org")));
        let token = issuer.issue(&Claims::new("user_123", 600)).unwrap();
        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn test_rejects_expired_token() {
        let verifier = TokenVerifier::new(&config(None));
        let token = verifier.issue(&Claims::new("user_123", -3600)).unwrap();
        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn test_rejects_empty_subject() {
        let verifier = TokenVerifier::new(&config(None));
        let token = verifier.issue(&Claims::new("", 600)).unwrap();
        assert!(matches!(verifier.verify(&token), Err(AppError::AuthError(_))));
    }
}
