use jsonwebtoken::{decode, DecodingKey, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Claims minted by the identity provider. This service only verifies them;
/// token issuance and session lifecycle live elsewhere.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    pub exp: i64,
}

pub fn verify_token(token: &str, config: &Config) -> AppResult<TokenData<Claims>> {
    let mut validation = Validation::default();
    validation.validate_exp = true;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.auth_jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|_| AppError::Unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn test_config(secret: &str) -> Config {
        Config {
            database_url: "postgres://localhost/test".into(),
            host: "127.0.0.1".into(),
            port: 0,
            frontend_url: "http://localhost:3000".into(),
            cors_extra_origins: vec![],
            auth_jwt_secret: secret.into(),
            cron_secret: String::new(),
            resend_api_key: String::new(),
            email_from: "test@test".into(),
            sweep_concurrency: 1,
            sweep_timeout_secs: 1,
            email_max_per_minute: 1,
        }
    }

    fn sign(claims: &Claims, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn accepts_a_valid_token() {
        let config = test_config("secret");
        let user_id = Uuid::new_v4();
        let token = sign(
            &Claims {
                sub: user_id,
                email: Some("ana@example.com".into()),
                exp: Utc::now().timestamp() + 600,
            },
            "secret",
        );

        let data = verify_token(&token, &config).unwrap();
        assert_eq!(data.claims.sub, user_id);
        assert_eq!(data.claims.email.as_deref(), Some("ana@example.com"));
    }

    #[test]
    fn rejects_an_expired_token() {
        let config = test_config("secret");
        let token = sign(
            &Claims {
                sub: Uuid::new_v4(),
                email: None,
                exp: Utc::now().timestamp() - 600,
            },
            "secret",
        );

        assert!(verify_token(&token, &config).is_err());
    }

    #[test]
    fn rejects_a_token_signed_with_another_secret() {
        let config = test_config("secret");
        let token = sign(
            &Claims {
                sub: Uuid::new_v4(),
                email: None,
                exp: Utc::now().timestamp() + 600,
            },
            "other-secret",
        );

        assert!(verify_token(&token, &config).is_err());
    }
}
