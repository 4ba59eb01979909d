use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::UserRole;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::policy::Actor;

/// Claims issued by the identity provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub role: String,
    pub exp: i64,
    pub iat: i64,
    pub token_type: String,
}

pub struct AuthService {
    config: Config,
}

impl AuthService {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn generate_access_token(&self, user_id: Uuid, role: UserRole) -> AppResult<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.config.jwt_access_expiry);

        let claims = Claims {
            sub: user_id.to_string(),
            role: role.as_str().to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            token_type: "access".to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(AppError::from)
    }

    pub fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }

    /// Verifies an access token and turns its claims into the request actor.
    pub fn authenticate(&self, token: &str) -> AppResult<Actor> {
        let claims = self.verify_token(token)?;

        if claims.token_type != "access" {
            return Err(AppError::Unauthorized);
        }

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AppError::Unauthorized)?;
        let role = UserRole::parse(&claims.role).ok_or(AppError::Unauthorized)?;

        Ok(Actor { user_id, role })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_tokens_authenticate() {
        let service = AuthService::new(Config::for_tests("secret"));
        let user_id = Uuid::new_v4();
        let token = service
            .generate_access_token(user_id, UserRole::Tenant)
            .unwrap();

        let actor = service.authenticate(&token).unwrap();
        assert_eq!(actor, Actor::tenant(user_id));
    }

    #[test]
    fn foreign_secret_is_rejected() {
        let issuer = AuthService::new(Config::for_tests("one"));
        let verifier = AuthService::new(Config::for_tests("two"));
        let token = issuer
            .generate_access_token(Uuid::new_v4(), UserRole::Owner)
            .unwrap();
        assert!(matches!(
            verifier.authenticate(&token),
            Err(AppError::Jwt(_))
        ));
    }
}
