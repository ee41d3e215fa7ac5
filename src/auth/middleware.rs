// Authentication middleware for admin routes

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use tracing::debug;

use crate::auth::{error::AuthError, models::Role, token::TokenService};

/// Admin user extractor for protected routes
///
/// Validates the Bearer token from the Authorization header and requires
/// the admin role. Non-admin tokens are rejected with 403.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub user_id: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(AuthError::MissingToken)?
            .to_str()
            .map_err(|_| AuthError::InvalidToken)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidToken)?;

        let jwt_secret = std::env::var("JWT_SECRET")
            .map_err(|_| AuthError::ConfigError("JWT_SECRET not configured".to_string()))?;

        let token_service = TokenService::new(jwt_secret);
        let claims = token_service.validate_token(token)?;

        if claims.role != Role::Admin {
            return Err(AuthError::InsufficientPermissions {
                required: Role::Admin,
                actual: claims.role,
            });
        }

        debug!("Admin access granted: user_id={}", claims.sub);
        Ok(AdminUser {
            user_id: claims.sub,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn create_parts_with_auth(auth_value: &str) -> Parts {
        let req = Request::builder()
            .uri("/")
            .header(header::AUTHORIZATION, auth_value)
            .body(())
            .unwrap();
        let (parts, _) = req.into_parts();
        parts
    }

    fn create_parts_without_auth() -> Parts {
        let req = Request::builder().uri("/").body(()).unwrap();
        let (parts, _) = req.into_parts();
        parts
    }

    fn test_token_service() -> TokenService {
        TokenService::new("test_secret_key_for_testing_purposes".to_string())
    }

    #[tokio::test]
    async fn test_admin_token_is_accepted() {
        std::env::set_var("JWT_SECRET", "test_secret_key_for_testing_purposes");

        let token = test_token_service()
            .generate_token("admin-1", Role::Admin)
            .unwrap();
        let mut parts = create_parts_with_auth(&format!("Bearer {}", token));

        let admin = AdminUser::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(admin.user_id, "admin-1");
    }

    #[tokio::test]
    async fn test_user_token_is_forbidden() {
        std::env::set_var("JWT_SECRET", "test_secret_key_for_testing_purposes");

        let token = test_token_service()
            .generate_token("user-1", Role::User)
            .unwrap();
        let mut parts = create_parts_with_auth(&format!("Bearer {}", token));

        let result = AdminUser::from_request_parts(&mut parts, &()).await;
        assert!(matches!(
            result.unwrap_err(),
            AuthError::InsufficientPermissions {
                required: Role::Admin,
                actual: Role::User,
            }
        ));
    }

    #[tokio::test]
    async fn test_missing_authorization_header() {
        let mut parts = create_parts_without_auth();
        let result = AdminUser::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result.unwrap_err(), AuthError::MissingToken));
    }

    #[tokio::test]
    async fn test_invalid_bearer_format() {
        std::env::set_var("JWT_SECRET", "test_secret_key_for_testing_purposes");

        for auth_value in ["InvalidFormat token", "token_without_bearer", "Basic dXNlcjpwYXNz"] {
            let mut parts = create_parts_with_auth(auth_value);
            let result = AdminUser::from_request_parts(&mut parts, &()).await;
            assert!(result.is_err());
        }
    }

    #[tokio::test]
    async fn test_malformed_token_is_rejected() {
        std::env::set_var("JWT_SECRET", "test_secret_key_for_testing_purposes");

        let mut parts = create_parts_with_auth("Bearer not.a.valid.jwt");
        let result = AdminUser::from_request_parts(&mut parts, &()).await;
        assert!(result.is_err());
    }
}
