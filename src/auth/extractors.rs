use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::auth::cookies::extract_auth_cookie;
use crate::auth::jwt::JwtKeys;
use crate::error::ApiError;
use crate::state::AppState;

/// Identity attached to a request once the token cookie has been verified
/// and the referenced user confirmed to still exist.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_auth_cookie(&parts.headers)
            .ok_or_else(|| ApiError::Unauthenticated("You must be logged in".into()))?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(&token).map_err(|e| {
            warn!(error = %e, "invalid or expired token");
            ApiError::Unauthenticated("Invalid or expired token".into())
        })?;

        // The token may outlive the account it was issued for.
        let user = state
            .users
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| ApiError::Unauthenticated("User not found".into()))?;

        Ok(CurrentUser {
            id: user.id,
            name: user.name,
            email: user.email,
            is_admin: user.is_admin,
        })
    }
}

/// Identity of a caller that passed the admin gate. Cannot be constructed
/// without a successful [`CurrentUser`] extraction first.
#[derive(Debug, Clone)]
pub struct AdminUser(pub CurrentUser);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        require_admin(&user)?;
        Ok(AdminUser(user))
    }
}

pub(crate) fn require_admin(user: &CurrentUser) -> Result<(), ApiError> {
    if user.is_admin {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "You are not authorized to perform this operation".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, Request, StatusCode};

    fn parts_for(req: Request<()>) -> Parts {
        req.into_parts().0
    }

    fn identity(is_admin: bool) -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            name: "Alice".into(),
            email: "alice@x.com".into(),
            is_admin,
        }
    }

    #[tokio::test]
    async fn missing_cookie_is_unauthenticated() {
        let state = AppState::fake();
        let mut parts = parts_for(Request::builder().uri("/").body(()).unwrap());
        let err = CurrentUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn garbage_token_is_unauthenticated() {
        let state = AppState::fake();
        let mut parts = parts_for(
            Request::builder()
                .uri("/")
                .header(header::COOKIE, "jwt=not-a-token")
                .body(())
                .unwrap(),
        );
        let err = CurrentUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn admin_gate_rejects_missing_cookie_before_anything_else() {
        let state = AppState::fake();
        let mut parts = parts_for(Request::builder().uri("/").body(()).unwrap());
        let err = AdminUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn non_admin_identity_is_forbidden() {
        let err = require_admin(&identity(false)).unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn admin_identity_passes_the_gate() {
        assert!(require_admin(&identity(true)).is_ok());
    }

    #[test]
    fn identity_serializes_with_camel_case_admin_flag() {
        let json = serde_json::to_string(&identity(false)).unwrap();
        assert!(json.contains("\"isAdmin\":false"));
        assert!(json.contains("alice@x.com"));
    }
}
