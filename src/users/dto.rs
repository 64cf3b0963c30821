use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo::User;

/// Request body for signup.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Self-service profile update; absent fields are left untouched.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Admin update of another user; the only path that may flip the admin flag.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUpdateRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub is_admin: Option<bool>,
}

/// The part of a user safe to hand to a client.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub profile_picture: String,
    pub is_admin: bool,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            profile_picture: user.profile_picture,
            is_admin: user.is_admin,
        }
    }
}

/// Response carrying a message and the affected user.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub message: String,
    pub user: PublicUser,
}

/// Bare message response (logout, delete).
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn sample_user() -> User {
        let now = OffsetDateTime::now_utc();
        User {
            id: Uuid::new_v4(),
            name: "Alice".into(),
            email: "alice@x.com".into(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".into(),
            profile_picture: "https://example.com/p.png".into(),
            is_admin: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn public_projection_drops_the_hash() {
        let public = PublicUser::from(sample_user());
        let json = serde_json::to_string(&public).unwrap();
        assert!(!json.to_lowercase().contains("password"));
        assert!(!json.contains("argon2"));
    }

    #[test]
    fn public_projection_uses_camel_case() {
        let json = serde_json::to_string(&PublicUser::from(sample_user())).unwrap();
        assert!(json.contains("\"isAdmin\":false"));
        assert!(json.contains("\"profilePicture\""));
    }

    #[test]
    fn admin_update_accepts_camel_case_flag() {
        let req: AdminUpdateRequest =
            serde_json::from_str(r#"{"name":"Bob","isAdmin":true}"#).unwrap();
        assert_eq!(req.name.as_deref(), Some("Bob"));
        assert_eq!(req.is_admin, Some(true));
        assert!(req.email.is_none());
    }

    #[test]
    fn profile_update_fields_are_all_optional() {
        let req: UpdateProfileRequest = serde_json::from_str("{}").unwrap();
        assert!(req.name.is_none() && req.email.is_none() && req.password.is_none());
    }
}
