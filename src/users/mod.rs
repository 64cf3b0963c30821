use axum::{
    routing::{get, post, put},
    Router,
};

use crate::state::AppState;

mod dto;
pub mod handlers;
pub mod repo;

/// Route table for the user surface. Public: signup, login. Authenticated:
/// logout, profile. Admin: list, update-by-id, delete-by-id.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(handlers::signup))
        .route("/login", post(handlers::login))
        .route("/logout", post(handlers::logout))
        .route(
            "/profile",
            get(handlers::get_profile).put(handlers::update_profile),
        )
        .route("/", get(handlers::list_users))
        .route(
            "/:id",
            put(handlers::admin_update_user).delete(handlers::admin_delete_user),
        )
}
