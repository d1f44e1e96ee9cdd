use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::modules::auth::controller::{
    change_password, delete_account, login, logout, me, refresh_token, register, update_profile,
};
use crate::state::AppState;

pub fn init_auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh_token))
        .route("/logout", post(logout))
        .route("/me", get(me).put(update_profile))
        .route("/change-password", post(change_password))
        .route("/account", delete(delete_account))
}
