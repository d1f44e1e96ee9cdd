use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::modules::users::controller::{
    assign_role, create_user, delete_user, get_user, get_users, get_users_by_role, remove_role,
    update_user,
};
use crate::state::AppState;

pub fn init_users_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_user).get(get_users))
        .route("/by-role/{role}", get(get_users_by_role))
        .route(
            "/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/{id}/roles", post(assign_role))
        .route("/{id}/roles/{role}", delete(remove_role))
}
