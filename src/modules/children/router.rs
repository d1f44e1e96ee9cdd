use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::modules::children::controller::{
    create_child, delete_child, get_child, get_children, get_my_children, link_parent,
    link_teacher, unlink_parent, unlink_teacher, update_child,
};
use crate::state::AppState;

pub fn init_children_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_child).get(get_children))
        .route("/mine", get(get_my_children))
        .route(
            "/{id}",
            get(get_child).put(update_child).delete(delete_child),
        )
        .route("/{id}/parents", post(link_parent))
        .route("/{id}/parents/{parent_id}", delete(unlink_parent))
        .route("/{id}/teachers", post(link_teacher))
        .route("/{id}/teachers/{teacher_id}", delete(unlink_teacher))
}
