use axum::{
    Router,
    routing::{get, post},
};

use crate::modules::liaison::controller::{
    acknowledge_entry, create_entry, delete_entry, get_entries_for_child, get_entry,
};
use crate::state::AppState;

pub fn init_liaison_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_entry))
        .route("/child/{child_id}", get(get_entries_for_child))
        .route("/{id}", get(get_entry).delete(delete_entry))
        .route("/{id}/acknowledge", post(acknowledge_entry))
}
