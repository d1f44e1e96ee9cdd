use axum::{
    Router,
    routing::{get, post},
};

use crate::modules::timetables::controller::{
    create_entry, delete_entry, get_entries, get_entry, update_entry,
};
use crate::state::AppState;

pub fn init_timetables_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_entry).get(get_entries))
        .route(
            "/{id}",
            get(get_entry).put(update_entry).delete(delete_entry),
        )
}
