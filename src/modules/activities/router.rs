use axum::{
    Router,
    routing::{get, post},
};

use crate::modules::activities::controller::{
    create_activity, delete_activity, get_activities, get_activity, update_activity,
};
use crate::state::AppState;

pub fn init_activities_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_activity).get(get_activities))
        .route(
            "/{id}",
            get(get_activity)
                .put(update_activity)
                .delete(delete_activity),
        )
}
