use axum::{
    Router,
    routing::{get, post},
};

use crate::modules::report_cards::controller::{
    create_report_card, delete_report_card, get_report_card, get_report_cards_for_child,
    update_report_card,
};
use crate::state::AppState;

pub fn init_report_cards_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_report_card))
        .route("/child/{child_id}", get(get_report_cards_for_child))
        .route(
            "/{id}",
            get(get_report_card)
                .put(update_report_card)
                .delete(delete_report_card),
        )
}
