use axum::{
    Router,
    routing::{get, post},
};

use crate::modules::canteen::controller::{
    create_menu, delete_menu, get_menu, get_menus, update_menu,
};
use crate::state::AppState;

pub fn init_canteen_router() -> Router<AppState> {
    Router::new()
        .route("/menus", post(create_menu).get(get_menus))
        .route(
            "/menus/{id}",
            get(get_menu).put(update_menu).delete(delete_menu),
        )
}
