use axum::http::{HeaderName, HeaderValue, Method};
use axum::{Router, middleware};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::middleware::role::{require_admin, require_super_admin};
use crate::modules::activities::router::init_activities_router;
use crate::modules::announcements::router::init_announcements_router;
use crate::modules::auth::router::init_auth_router;
use crate::modules::canteen::router::init_canteen_router;
use crate::modules::children::router::init_children_router;
use crate::modules::liaison::router::init_liaison_router;
use crate::modules::report_cards::router::init_report_cards_router;
use crate::modules::schools::router::init_schools_router;
use crate::modules::timetables::router::init_timetables_router;
use crate::modules::users::router::init_users_router;
use crate::state::AppState;

pub fn init_router(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .nest(
            "/api",
            Router::new()
                .nest("/auth", init_auth_router())
                .nest(
                    "/schools",
                    init_schools_router().route_layer(middleware::from_fn_with_state(
                        state.clone(),
                        require_super_admin,
                    )),
                )
                .nest(
                    "/users",
                    init_users_router()
                        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin)),
                )
                .nest("/children", init_children_router())
                .nest("/announcements", init_announcements_router())
                .nest("/activities", init_activities_router())
                .nest("/report-cards", init_report_cards_router())
                .nest("/liaison", init_liaison_router())
                .nest("/canteen", init_canteen_router())
                .nest("/timetables", init_timetables_router()),
        )
        .with_state(state.clone())
        .layer({
            let allowed_origins: Vec<HeaderValue> = state
                .cors_config
                .allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::AUTHORIZATION,
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::ACCEPT,
                    HeaderName::from_static(TENANT_HEADER_LOWER),
                ])
                .allow_credentials(true)
        })
        .layer(middleware::from_fn(logging_middleware))
}

// HeaderName::from_static requires a lowercase literal.
const TENANT_HEADER_LOWER: &str = "x-school-code";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::tenant::TENANT_HEADER;

    #[test]
    fn test_tenant_header_constants_agree() {
        assert_eq!(TENANT_HEADER.to_lowercase(), TENANT_HEADER_LOWER);
    }
}
