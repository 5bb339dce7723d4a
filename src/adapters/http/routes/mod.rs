pub mod principal;

use axum::Router;

use crate::{adapters::http::app_state::AppState, domain::entities::principal::PrincipalKind};

pub fn router(app_state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/users", principal::router(app_state.clone(), PrincipalKind::User))
        .nest("/sellers", principal::router(app_state, PrincipalKind::Seller))
}
